use serde::{Deserialize, Serialize};

/// The eight agronomic inputs posted to the prediction endpoint.
///
/// The serialized body must contain exactly these keys and nothing else;
/// the inference service rejects unknown shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub solar_radiation: f64,
    pub humidity: f64,
    pub conductivity: f64,
    pub phosphorus: f64,
    pub ph_value: f64,
    pub temperature: f64,
    pub nitrogen: f64,
    pub potassium: f64,
}

/// Explicit field table for the sensor form: one variant per wire key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorField {
    SolarRadiation,
    Humidity,
    Conductivity,
    Phosphorus,
    PhValue,
    Temperature,
    Nitrogen,
    Potassium,
}

impl SensorField {
    pub const ALL: [SensorField; 8] = [
        SensorField::SolarRadiation,
        SensorField::Humidity,
        SensorField::Conductivity,
        SensorField::Phosphorus,
        SensorField::PhValue,
        SensorField::Temperature,
        SensorField::Nitrogen,
        SensorField::Potassium,
    ];

    /// JSON key used in the predict request body.
    pub fn key(self) -> &'static str {
        match self {
            SensorField::SolarRadiation => "solar_radiation",
            SensorField::Humidity => "humidity",
            SensorField::Conductivity => "conductivity",
            SensorField::Phosphorus => "phosphorus",
            SensorField::PhValue => "ph_value",
            SensorField::Temperature => "temperature",
            SensorField::Nitrogen => "nitrogen",
            SensorField::Potassium => "potassium",
        }
    }

    /// Input guideline shown next to the field (import guidance only, not
    /// hard validation).
    pub fn guideline(self) -> &'static str {
        match self {
            SensorField::SolarRadiation => "Value in kWh/m², range: 0-1000",
            SensorField::Humidity => "Percentage, range: 0-100%",
            SensorField::Conductivity => "mS/cm, range: 0-10",
            SensorField::Phosphorus => "mg/L, range: 0-50",
            SensorField::PhValue => "Value, range: 0-14",
            SensorField::Temperature => "Temperature in °C",
            SensorField::Nitrogen => "mg/L, range: 0-100",
            SensorField::Potassium => "mg/L, range: 0-100",
        }
    }

    fn index(self) -> usize {
        match self {
            SensorField::SolarRadiation => 0,
            SensorField::Humidity => 1,
            SensorField::Conductivity => 2,
            SensorField::Phosphorus => 3,
            SensorField::PhValue => 4,
            SensorField::Temperature => 5,
            SensorField::Nitrogen => 6,
            SensorField::Potassium => 7,
        }
    }
}

/// Named policy: invalid numeric input normalizes to zero. Unparsable
/// values are defaulted silently instead of surfacing an input error.
pub fn normalize_numeric(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(0.0)
}

/// Raw text inputs for one prediction attempt, keyed by [`SensorField`].
///
/// Discarded after the request body is built; a fresh form starts empty.
#[derive(Debug, Clone, Default)]
pub struct SensorForm {
    values: [String; 8],
}

impl SensorForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: SensorField, text: impl Into<String>) {
        self.values[field.index()] = text.into();
    }

    pub fn get(&self, field: SensorField) -> &str {
        &self.values[field.index()]
    }

    /// Build the request payload, applying the normalize-to-zero policy
    /// to every field.
    pub fn reading(&self) -> SensorReading {
        let v = |f: SensorField| normalize_numeric(self.get(f));
        SensorReading {
            solar_radiation: v(SensorField::SolarRadiation),
            humidity: v(SensorField::Humidity),
            conductivity: v(SensorField::Conductivity),
            phosphorus: v(SensorField::Phosphorus),
            ph_value: v(SensorField::PhValue),
            temperature: v(SensorField::Temperature),
            nitrogen: v(SensorField::Nitrogen),
            potassium: v(SensorField::Potassium),
        }
    }
}

/// Disease label plus the six pest attack probabilities returned by the
/// inference service. Also the request body for the describe endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub disease: String,
    pub flea_beetle: f64,
    pub thrips: f64,
    pub mealybug: f64,
    pub jassids: f64,
    pub red_spider_mites: f64,
    pub leaf_eating_caterpillar: f64,
}

impl PredictionResult {
    /// Pest probabilities as (display name, value) pairs, in wire order.
    pub fn pest_attacks(&self) -> [(&'static str, f64); 6] {
        [
            ("Flea Beetle", self.flea_beetle),
            ("Thrips", self.thrips),
            ("Mealybug", self.mealybug),
            ("Jassids", self.jassids),
            ("Red Spider Mites", self.red_spider_mites),
            ("Leaf Eating Caterpillar", self.leaf_eating_caterpillar),
        ]
    }
}


#[cfg(test)]
mod result_tests {
    use super::*;

    #[test]
    fn mocked_response_parses_with_all_values_unchanged() {
        let raw = r#"{
            "disease": "Powdery Mildew",
            "flea_beetle": 12,
            "thrips": 5,
            "mealybug": 8,
            "jassids": 3,
            "red_spider_mites": 15,
            "leaf_eating_caterpillar": 2
        }"#;
        let result: PredictionResult = serde_json::from_str(raw).expect("parse");
        assert_eq!(result.disease, "Powdery Mildew");
        assert_eq!(
            result.pest_attacks(),
            [
                ("Flea Beetle", 12.0),
                ("Thrips", 5.0),
                ("Mealybug", 8.0),
                ("Jassids", 3.0),
                ("Red Spider Mites", 15.0),
                ("Leaf Eating Caterpillar", 2.0),
            ]
        );
    }

    #[test]
    fn describe_body_mirrors_the_result() {
        let result = PredictionResult {
            disease: "Downy Mildew".into(),
            flea_beetle: 1.0,
            thrips: 2.0,
            mealybug: 3.0,
            jassids: 4.0,
            red_spider_mites: 5.0,
            leaf_eating_caterpillar: 6.0,
        };
        let body = serde_json::to_value(&result).expect("serialize");
        let obj = body.as_object().expect("json object");
        assert_eq!(obj.len(), 7);
        assert_eq!(body["disease"], "Downy Mildew");
        assert_eq!(body["red_spider_mites"], serde_json::json!(5.0));
    }
}
