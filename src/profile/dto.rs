use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row in the `profiles` table, keyed by the auth user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub phone: i64,
    pub address: String,
    pub soil_type: String,
    pub farm_area: i64,
    pub referral_code: Option<String>,
    pub land_revenue_survey_no: i64,
    pub predictions_count: i64,
}

/// Profile fields collected at sign-up, sent to the backend as auth user
/// metadata. `predictions_count` always starts at zero.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSeed {
    pub full_name: String,
    pub phone: i64,
    pub address: String,
    pub soil_type: String,
    pub farm_area: i64,
    pub referral_code: String,
    pub land_revenue_survey_no: i64,
    pub predictions_count: i64,
}

/// Raw sign-up inputs before validation.
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub soil_type: String,
    pub farm_area: String,
    pub referral_code: String,
    pub land_revenue_survey_no: String,
}

/// Raw inputs for the editable profile details.
#[derive(Debug, Clone)]
pub struct ProfileDetails {
    pub soil_type: String,
    pub farm_area: String,
    pub land_revenue_survey_no: String,
}
