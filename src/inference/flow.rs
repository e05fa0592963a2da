use tracing::{debug, error};

use crate::inference::client::InferenceApi;
use crate::inference::dto::{PredictionResult, SensorReading};

/// Which remote call an attempt died in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStage {
    Predict,
    Describe,
}

/// Screen flow for one prediction attempt.
///
/// `Error` is terminal for the attempt; a new submission requires
/// [`PredictionFlow::reset`] first.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    Idle,
    Predicting,
    Describing,
    Ready {
        result: PredictionResult,
        description: String,
    },
    Error {
        stage: FailedStage,
        message: String,
    },
}

pub struct PredictionFlow {
    state: FlowState,
}

impl Default for PredictionFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionFlow {
    pub fn new() -> Self {
        Self {
            state: FlowState::Idle,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Discard all attempt state and return to `Idle`. The next submission
    /// is independent of anything that happened before.
    pub fn reset(&mut self) {
        self.state = FlowState::Idle;
    }

    /// Run one attempt: predict, then describe, strictly in sequence.
    /// Only valid from `Idle`; no cancellation once issued.
    pub async fn submit(
        &mut self,
        api: &dyn InferenceApi,
        reading: &SensorReading,
    ) -> anyhow::Result<&FlowState> {
        if self.state != FlowState::Idle {
            anyhow::bail!("submission requires an idle flow; call reset() first");
        }

        self.state = FlowState::Predicting;
        let result = match api.predict(reading).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "prediction failed");
                self.state = FlowState::Error {
                    stage: FailedStage::Predict,
                    message: e.to_string(),
                };
                return Ok(&self.state);
            }
        };

        self.state = FlowState::Describing;
        match api.describe(&result).await {
            Ok(description) => {
                debug!(disease = %result.disease, "flow ready");
                self.state = FlowState::Ready {
                    result,
                    description,
                };
            }
            Err(e) => {
                error!(error = %e, "description failed");
                self.state = FlowState::Error {
                    stage: FailedStage::Describe,
                    message: e.to_string(),
                };
            }
        }
        Ok(&self.state)
    }
}
