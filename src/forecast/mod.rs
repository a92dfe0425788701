pub mod band;
pub mod methods;
pub mod series;
pub mod summary;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_HORIZON: usize = 365;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("No task history to forecast from")]
    NoData,

    #[error("Forecast horizon must be between 1 and {MAX_HORIZON} days, got {0}")]
    InvalidHorizon(usize),

    #[error("{name} must be between 0 and 1, got {value}")]
    InvalidAlpha { name: &'static str, value: f64 },

    #[error("Forecast failed: {0}")]
    Computation(String),
}

/// Tunables for the forecaster, read from the `[forecast]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub horizon: usize,
    pub window: usize,
    pub score_alpha: f64,
    pub task_alpha: f64,
    pub completion_alpha: f64,
    /// Fixed seed for reproducible forecasts; entropy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            horizon: 7,
            window: 7,
            score_alpha: 0.4,
            task_alpha: 0.3,
            completion_alpha: 0.35,
            seed: None,
        }
    }
}

impl ForecastSettings {
    pub fn check_horizon(&self) -> Result<usize, ForecastError> {
        match self.horizon {
            0 => Err(ForecastError::InvalidHorizon(0)),
            h if h > MAX_HORIZON => Err(ForecastError::InvalidHorizon(h)),
            h => Ok(h),
        }
    }

    /// Smoothing constants must lie in `[0, 1]`.
    pub fn check_alphas(&self) -> Result<(), ForecastError> {
        let alphas = [
            ("score_alpha", self.score_alpha),
            ("task_alpha", self.task_alpha),
            ("completion_alpha", self.completion_alpha),
        ];
        match alphas.into_iter().find(|(_, a)| !(0.0..=1.0).contains(a)) {
            Some((name, value)) => Err(ForecastError::InvalidAlpha { name, value }),
            None => Ok(()),
        }
    }
}
