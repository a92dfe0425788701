//! Weighted productivity score.

use crate::analytics::stats::round1;
use crate::domain::record::TaskRecord;
use crate::error::ProdTrackError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRODUCTIVE_CATEGORIES: [&str; 4] =
    ["Coding", "Academics", "Development", "Project"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub time: f64,
    pub completion: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            time: 0.7,
            completion: 0.3,
        }
    }
}

impl ScoreWeights {
    pub fn validate(&self) -> Result<(), ProdTrackError> {
        let in_unit = |w: f64| (0.0..=1.0).contains(&w);
        if !in_unit(self.time) || !in_unit(self.completion) {
            return Err(ProdTrackError::InvalidArgument(
                "Weights must be between 0 and 1".into(),
            ));
        }
        if (self.time + self.completion - 1.0).abs() >= 1e-4 {
            return Err(ProdTrackError::InvalidArgument(
                "Weights must sum to 1.0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProductivityScore {
    pub score: f64,
    pub productive_minutes: f64,
    pub total_minutes: f64,
    pub completion_rate: f64,
}

/// Blend the share of time spent on completed productive work with the
/// overall completion rate. All outputs are rounded to one decimal.
pub fn productivity_score(
    records: &[TaskRecord],
    productive_categories: &[String],
    weights: ScoreWeights,
) -> Result<ProductivityScore, ProdTrackError> {
    weights.validate()?;
    if records.is_empty() {
        tracing::debug!("no records for productivity score");
        return Ok(ProductivityScore::default());
    }

    let total_minutes: f64 = records.iter().map(|r| r.time_taken).sum();
    let productive_minutes: f64 = records
        .iter()
        .filter(|r| r.completed && productive_categories.iter().any(|c| *c == r.category))
        .map(|r| r.time_taken)
        .sum();
    let completed = records.iter().filter(|r| r.completed).count();
    let completion_rate = completed as f64 / records.len() as f64 * 100.0;

    let time_component = if total_minutes > 0.0 {
        productive_minutes / total_minutes
    } else {
        0.0
    };
    let score =
        (time_component * weights.time + completion_rate / 100.0 * weights.completion) * 100.0;

    Ok(ProductivityScore {
        score: round1(score),
        productive_minutes: round1(productive_minutes),
        total_minutes: round1(total_minutes),
        completion_rate: round1(completion_rate),
    })
}
