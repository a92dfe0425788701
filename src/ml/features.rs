//! Feature rows for the supervised models.

use crate::domain::record::TaskRecord;
use chrono::Datelike;
use serde::Serialize;

pub const UNKNOWN_LABEL: &str = "unknown";

/// Maps labels to their index in a sorted vocabulary that always contains
/// `unknown`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut classes: Vec<String> = values.into_iter().map(String::from).collect();
        classes.push(UNKNOWN_LABEL.to_string());
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Unseen labels encode as `unknown`.
    pub fn encode(&self, value: &str) -> f64 {
        let position = |v: &str| self.classes.binary_search_by(|c| c.as_str().cmp(v)).ok();
        position(value)
            .or_else(|| position(UNKNOWN_LABEL))
            .unwrap_or(0) as f64
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalEncoders {
    pub category: LabelEncoder,
    pub priority: LabelEncoder,
    pub mood: LabelEncoder,
    pub intent: LabelEncoder,
}

impl CategoricalEncoders {
    pub fn fit(records: &[TaskRecord]) -> Self {
        Self {
            category: LabelEncoder::fit(records.iter().map(|r| r.category.as_str())),
            priority: LabelEncoder::fit(records.iter().map(|r| r.priority.as_str())),
            mood: LabelEncoder::fit(records.iter().map(|r| r.mood.as_str())),
            intent: LabelEncoder::fit(records.iter().map(|r| r.intent.as_str())),
        }
    }
}

/// Inputs for a prediction. Defaults mirror the training-time fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionInput {
    pub difficulty: i64,
    pub energy_level: i64,
    pub focus_level: i64,
    pub minutes: f64,
    pub hour: u32,
    /// Monday = 0.
    pub weekday: u32,
    pub category: String,
    pub priority: String,
    pub mood: String,
    pub intent: String,
}

impl Default for PredictionInput {
    fn default() -> Self {
        Self {
            difficulty: 3,
            energy_level: 5,
            focus_level: 5,
            minutes: 30.0,
            hour: 12,
            weekday: 1,
            category: UNKNOWN_LABEL.into(),
            priority: UNKNOWN_LABEL.into(),
            mood: UNKNOWN_LABEL.into(),
            intent: UNKNOWN_LABEL.into(),
        }
    }
}

impl From<&TaskRecord> for PredictionInput {
    fn from(r: &TaskRecord) -> Self {
        Self {
            difficulty: i64::from(r.difficulty),
            energy_level: i64::from(r.energy_level),
            focus_level: i64::from(r.focus_level),
            minutes: r.time_taken,
            hour: r.start_hour(),
            weekday: r.date.weekday().num_days_from_monday(),
            category: r.category.clone(),
            priority: r.priority.to_string(),
            mood: r.mood.to_string(),
            intent: r.intent.to_string(),
        }
    }
}

impl PredictionInput {
    /// Clamp levels into their schema ranges.
    pub fn clamped(mut self) -> Self {
        self.difficulty = self.difficulty.clamp(1, 5);
        self.energy_level = self.energy_level.clamp(1, 10);
        self.focus_level = self.focus_level.clamp(1, 10);
        self
    }

    /// difficulty, energy, focus, minutes, hour, weekday, then the four
    /// label encodings.
    pub fn completion_row(&self, enc: &CategoricalEncoders) -> Vec<f64> {
        vec![
            self.difficulty as f64,
            self.energy_level as f64,
            self.focus_level as f64,
            self.minutes,
            f64::from(self.hour),
            f64::from(self.weekday),
            enc.category.encode(&self.category),
            enc.priority.encode(&self.priority),
            enc.mood.encode(&self.mood),
            enc.intent.encode(&self.intent),
        ]
    }

    pub fn duration_row(&self, enc: &CategoricalEncoders) -> Vec<f64> {
        vec![
            self.difficulty as f64,
            enc.category.encode(&self.category),
            enc.priority.encode(&self.priority),
            enc.intent.encode(&self.intent),
        ]
    }
}
