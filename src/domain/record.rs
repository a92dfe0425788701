//! Task record and its enumerated fields.

use crate::error::ProdTrackError;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const TAGS_SEPARATOR: char = ',';

pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_ENERGY: u8 = 5;
pub const DEFAULT_FOCUS: u8 = 5;
pub const DEFAULT_DIFFICULTY: u8 = 3;

pub const ENERGY_RANGE: (u8, u8) = (1, 10);
pub const FOCUS_RANGE: (u8, u8) = (1, 10);
pub const DIFFICULTY_RANGE: (u8, u8) = (1, 5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn from_str_loose(s: &str) -> Result<Self, ProdTrackError> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Ok(Self::Low),
            "medium" | "med" | "m" => Ok(Self::Medium),
            "high" | "h" => Ok(Self::High),
            _ => Err(ProdTrackError::InvalidArgument(format!(
                "Invalid priority: {s} (expected low, medium, high)"
            ))),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    #[default]
    Neutral,
    Tired,
    Frustrated,
    Energized,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Self::Happy,
        Self::Neutral,
        Self::Tired,
        Self::Frustrated,
        Self::Energized,
    ];

    /// The stored label, emoji included.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "😊 Happy",
            Self::Neutral => "😐 Neutral",
            Self::Tired => "😞 Tired",
            Self::Frustrated => "😤 Frustrated",
            Self::Energized => "💪 Energized",
        }
    }

    /// Accepts the full label or just the word ("tired", "😞 Tired").
    pub fn from_str_loose(s: &str) -> Result<Self, ProdTrackError> {
        let word: String = s
            .trim()
            .chars()
            .skip_while(|c| !c.is_alphabetic())
            .collect::<String>()
            .to_lowercase();
        match word.as_str() {
            "happy" => Ok(Self::Happy),
            "neutral" => Ok(Self::Neutral),
            "tired" => Ok(Self::Tired),
            "frustrated" => Ok(Self::Frustrated),
            "energized" => Ok(Self::Energized),
            _ => Err(ProdTrackError::InvalidArgument(format!(
                "Invalid mood: {s} (expected happy, neutral, tired, frustrated, energized)"
            ))),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Intent {
    #[default]
    Complete,
    Learn,
    Review,
    Plan,
    Practice,
    Explore,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "Complete",
            Self::Learn => "Learn",
            Self::Review => "Review",
            Self::Plan => "Plan",
            Self::Practice => "Practice",
            Self::Explore => "Explore",
        }
    }

    pub fn from_str_loose(s: &str) -> Result<Self, ProdTrackError> {
        match s.trim().to_lowercase().as_str() {
            "complete" => Ok(Self::Complete),
            "learn" => Ok(Self::Learn),
            "review" => Ok(Self::Review),
            "plan" => Ok(Self::Plan),
            "practice" => Ok(Self::Practice),
            "explore" => Ok(Self::Explore),
            _ => Err(ProdTrackError::InvalidArgument(format!(
                "Invalid intent: {s} (expected complete, learn, review, plan, practice, explore)"
            ))),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Manual,
    Imported,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Imported => "imported",
        }
    }

    pub fn from_str_loose(s: &str) -> Result<Self, ProdTrackError> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "imported" | "import" => Ok(Self::Imported),
            _ => Err(ProdTrackError::InvalidArgument(format!(
                "Invalid task type: {s}"
            ))),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRecord {
    pub date: NaiveDate,
    pub task: String,
    #[serde(with = "datetime_format")]
    pub start_time: NaiveDateTime,
    #[serde(with = "datetime_format")]
    pub end_time: NaiveDateTime,
    /// Minutes.
    pub time_taken: f64,
    pub category: String,
    pub priority: Priority,
    pub mood: Mood,
    pub energy_level: u8,
    pub focus_level: u8,
    pub intent: Intent,
    pub difficulty: u8,
    pub tags: Vec<String>,
    pub notes: String,
    pub task_type: TaskType,
    pub completed: bool,
}

impl TaskRecord {
    /// Create a record with schema defaults for every optional field. The end
    /// time equals the start when the duration overflows.
    pub fn new(task: &str, date: NaiveDate, start: NaiveTime, minutes: f64) -> Self {
        let start_time = date.and_time(start);
        Self {
            date,
            task: normalize_task_name(task),
            start_time,
            end_time: end_from_duration(start_time, minutes).unwrap_or(start_time),
            time_taken: minutes,
            category: DEFAULT_CATEGORY.to_string(),
            priority: Priority::default(),
            mood: Mood::default(),
            energy_level: DEFAULT_ENERGY,
            focus_level: DEFAULT_FOCUS,
            intent: Intent::default(),
            difficulty: DEFAULT_DIFFICULTY,
            tags: Vec::new(),
            notes: String::new(),
            task_type: TaskType::default(),
            completed: false,
        }
    }

    /// The logical identity used for deduplication.
    pub fn dedup_key(&self) -> (NaiveDate, &str, NaiveDateTime, u64) {
        (
            self.date,
            self.task.as_str(),
            self.start_time,
            self.time_taken.to_bits(),
        )
    }

    pub fn start_hour(&self) -> u32 {
        chrono::Timelike::hour(&self.start_time)
    }
}

/// Lowercase and trim a task name.
pub fn normalize_task_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// `None` when the duration does not fit in a timestamp.
pub fn end_from_duration(start: NaiveDateTime, minutes: f64) -> Option<NaiveDateTime> {
    let seconds = (minutes * 60.0).round();
    if !seconds.is_finite() {
        return None;
    }
    // saturating cast; out-of-range seconds fail below
    start.checked_add_signed(Duration::try_seconds(seconds as i64)?)
}

/// Clamp a level into its schema range.
pub fn clamp_level(value: i64, range: (u8, u8)) -> u8 {
    value.clamp(i64::from(range.0), i64::from(range.1)) as u8
}

pub(crate) mod datetime_format {
    use super::DATETIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(DATETIME_FORMAT).to_string())
    }
}
