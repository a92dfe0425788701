//! Dense daily series of per-day aggregates.

use crate::domain::record::TaskRecord;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ProductivityScore,
    Workload,
    TaskCount,
    CompletionRate,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Self::ProductivityScore,
        Self::Workload,
        Self::TaskCount,
        Self::CompletionRate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ProductivityScore => "productivity_score",
            Self::Workload => "workload_minutes",
            Self::TaskCount => "task_count",
            Self::CompletionRate => "completion_rate",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::ProductivityScore => "Productivity score (%)",
            Self::Workload => "Workload (minutes)",
            Self::TaskCount => "Task count",
            Self::CompletionRate => "Completion rate (%)",
        }
    }

    /// Percentage metrics are bounded to [0, 100].
    pub fn is_percentage(&self) -> bool {
        let name = self.name();
        name.contains("score") || name.contains("rate")
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "score" | "productivity" | "productivity_score" => Some(Self::ProductivityScore),
            "workload" | "workload_minutes" | "time" => Some(Self::Workload),
            "tasks" | "task_count" | "count" => Some(Self::TaskCount),
            "completion" | "completion_rate" | "rate" => Some(Self::CompletionRate),
            _ => None,
        }
    }

    fn aggregate(&self, day: &[&TaskRecord]) -> f64 {
        let n = day.len() as f64;
        match self {
            Self::Workload => day.iter().map(|r| r.time_taken).sum(),
            Self::TaskCount => n,
            Self::ProductivityScore | Self::CompletionRate => {
                day.iter().filter(|r| r.completed).count() as f64 / n * 100.0
            }
        }
    }

    /// Clamp a forecast value into the metric's range.
    pub fn bound(&self, value: f64) -> f64 {
        if self.is_percentage() {
            value.clamp(0.0, 100.0)
        } else {
            value.max(0.0)
        }
    }
}

/// One value per calendar day from `start`, without gaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    pub start: NaiveDate,
    pub values: Vec<f64>,
}

impl DailySeries {
    /// Aggregate records per day; days without records are 0. `None` when
    /// there are no records.
    pub fn build(records: &[TaskRecord], metric: Metric) -> Option<Self> {
        let mut by_date: BTreeMap<NaiveDate, Vec<&TaskRecord>> = BTreeMap::new();
        for r in records {
            by_date.entry(r.date).or_default().push(r);
        }
        let (&start, _) = by_date.first_key_value()?;
        let (&end, _) = by_date.last_key_value()?;

        let values = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|d| by_date.get(&d).map_or(0.0, |day| metric.aggregate(day)))
            .collect::<Vec<_>>();

        tracing::debug!(metric = metric.name(), points = values.len(), ?values, "built daily series");
        Some(Self { start, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last_date(&self) -> NaiveDate {
        self.start + Duration::days(self.values.len().saturating_sub(1) as i64)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take(self.values.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn record(day: u32, hour: u32, minutes: f64, completed: bool) -> TaskRecord {
        let mut r = TaskRecord::new(
            "t",
            NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            minutes,
        );
        r.completed = completed;
        r
    }

    fn records() -> Vec<TaskRecord> {
        vec![
            record(3, 9, 60.0, true),
            record(3, 11, 30.0, false),
            record(6, 9, 45.0, true),
        ]
    }

    #[test]
    fn dense_series_fills_gaps() {
        let s = DailySeries::build(&records(), Metric::Workload).unwrap();
        assert_eq!(s.start, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(s.values, vec![90.0, 0.0, 0.0, 45.0]);
        assert_eq!(s.last_date(), NaiveDate::from_ymd_opt(2025, 3, 6).unwrap());
        assert_eq!(s.dates().count(), 4);
    }

    #[test]
    fn per_metric_aggregates() {
        let counts = DailySeries::build(&records(), Metric::TaskCount).unwrap();
        assert_eq!(counts.values, vec![2.0, 0.0, 0.0, 1.0]);
        let rate = DailySeries::build(&records(), Metric::CompletionRate).unwrap();
        assert_eq!(rate.values, vec![50.0, 0.0, 0.0, 100.0]);
        let score = DailySeries::build(&records(), Metric::ProductivityScore).unwrap();
        assert_eq!(score.values, rate.values);
    }

    #[test]
    fn empty_records_have_no_series() {
        assert!(DailySeries::build(&[], Metric::TaskCount).is_none());
    }

    #[test]
    fn bounds_by_metric_kind() {
        assert!(Metric::ProductivityScore.is_percentage());
        assert!(Metric::CompletionRate.is_percentage());
        assert!(!Metric::Workload.is_percentage());
        assert_eq!(Metric::CompletionRate.bound(130.0), 100.0);
        assert_eq!(Metric::Workload.bound(-4.0), 0.0);
        assert_eq!(Metric::Workload.bound(700.0), 700.0);
    }

    #[test]
    fn metric_names() {
        assert_eq!(Metric::from_str_loose("Workload"), Some(Metric::Workload));
        assert_eq!(Metric::from_str_loose("task-count"), Some(Metric::TaskCount));
        assert_eq!(Metric::from_str_loose("mood"), None);
    }
}
