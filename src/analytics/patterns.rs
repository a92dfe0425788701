//! Peak hours and the rolling weekly summary.

use crate::analytics::stats::mean;
use crate::domain::record::TaskRecord;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

const MIN_TASKS_PER_HOUR: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourStat {
    pub hour: u32,
    /// `HH:00-HH+1:00`
    pub label: String,
    pub score: f64,
}

/// Rank start hours by completion rate plus a bonus for longer tasks.
pub fn peak_hours(records: &[TaskRecord]) -> Vec<HourStat> {
    let mut by_hour: BTreeMap<u32, Vec<&TaskRecord>> = BTreeMap::new();
    for r in records {
        by_hour.entry(r.start_hour()).or_default().push(r);
    }

    let mut stats: Vec<HourStat> = by_hour
        .into_iter()
        .filter(|(_, tasks)| tasks.len() >= MIN_TASKS_PER_HOUR)
        .map(|(hour, tasks)| {
            let completed = tasks.iter().filter(|r| r.completed).count();
            let completion = completed as f64 / tasks.len() as f64 * 100.0;
            let minutes: Vec<f64> = tasks.iter().map(|r| r.time_taken).collect();
            let complexity_bonus = (mean(&minutes) / 60.0).min(2.0) * 10.0;
            HourStat {
                hour,
                label: format!("{hour:02}:00-{:02}:00", (hour + 1) % 24),
                score: completion + complexity_bonus,
            }
        })
        .collect();

    // stable sort keeps earlier hours first on ties
    stats.sort_by(|a, b| b.score.total_cmp(&a.score));
    stats
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub hours: f64,
    pub completed: usize,
    pub total: usize,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub days: Vec<DaySummary>,
    pub total_hours: f64,
    pub completed: usize,
    pub total: usize,
    pub completion_rate: f64,
}

impl WeeklySummary {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Per-day totals for the seven days ending on `today`.
pub fn weekly_summary(records: &[TaskRecord], today: NaiveDate) -> WeeklySummary {
    let start = today - Duration::days(6);
    let mut by_date: BTreeMap<NaiveDate, (f64, usize, usize)> = BTreeMap::new();
    for r in records.iter().filter(|r| r.date >= start && r.date <= today) {
        let entry = by_date.entry(r.date).or_default();
        entry.0 += r.time_taken;
        entry.1 += usize::from(r.completed);
        entry.2 += 1;
    }

    let days: Vec<DaySummary> = by_date
        .into_iter()
        .map(|(date, (minutes, completed, total))| DaySummary {
            date,
            hours: minutes / 60.0,
            completed,
            total,
            completion_rate: percentage(completed, total),
        })
        .collect();

    let total_hours = days.iter().map(|d| d.hours).sum();
    let completed = days.iter().map(|d| d.completed).sum();
    let total = days.iter().map(|d| d.total).sum();

    WeeklySummary {
        days,
        total_hours,
        completed,
        total,
        completion_rate: percentage(completed, total),
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
