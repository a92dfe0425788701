//! Completion patterns across difficulty, energy, category and hour.

use crate::analytics::stats::{mean, median};
use crate::domain::record::TaskRecord;
use serde::Serialize;
use std::collections::BTreeMap;

pub const MIN_RECORDS_FOR_INSIGHTS: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatternInsights {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<String>,
}

impl PatternInsights {
    /// Populated lines in display order.
    pub fn lines(&self) -> Vec<(&'static str, &str)> {
        [
            ("Difficulty", &self.difficulty),
            ("Energy", &self.energy),
            ("Duration", &self.time_pattern),
            ("Category", &self.category),
            ("Time of day", &self.time_of_day),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }
}

/// Mean completion per group, keyed in ascending order.
fn completion_by<K: Ord>(
    records: &[TaskRecord],
    key: impl Fn(&TaskRecord) -> K,
) -> BTreeMap<K, f64> {
    let mut groups: BTreeMap<K, (usize, usize)> = BTreeMap::new();
    for r in records {
        let g = groups.entry(key(r)).or_default();
        g.0 += usize::from(r.completed);
        g.1 += 1;
    }
    groups
        .into_iter()
        .map(|(k, (done, n))| (k, done as f64 / n as f64))
        .collect()
}

/// First key with the highest and first key with the lowest value.
fn extremes<K>(groups: &BTreeMap<K, f64>) -> Option<((&K, f64), (&K, f64))> {
    let mut iter = groups.iter();
    let (k0, &v0) = iter.next()?;
    let mut best = (k0, v0);
    let mut worst = (k0, v0);
    for (k, &v) in iter {
        if v > best.1 {
            best = (k, v);
        }
        if v < worst.1 {
            worst = (k, v);
        }
    }
    Some((best, worst))
}

pub fn generate_insights(records: &[TaskRecord]) -> PatternInsights {
    if records.len() < MIN_RECORDS_FOR_INSIGHTS {
        return PatternInsights {
            status: format!(
                "Need more data (at least {MIN_RECORDS_FOR_INSIGHTS} tasks) for pattern insights"
            ),
            ..PatternInsights::default()
        };
    }

    let mut insights = PatternInsights::default();

    let by_difficulty = completion_by(records, |r| r.difficulty);
    if by_difficulty.len() > 1 {
        if let Some(((best, bv), (worst, wv))) = extremes(&by_difficulty) {
            insights.difficulty = Some(format!(
                "Peak completion at difficulty {best} ({:.0}%) | Struggle with difficulty {worst} ({:.0}%)",
                bv * 100.0,
                wv * 100.0
            ));
        }
    }

    let by_energy = completion_by(records, |r| r.energy_level);
    if by_energy.len() > 1 {
        if let Some(((best, bv), (_, wv))) = extremes(&by_energy) {
            let spread = if bv > 0.0 { (bv - wv) / bv * 100.0 } else { 0.0 };
            insights.energy = Some(format!(
                "Optimal energy level: {best} ({:.0}% completion) | Performance drops {spread:.0}% across energy levels",
                bv * 100.0
            ));
        }
    }

    let durations: Vec<f64> = records.iter().map(|r| r.time_taken).collect();
    let avg = mean(&durations);
    let dominant = if avg > 60.0 { "long" } else { "short" };
    insights.time_pattern = Some(format!(
        "Average task duration: {avg:.0} mins | Median: {:.0} mins (suggests {dominant} tasks dominate)",
        median(&durations)
    ));

    let by_category = completion_by(records, |r| r.category.clone());
    if by_category.len() > 1 {
        if let Some(((best, bv), (worst, wv))) = extremes(&by_category) {
            insights.category = Some(format!(
                "Best performing: {best} ({:.0}%) | Needs improvement: {worst} ({:.0}%)",
                bv * 100.0,
                wv * 100.0
            ));
        }
    }

    let by_hour = completion_by(records, TaskRecord::start_hour);
    if by_hour.len() > 1 {
        if let Some(((best, bv), (worst, _))) = extremes(&by_hour) {
            insights.time_of_day = Some(format!(
                "Most productive hour: {best}:00 ({:.0}%) | Least productive: {worst}:00",
                bv * 100.0
            ));
        }
    }

    insights.status = "Pattern insights generated successfully".into();
    insights
}
