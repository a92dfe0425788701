//! Burnout risk and workload advice from recent activity.

use crate::analytics::stats::mean;
use crate::domain::record::TaskRecord;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

const LONG_DAY_MINUTES: f64 = 480.0;
const LIGHT_DAY_MINUTES: f64 = 120.0;
const RECOVERY_CATEGORIES: [&str; 2] = ["Break", "Personal"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BurnoutRisk {
    Low,
    Medium,
    High,
}

impl BurnoutRisk {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 4 => Self::High,
            s if s >= 2 => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl fmt::Display for BurnoutRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        f.write_str(s)
    }
}

fn daily_minutes<'a>(records: impl Iterator<Item = &'a TaskRecord>) -> BTreeMap<NaiveDate, f64> {
    let mut by_date = BTreeMap::new();
    for r in records {
        *by_date.entry(r.date).or_insert(0.0) += r.time_taken;
    }
    by_date
}

/// Heuristic risk score over the fourteen days ending on `today`.
pub fn burnout_risk_score(records: &[TaskRecord], today: NaiveDate) -> u32 {
    if records.is_empty() {
        return 0;
    }
    let since = today - Duration::days(13);
    let mut score = 0;

    let daily = daily_minutes(records.iter().filter(|r| r.date >= since && r.date <= today));
    if !daily.is_empty() {
        let long_days = daily.values().filter(|&&m| m > LONG_DAY_MINUTES).count();
        if long_days >= 3 {
            score += 2;
        }
        if long_days >= 5 {
            score += 3;
        }
        let minutes: Vec<f64> = daily.values().copied().collect();
        if mean(&minutes) / 60.0 > 9.0 {
            score += 1;
        }
    }

    let logged: HashSet<NaiveDate> = records.iter().map(|r| r.date).collect();
    let unlogged = (0..14)
        .map(|back| today - Duration::days(back))
        .filter(|d| !logged.contains(d))
        .count();
    if unlogged >= 3 {
        score += 1;
    }

    let total: f64 = records.iter().map(|r| r.time_taken).sum();
    let recovery: f64 = records
        .iter()
        .filter(|r| RECOVERY_CATEGORIES.contains(&r.category.as_str()))
        .map(|r| r.time_taken)
        .sum();
    if total > 0.0 && recovery / total < 0.05 {
        score += 1;
    }

    tracing::debug!(score, recent_days = daily.len(), unlogged, "burnout risk");
    score
}

pub fn assess_burnout_risk(records: &[TaskRecord], today: NaiveDate) -> BurnoutRisk {
    BurnoutRisk::from_score(burnout_risk_score(records, today))
}

/// Workload messages keyed by kind. Later rules replace earlier messages of
/// the same kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkloadAdvice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive: Option<String>,
}

pub fn workload_recommendations(records: &[TaskRecord], today: NaiveDate) -> WorkloadAdvice {
    let mut advice = WorkloadAdvice::default();
    if records.is_empty() {
        advice.suggestion =
            Some("Start logging tasks to get personalized workload recommendations!".into());
        return advice;
    }

    let since = today - Duration::days(6);
    let recent: Vec<&TaskRecord> = records.iter().filter(|r| r.date >= since).collect();
    if recent.is_empty() {
        advice.suggestion = Some(
            "Not enough recent data for workload recommendations. Log more tasks!".into(),
        );
        return advice;
    }

    let daily: Vec<f64> = daily_minutes(recent.iter().copied()).into_values().collect();
    let avg_daily = mean(&daily);
    if avg_daily > LONG_DAY_MINUTES {
        advice.warning = Some(format!(
            "High daily average ({:.1}h). Consider breaking tasks into smaller chunks or taking more breaks.",
            avg_daily / 60.0
        ));
    } else if avg_daily < LIGHT_DAY_MINUTES {
        advice.suggestion = Some(format!(
            "Light schedule ({:.1}h daily). Room to tackle more goals or learn something new.",
            avg_daily / 60.0
        ));
    }

    let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
    for r in &recent {
        *by_category.entry(r.category.as_str()).or_insert(0.0) += r.time_taken;
    }
    let category_total: f64 = by_category.values().sum();
    if category_total > 0.0 {
        let dominant = by_category
            .iter()
            .fold(None::<(&str, f64)>, |best, (&cat, &m)| match best {
                Some((_, bm)) if bm >= m => best,
                _ => Some((cat, m)),
            });
        if let Some((name, minutes)) = dominant {
            let share = minutes / category_total;
            if share > 0.7 {
                advice.suggestion = Some(format!(
                    "'{name}' takes {:.0}% of your time. Consider diversifying activities to avoid monotony.",
                    share * 100.0
                ));
            }
        }
    }

    let completion = recent.iter().filter(|r| r.completed).count() as f64 / recent.len() as f64;
    if completion < 0.6 {
        advice.warning = Some(format!(
            "Low completion rate ({:.0}%). Try setting smaller, more achievable tasks to build momentum.",
            completion * 100.0
        ));
    } else if completion > 0.9 {
        advice.positive = Some(format!(
            "Excellent completion rate ({:.0}%)! You're managing tasks very effectively.",
            completion * 100.0
        ));
    }

    let durations: Vec<f64> = recent.iter().map(|r| r.time_taken).collect();
    let avg_task = mean(&durations);
    if avg_task > 90.0 {
        advice.suggestion = Some(
            "Your average task duration is quite long. Try using the Pomodoro technique or breaking tasks into 60-90 minute blocks.".into(),
        );
    } else if avg_task < 15.0 {
        advice.suggestion = Some(
            "Many short tasks detected. Consider batching similar quick tasks together to reduce context switching.".into(),
        );
    }

    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn record(days_ago: i64, category: &str, minutes: f64, completed: bool) -> TaskRecord {
        let mut r = TaskRecord::new(
            "work",
            today() - Duration::days(days_ago),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            minutes,
        );
        r.category = category.into();
        r.completed = completed;
        r
    }

    #[test]
    fn empty_is_low() {
        assert_eq!(assess_burnout_risk(&[], today()), BurnoutRisk::Low);
    }

    #[test]
    fn sustained_overwork_is_high() {
        // 14 straight days of 10h coding, no breaks
        let records: Vec<TaskRecord> = (0..14).map(|d| record(d, "Coding", 600.0, true)).collect();
        // +2 +3 long days, +1 avg > 9h, +1 no recovery time
        assert_eq!(burnout_risk_score(&records, today()), 7);
        assert_eq!(assess_burnout_risk(&records, today()), BurnoutRisk::High);
    }

    #[test]
    fn balanced_week_with_gaps_is_low() {
        let records = vec![
            record(0, "Coding", 240.0, true),
            record(1, "Coding", 240.0, true),
            record(1, "Break", 60.0, true),
        ];
        // 12 unlogged days: +1 only
        assert_eq!(burnout_risk_score(&records, today()), 1);
        assert_eq!(assess_burnout_risk(&records, today()), BurnoutRisk::Low);
    }

    #[test]
    fn risk_buckets() {
        assert_eq!(BurnoutRisk::from_score(1), BurnoutRisk::Low);
        assert_eq!(BurnoutRisk::from_score(2), BurnoutRisk::Medium);
        assert_eq!(BurnoutRisk::from_score(3), BurnoutRisk::Medium);
        assert_eq!(BurnoutRisk::from_score(4), BurnoutRisk::High);
    }

    #[test]
    fn onboarding_message_without_data() {
        let advice = workload_recommendations(&[], today());
        assert!(advice.suggestion.unwrap().starts_with("Start logging"));
        assert!(advice.warning.is_none());

        let stale = vec![record(30, "Coding", 60.0, true)];
        let advice = workload_recommendations(&stale, today());
        assert!(advice.suggestion.unwrap().starts_with("Not enough recent data"));
    }

    #[test]
    fn later_rules_overwrite_earlier_suggestions() {
        // light schedule, one dominant category, long tasks, all done
        let records = vec![record(0, "Reading", 100.0, true)];
        let advice = workload_recommendations(&records, today());
        assert!(advice.suggestion.unwrap().contains("Pomodoro"));
        assert!(advice.positive.unwrap().contains("100%"));
        assert!(advice.warning.is_none());
    }

    #[test]
    fn heavy_days_and_low_completion_warn() {
        let records = vec![
            record(0, "Coding", 300.0, false),
            record(0, "Meeting", 260.0, false),
            record(1, "Coding", 500.0, true),
        ];
        let advice = workload_recommendations(&records, today());
        assert!(advice.warning.unwrap().starts_with("Low completion rate (33%)"));
    }
}
