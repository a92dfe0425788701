//! `prodtrack stats` command.

use crate::analytics::score::productivity_score;
use crate::analytics::wellbeing::assess_burnout_risk;
use crate::cli::output::{self, OutputFormat, StatsReport};
use crate::config::Config;
use crate::domain::record::TaskRecord;
use crate::error::ProdTrackError;
use crate::storage::task_store::TaskStore;
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::collections::BTreeMap;

pub fn run(store: &TaskStore, config: &Config, format: OutputFormat) -> Result<String, ProdTrackError> {
    let records = store.load()?;
    let today = Local::now().date_naive();
    let report = build_report(&records, config, today)?;
    Ok(output::format_stats(&report, format))
}

fn build_report(
    records: &[TaskRecord],
    config: &Config,
    today: NaiveDate,
) -> Result<StatsReport, ProdTrackError> {
    let productivity = productivity_score(
        records,
        &config.scoring.productive_categories,
        config.scoring.weights,
    )?;

    let todays: Vec<&TaskRecord> = records.iter().filter(|r| r.date == today).collect();
    let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));

    // category -> (tasks, completed)
    let mut by_category: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for r in records {
        let entry = by_category.entry(r.category.as_str()).or_default();
        entry.0 += 1;
        entry.1 += usize::from(r.completed);
    }
    let top_category = by_category
        .iter()
        .fold(None::<(&str, usize)>, |best, (&name, &(n, _))| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((name, n)),
        })
        .map(|(name, n)| (name.to_string(), n));
    let best_category = by_category
        .iter()
        .map(|(&name, &(n, done))| (name, done as f64 / n as f64 * 100.0))
        .fold(None::<(&str, f64)>, |best, (name, rate)| match best {
            Some((_, b)) if b >= rate => best,
            _ => Some((name, rate)),
        })
        .map(|(name, rate)| (name.to_string(), rate));

    Ok(StatsReport {
        productivity,
        burnout_risk: assess_burnout_risk(records, today),
        today_tasks: todays.len(),
        today_completed: todays.iter().filter(|r| r.completed).count(),
        week_tasks: records.iter().filter(|r| r.date >= week_start).count(),
        top_category,
        category_count: by_category.len(),
        best_category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn record(date: NaiveDate, hour: u32, category: &str, completed: bool) -> TaskRecord {
        let mut r = TaskRecord::new("t", date, NaiveTime::from_hms_opt(hour, 0, 0).unwrap(), 60.0);
        r.category = category.into();
        r.completed = completed;
        r
    }

    #[test]
    fn counts_and_categories() {
        // 2025-03-12 is a Wednesday
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let records = vec![
            record(today, 9, "Coding", true),
            record(today, 11, "Admin", false),
            record(today - Duration::days(1), 9, "Admin", false),
            record(today - Duration::days(5), 9, "Coding", true),
        ];
        let report = build_report(&records, &Config::default(), today).unwrap();
        assert_eq!(report.today_tasks, 2);
        assert_eq!(report.today_completed, 1);
        assert_eq!(report.week_tasks, 3);
        assert_eq!(report.category_count, 2);
        assert_eq!(report.top_category, Some(("Admin".to_string(), 2)));
        assert_eq!(report.best_category, Some(("Coding".to_string(), 100.0)));
        assert!((report.productivity.completion_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_records() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let report = build_report(&[], &Config::default(), today).unwrap();
        assert_eq!(report.productivity.score, 0.0);
        assert!(report.top_category.is_none());
    }
}
