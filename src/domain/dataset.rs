//! Invariant maintenance over the full record set.

use crate::domain::record::{end_from_duration, normalize_task_name, TaskRecord};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;

/// Normalize names, drop invalid rows and duplicates, repair end times.
///
/// Keeps the first occurrence of each (date, task, start_time, time_taken)
/// key and preserves input order otherwise.
pub fn clean_records(records: Vec<TaskRecord>) -> Vec<TaskRecord> {
    let initial = records.len();
    let mut valid: Vec<TaskRecord> = records
        .into_iter()
        .map(|mut r| {
            r.task = normalize_task_name(&r.task);
            r
        })
        .filter(|r| !r.task.is_empty() && r.time_taken.is_finite() && r.time_taken > 0.0)
        .collect();

    if valid.len() < initial {
        tracing::debug!(dropped = initial - valid.len(), "dropped invalid rows during cleaning");
    }

    let before_dedup = valid.len();
    let mut seen = HashSet::new();
    valid.retain(|r| {
        let (date, task, start, minutes) = r.dedup_key();
        seen.insert((date, task.to_string(), start, minutes))
    });
    if valid.len() < before_dedup {
        tracing::debug!(
            dropped = before_dedup - valid.len(),
            "dropped duplicate rows during cleaning"
        );
    }

    valid.retain_mut(|r| {
        if r.end_time > r.start_time {
            return true;
        }
        match end_from_duration(r.start_time, r.time_taken) {
            Some(end) => {
                r.end_time = end;
                true
            }
            None => {
                tracing::warn!(task = %r.task, minutes = r.time_taken, "dropping row whose duration overflows");
                false
            }
        }
    });

    valid
}

/// Returns the first record on `date` whose `[start, end)` interval intersects
/// the new one. Touching endpoints do not count.
pub fn find_overlap<'a>(
    new_start: NaiveDateTime,
    new_end: NaiveDateTime,
    date: NaiveDate,
    records: &'a [TaskRecord],
) -> Option<&'a TaskRecord> {
    records
        .iter()
        .filter(|r| r.date == date)
        .find(|r| new_start < r.end_time && new_end > r.start_time)
}

pub fn is_overlapping(
    new_start: NaiveDateTime,
    new_end: NaiveDateTime,
    date: NaiveDate,
    records: &[TaskRecord],
) -> bool {
    find_overlap(new_start, new_end, date, records).is_some()
}
