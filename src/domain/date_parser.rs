//! Date and time-of-day parsing: absolute, relative, and weekday formats.

use crate::error::ProdTrackError;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};

/// Parse a task date relative to `today`.
///
/// Accepts `YYYY-MM-DD`, `today`, `yesterday`, `-Nd` (N days ago) and weekday
/// names, which resolve to their most recent occurrence on or before today.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate, ProdTrackError> {
    let input = input.trim().to_lowercase();

    if let Ok(date) = NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
        return Ok(date);
    }

    match input.as_str() {
        "today" => return Ok(today),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Some(days_str) = input.strip_prefix('-').and_then(|r| r.strip_suffix('d')) {
        let days: i64 = days_str.parse().map_err(|_| {
            ProdTrackError::InvalidArgument(format!("Invalid relative date: {input}"))
        })?;
        return Ok(today - Duration::days(days));
    }

    if let Some(weekday) = parse_weekday(&input) {
        return Ok(previous_weekday(today, weekday));
    }

    Err(ProdTrackError::InvalidArgument(format!(
        "Cannot parse date: {input}"
    )))
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(input: &str) -> Result<NaiveTime, ProdTrackError> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .map_err(|_| ProdTrackError::InvalidArgument(format!("Cannot parse time: {input}")))
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Most recent `target` on or before `today`.
fn previous_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let current = today.weekday().num_days_from_monday();
    let target = target.num_days_from_monday();
    let back = (current + 7 - target) % 7;
    today - Duration::days(i64::from(back))
}
