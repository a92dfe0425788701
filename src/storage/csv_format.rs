//! CSV serialization of task records with schema coercion.

use crate::domain::dataset::clean_records;
use crate::domain::record::{
    clamp_level, end_from_duration, Intent, Mood, Priority, TaskRecord, TaskType, DATETIME_FORMAT,
    DATE_FORMAT, DEFAULT_CATEGORY, DEFAULT_DIFFICULTY, DEFAULT_ENERGY, DEFAULT_FOCUS,
    DIFFICULTY_RANGE, ENERGY_RANGE, FOCUS_RANGE, TAGS_SEPARATOR,
};
use crate::error::ProdTrackError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::io::{Read, Write};

/// Fixed column order of the data file.
pub const COLUMN_ORDER: [&str; 16] = [
    "date",
    "task",
    "start_time",
    "end_time",
    "time_taken",
    "category",
    "priority",
    "mood",
    "energy_level",
    "focus_level",
    "intent",
    "difficulty",
    "tags",
    "notes",
    "task_type",
    "completed",
];

/// A row as it appears on disk. Every column is optional so that files with
/// missing columns still load.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRow {
    date: Option<String>,
    task: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    time_taken: Option<String>,
    category: Option<String>,
    priority: Option<String>,
    mood: Option<String>,
    energy_level: Option<String>,
    focus_level: Option<String>,
    intent: Option<String>,
    difficulty: Option<String>,
    tags: Option<String>,
    notes: Option<String>,
    task_type: Option<String>,
    completed: Option<String>,
}

/// Read and clean records. Rows whose essential fields cannot be coerced are
/// dropped; other fields fall back to schema defaults.
pub fn read_records<R: Read>(
    reader: R,
    source: &str,
    default_type: TaskType,
) -> Result<Vec<TaskRecord>, ProdTrackError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .byte_headers()
        .map_err(|e| ProdTrackError::parse(source, e))?
        .clone();
    let headers = csv::StringRecord::from_byte_record_lossy(headers);

    let mut records = Vec::new();
    for (line, row) in csv_reader.byte_records().enumerate() {
        let row = row.map_err(|e| ProdTrackError::parse(source, e))?;
        // bad bytes become U+FFFD instead of failing the whole file
        let row = csv::StringRecord::from_byte_record_lossy(row);
        let raw = match row.deserialize::<RawRow>(Some(&headers)) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(source, row = line + 1, error = %e, "skipping undecodable row");
                continue;
            }
        };
        match coerce_row(raw, default_type) {
            Some(record) => records.push(record),
            None => tracing::warn!(
                source,
                row = line + 1,
                "skipping row with invalid date, time, duration or name"
            ),
        }
    }

    Ok(clean_records(records))
}

/// Write records in the fixed column order, header included.
pub fn write_records<W: Write>(writer: W, records: &[TaskRecord]) -> Result<(), ProdTrackError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let to_io = |e: csv::Error| ProdTrackError::Io(std::io::Error::other(e));

    csv_writer.write_record(COLUMN_ORDER).map_err(to_io)?;
    for r in records {
        let tags = r.tags.join(&TAGS_SEPARATOR.to_string());
        csv_writer
            .write_record([
                r.date.format(DATE_FORMAT).to_string(),
                r.task.clone(),
                r.start_time.format(DATETIME_FORMAT).to_string(),
                r.end_time.format(DATETIME_FORMAT).to_string(),
                format_minutes(r.time_taken),
                r.category.clone(),
                r.priority.to_string(),
                r.mood.to_string(),
                r.energy_level.to_string(),
                r.focus_level.to_string(),
                r.intent.to_string(),
                r.difficulty.to_string(),
                tags,
                r.notes.clone(),
                r.task_type.to_string(),
                if r.completed { "True" } else { "False" }.to_string(),
            ])
            .map_err(to_io)?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn format_minutes(minutes: f64) -> String {
    format!("{minutes}")
}

fn coerce_row(row: RawRow, default_type: TaskType) -> Option<TaskRecord> {
    let date = parse_date_cell(row.date.as_deref()?)?;
    let task = non_empty(row.task)?;
    let start_time = parse_datetime_cell(row.start_time.as_deref()?, date)?;
    let time_taken = row
        .time_taken
        .as_deref()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|m| m.is_finite())
        .unwrap_or(0.0);

    let end_time = match row
        .end_time
        .as_deref()
        .and_then(|s| parse_datetime_cell(s, date))
    {
        Some(end) => end,
        None => end_from_duration(start_time, time_taken)?,
    };

    let tags = row
        .tags
        .unwrap_or_default()
        .split(TAGS_SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect();

    Some(TaskRecord {
        date,
        task,
        start_time,
        end_time,
        time_taken,
        category: non_empty(row.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        priority: parse_or_default(row.priority, Priority::from_str_loose),
        mood: parse_or_default(row.mood, Mood::from_str_loose),
        energy_level: parse_level(row.energy_level, DEFAULT_ENERGY, ENERGY_RANGE),
        focus_level: parse_level(row.focus_level, DEFAULT_FOCUS, FOCUS_RANGE),
        intent: parse_or_default(row.intent, Intent::from_str_loose),
        difficulty: parse_level(row.difficulty, DEFAULT_DIFFICULTY, DIFFICULTY_RANGE),
        tags,
        notes: row.notes.unwrap_or_default(),
        task_type: row
            .task_type
            .and_then(|s| TaskType::from_str_loose(&s).ok())
            .unwrap_or(default_type),
        completed: row.completed.as_deref().is_some_and(parse_bool),
    })
}

fn non_empty(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_or_default<T: Default, E>(cell: Option<String>, parse: fn(&str) -> Result<T, E>) -> T {
    cell.and_then(|s| parse(&s).ok()).unwrap_or_default()
}

fn parse_level(cell: Option<String>, default: u8, range: (u8, u8)) -> u8 {
    cell.and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| clamp_level(v as i64, range))
        .unwrap_or(default)
}

fn parse_bool(cell: &str) -> bool {
    matches!(
        cell.to_lowercase().as_str(),
        "true" | "1" | "1.0" | "yes" | "y"
    )
}

fn parse_date_cell(cell: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(cell, DATE_FORMAT)
        .ok()
        .or_else(|| parse_timestamp(cell).map(|dt| dt.date()))
}

/// Full timestamps, or a bare time-of-day combined with the row's date.
fn parse_datetime_cell(cell: &str, date: NaiveDate) -> Option<NaiveDateTime> {
    parse_timestamp(cell).or_else(|| {
        NaiveTime::parse_from_str(cell, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(cell, "%H:%M"))
            .ok()
            .map(|t| date.and_time(t))
    })
}

fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        DATETIME_FORMAT,
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(cell, f).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "date,task,start_time,end_time,time_taken,category,priority,mood,energy_level,focus_level,intent,difficulty,tags,notes,task_type,completed\n";

    fn read(content: &str) -> Vec<TaskRecord> {
        read_records(content.as_bytes(), "test.csv", TaskType::Manual).unwrap()
    }

    #[test]
    fn reads_full_row() {
        let csv = format!(
            "{HEADER}2025-03-10,Write Docs,2025-03-10 09:00:00,2025-03-10 10:00:00,60.0,Coding,High,💪 Energized,8,7,Learn,4,\"docs,api\",first pass,manual,True\n"
        );
        let records = read(&csv);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.task, "write docs");
        assert_eq!(r.category, "Coding");
        assert_eq!(r.priority, Priority::High);
        assert_eq!(r.mood, Mood::Energized);
        assert_eq!(r.energy_level, 8);
        assert_eq!(r.intent, Intent::Learn);
        assert_eq!(r.tags, vec!["docs", "api"]);
        assert!(r.completed);
    }

    #[test]
    fn missing_columns_use_defaults() {
        let csv = "date,task,start_time,time_taken\n2025-03-10,Read,09:00,30\n";
        let records = read(csv);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.category, "General");
        assert_eq!(r.priority, Priority::Medium);
        assert_eq!(r.difficulty, 3);
        assert_eq!(
            r.end_time,
            NaiveDate::from_ymd_opt(2025, 3, 10)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
        );
        assert!(!r.completed);
    }

    #[test]
    fn invalid_rows_are_dropped() {
        let csv = "date,task,start_time,time_taken\nnot-a-date,Read,09:00,30\n2025-03-10,Read,09:00,0\n2025-03-10,,09:00,30\n";
        assert!(read(csv).is_empty());
    }

    #[test]
    fn overflowing_duration_drops_only_that_row() {
        let csv = "date,task,start_time,time_taken\n2025-03-10,Forever,09:00,1e13\n2025-03-10,Read,11:00,30\n";
        let records = read(csv);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].task, "read");
    }

    #[test]
    fn invalid_utf8_cell_keeps_the_file_readable() {
        let mut bytes = b"date,task,start_time,time_taken,notes\n2025-03-10,Read,09:00,30,fine\n2025-03-10,Write,10:00,45,".to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE]);
        bytes.push(b'\n');

        let records = read_records(bytes.as_slice(), "test.csv", TaskType::Manual).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].notes, "fine");
        assert_eq!(records[1].task, "write");
        assert!(records[1].notes.contains('\u{FFFD}'));
    }

    #[test]
    fn out_of_range_levels_are_clamped() {
        let csv = "date,task,start_time,time_taken,energy_level,difficulty\n2025-03-10,Read,09:00,30,14,0\n";
        let r = &read(csv)[0];
        assert_eq!(r.energy_level, 10);
        assert_eq!(r.difficulty, 1);
    }

    #[test]
    fn default_task_type_applies_when_column_missing() {
        let csv = "date,task,start_time,time_taken\n2025-03-10,Read,09:00,30\n";
        let records = read_records(csv.as_bytes(), "import.csv", TaskType::Imported).unwrap();
        assert_eq!(records[0].task_type, TaskType::Imported);
    }

    #[test]
    fn write_then_read_preserves_fields() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let mut r = TaskRecord::new("plan sprint", date, NaiveTime::from_hms_opt(14, 0, 0).unwrap(), 50.0);
        r.tags = vec!["team".into(), "q2".into()];
        r.notes = "with, commas".into();
        r.mood = Mood::Frustrated;
        r.completed = true;

        let mut buf = Vec::new();
        write_records(&mut buf, &[r.clone()]).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("date,task,start_time,end_time,time_taken"));
        assert!(text.contains("2025-03-10 14:00:00"));
        assert!(text.contains("True"));

        let back = read_records(buf.as_slice(), "mem", TaskType::Manual).unwrap();
        assert_eq!(back, vec![r]);
    }
}
