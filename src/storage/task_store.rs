//! Task persistence over a single CSV file.

use crate::domain::dataset::{clean_records, find_overlap};
use crate::domain::record::{
    end_from_duration, normalize_task_name, Intent, Mood, Priority, TaskRecord, TaskType,
    DIFFICULTY_RANGE, ENERGY_RANGE, FOCUS_RANGE,
};
use crate::error::ProdTrackError;
use crate::storage::csv_format::{read_records, write_records};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Fields of a manually entered task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub task: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub minutes: f64,
    pub category: String,
    pub priority: Priority,
    pub mood: Mood,
    pub energy_level: u8,
    pub focus_level: u8,
    pub intent: Intent,
    pub difficulty: u8,
    pub tags: Vec<String>,
    pub notes: String,
    pub completed: bool,
}

impl NewTask {
    fn validate(&self) -> Result<(), ProdTrackError> {
        if normalize_task_name(&self.task).is_empty() {
            return Err(ProdTrackError::InvalidArgument(
                "Task name must not be empty".into(),
            ));
        }
        if !self.minutes.is_finite() || self.minutes <= 0.0 {
            return Err(ProdTrackError::InvalidArgument(format!(
                "Duration must be positive (got {})",
                self.minutes
            )));
        }
        self.end()?;
        check_range("energy", self.energy_level, ENERGY_RANGE)?;
        check_range("focus", self.focus_level, FOCUS_RANGE)?;
        check_range("difficulty", self.difficulty, DIFFICULTY_RANGE)?;
        Ok(())
    }

    fn end(&self) -> Result<NaiveDateTime, ProdTrackError> {
        end_from_duration(self.date.and_time(self.start), self.minutes).ok_or_else(|| {
            ProdTrackError::InvalidArgument(format!(
                "Duration of {} minutes is too large",
                self.minutes
            ))
        })
    }

    fn into_record(self) -> TaskRecord {
        let mut record = TaskRecord::new(&self.task, self.date, self.start, self.minutes);
        record.category = self.category.trim().to_string();
        if record.category.is_empty() {
            record.category = crate::domain::record::DEFAULT_CATEGORY.to_string();
        }
        record.priority = self.priority;
        record.mood = self.mood;
        record.energy_level = self.energy_level;
        record.focus_level = self.focus_level;
        record.intent = self.intent;
        record.difficulty = self.difficulty;
        record.tags = self.tags;
        record.notes = self.notes;
        record.task_type = TaskType::Manual;
        record.completed = self.completed;
        record
    }
}

fn check_range(name: &str, value: u8, (lo, hi): (u8, u8)) -> Result<(), ProdTrackError> {
    if value < lo || value > hi {
        return Err(ProdTrackError::InvalidArgument(format!(
            "{name} must be between {lo} and {hi} (got {value})"
        )));
    }
    Ok(())
}

pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record. A missing file is an empty data set.
    pub fn load(&self) -> Result<Vec<TaskRecord>, ProdTrackError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "data file not found, starting empty");
            return Ok(Vec::new());
        }
        let file = File::open(&self.path)?;
        let source = self.path.to_string_lossy();
        let records = read_records(BufReader::new(file), &source, TaskType::Manual)?;
        tracing::debug!(count = records.len(), "loaded records");
        Ok(records)
    }

    /// Rewrite the whole file.
    pub fn save(&self, records: &[TaskRecord]) -> Result<(), ProdTrackError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&self.path)?;
        write_records(BufWriter::new(file), records)?;
        tracing::debug!(count = records.len(), path = %self.path.display(), "saved records");
        Ok(())
    }

    /// Append a manual entry. Returns the stored record's 1-based id.
    pub fn add_manual(&self, new_task: NewTask) -> Result<(usize, TaskRecord), ProdTrackError> {
        new_task.validate()?;
        let mut records = self.load()?;

        let start = new_task.date.and_time(new_task.start);
        let end = new_task.end()?;
        if let Some(existing) = find_overlap(start, end, new_task.date, &records) {
            return Err(ProdTrackError::Overlap {
                existing: format!(
                    "{} {}-{}",
                    existing.task,
                    existing.start_time.format("%H:%M"),
                    existing.end_time.format("%H:%M")
                ),
            });
        }

        let record = new_task.into_record();
        records.push(record.clone());
        let records = clean_records(records);
        self.save(&records)?;

        let id = records
            .iter()
            .position(|r| r.dedup_key() == record.dedup_key())
            .map_or(records.len(), |i| i + 1);
        Ok((id, record))
    }

    /// Mark a record completed. Already-completed records are left as is.
    pub fn mark_completed(&self, id: usize) -> Result<TaskRecord, ProdTrackError> {
        let mut records = self.load()?;
        let index = Self::index_of(id, &records)?;
        if !records[index].completed {
            records[index].completed = true;
            self.save(&records)?;
        }
        Ok(records[index].clone())
    }

    pub fn delete(&self, id: usize) -> Result<TaskRecord, ProdTrackError> {
        let mut records = self.load()?;
        let index = Self::index_of(id, &records)?;
        let removed = records.remove(index);
        self.save(&records)?;
        Ok(removed)
    }

    /// Merge records from another CSV file. Returns how many were new.
    pub fn import(&self, source: &Path) -> Result<usize, ProdTrackError> {
        if !source.exists() {
            return Err(ProdTrackError::InvalidArgument(format!(
                "Import file not found: {}",
                source.display()
            )));
        }
        let file = File::open(source)?;
        let incoming = read_records(
            BufReader::new(file),
            &source.to_string_lossy(),
            TaskType::Imported,
        )?;

        let mut records = self.load()?;
        let before = records.len();
        records.extend(incoming);
        let records = clean_records(records);
        let added = records.len().saturating_sub(before);
        self.save(&records)?;
        tracing::info!(added, source = %source.display(), "imported records");
        Ok(added)
    }

    fn index_of(id: usize, records: &[TaskRecord]) -> Result<usize, ProdTrackError> {
        if id == 0 || id > records.len() {
            return Err(ProdTrackError::TaskNotFound(id));
        }
        Ok(id - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TaskStore) {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::new(dir.path().join("nested").join("tasks.csv"));
        (dir, store)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn new_task(name: &str, h: u32, m: u32, minutes: f64) -> NewTask {
        NewTask {
            task: name.into(),
            date: day(),
            start: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            minutes,
            category: "Coding".into(),
            priority: Priority::High,
            mood: Mood::Happy,
            energy_level: 7,
            focus_level: 8,
            intent: Intent::Complete,
            difficulty: 3,
            tags: vec!["rust".into()],
            notes: String::new(),
            completed: false,
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let (_dir, store) = setup();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn add_and_reload() {
        let (_dir, store) = setup();
        let (id, record) = store.add_manual(new_task("Write Parser", 9, 0, 60.0)).unwrap();
        assert_eq!(id, 1);
        assert_eq!(record.task, "write parser");

        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![record]);
    }

    #[test]
    fn overlapping_entry_rejected() {
        let (_dir, store) = setup();
        store.add_manual(new_task("standup", 9, 0, 30.0)).unwrap();
        let err = store.add_manual(new_task("review", 9, 15, 30.0)).unwrap_err();
        assert!(matches!(err, ProdTrackError::Overlap { .. }));
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn adjacent_entry_accepted() {
        let (_dir, store) = setup();
        store.add_manual(new_task("standup", 9, 0, 30.0)).unwrap();
        let (id, _) = store.add_manual(new_task("review", 9, 30, 30.0)).unwrap();
        assert_eq!(id, 2);
    }

    #[test]
    fn invalid_ranges_rejected() {
        let (_dir, store) = setup();
        let mut t = new_task("x", 9, 0, 30.0);
        t.energy_level = 11;
        assert!(matches!(
            store.add_manual(t).unwrap_err(),
            ProdTrackError::InvalidArgument(_)
        ));
        assert!(store.add_manual(new_task("x", 9, 0, 0.0)).is_err());
        assert!(store.add_manual(new_task("   ", 9, 0, 10.0)).is_err());
    }

    #[test]
    fn overflowing_duration_rejected() {
        let (_dir, store) = setup();
        let err = store.add_manual(new_task("forever", 9, 0, 1e13)).unwrap_err();
        match err {
            ProdTrackError::InvalidArgument(msg) => assert!(msg.contains("too large")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!store.path().exists());
    }

    #[test]
    fn mark_completed_and_delete() {
        let (_dir, store) = setup();
        store.add_manual(new_task("a", 9, 0, 30.0)).unwrap();
        store.add_manual(new_task("b", 10, 0, 30.0)).unwrap();

        let done = store.mark_completed(2).unwrap();
        assert!(done.completed);
        assert!(store.mark_completed(2).unwrap().completed);

        let removed = store.delete(1).unwrap();
        assert_eq!(removed.task, "a");
        let remaining = store.load().unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].completed);

        assert!(matches!(store.delete(5), Err(ProdTrackError::TaskNotFound(5))));
        assert!(matches!(store.mark_completed(0), Err(ProdTrackError::TaskNotFound(0))));
    }

    #[test]
    fn import_merges_and_dedupes() {
        let (dir, store) = setup();
        store.add_manual(new_task("standup", 9, 0, 30.0)).unwrap();

        let import_path = dir.path().join("in.csv");
        std::fs::write(
            &import_path,
            "date,task,start_time,time_taken,category\n\
             2025-03-10,Standup,2025-03-10 09:00:00,30,Meeting\n\
             2025-03-11,Gym,2025-03-11 18:00:00,45,Exercise\n",
        )
        .unwrap();

        assert_eq!(store.import(&import_path).unwrap(), 1);
        let records = store.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].task, "gym");
        assert_eq!(records[1].task_type, TaskType::Imported);

        assert_eq!(store.import(&import_path).unwrap(), 0);
        assert!(store.import(&dir.path().join("missing.csv")).is_err());
    }
}
