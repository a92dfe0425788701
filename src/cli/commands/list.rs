//! `prodtrack list` command.

use crate::cli::output::{self, OutputFormat};
use crate::domain::record::{Mood, Priority};
use crate::error::ProdTrackError;
use crate::storage::task_store::TaskStore;
use chrono::{Duration, Local};

pub fn run(
    store: &TaskStore,
    days: Option<u32>,
    category: Option<String>,
    priority: Option<String>,
    mood: Option<String>,
    status: Option<String>,
    format: OutputFormat,
) -> Result<String, ProdTrackError> {
    let records = store.load()?;
    let today = Local::now().date_naive();

    let mut tasks: Vec<_> = records.iter().enumerate().map(|(i, r)| (i + 1, r)).collect();

    if let Some(days) = days {
        let since = today - Duration::days(i64::from(days.max(1)) - 1);
        tasks.retain(|(_, r)| r.date >= since);
    }
    if let Some(ref c) = category {
        tasks.retain(|(_, r)| r.category.eq_ignore_ascii_case(c));
    }
    if let Some(ref p) = priority {
        let target = Priority::from_str_loose(p)?;
        tasks.retain(|(_, r)| r.priority == target);
    }
    if let Some(ref m) = mood {
        let target = Mood::from_str_loose(m)?;
        tasks.retain(|(_, r)| r.mood == target);
    }
    if let Some(ref s) = status {
        let want_completed = match s.trim().to_lowercase().as_str() {
            "completed" | "done" => true,
            "pending" | "open" => false,
            _ => {
                return Err(ProdTrackError::InvalidArgument(format!(
                    "Invalid status: {s} (expected completed, pending)"
                )))
            }
        };
        tasks.retain(|(_, r)| r.completed == want_completed);
    }

    Ok(output::format_task_list(&tasks, format))
}
