//! `prodtrack add` command.

use crate::cli::args::AddArgs;
use crate::domain::date_parser::{parse_date, parse_time};
use crate::domain::record::{Intent, Mood, Priority};
use crate::error::ProdTrackError;
use crate::storage::task_store::{NewTask, TaskStore};
use chrono::Local;

pub fn run(store: &TaskStore, args: AddArgs) -> Result<String, ProdTrackError> {
    let today = Local::now().date_naive();
    let date = parse_date(&args.date, today)?;
    let start = parse_time(&args.start)?;

    // Flatten tags (handle comma-separated)
    let tags: Vec<String> = args
        .tag
        .iter()
        .flat_map(|t| t.split(','))
        .map(|s| s.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let new_task = NewTask {
        task: args.task,
        date,
        start,
        minutes: args.minutes,
        category: args.category,
        priority: Priority::from_str_loose(&args.priority)?,
        mood: Mood::from_str_loose(&args.mood)?,
        energy_level: args.energy,
        focus_level: args.focus,
        intent: Intent::from_str_loose(&args.intent)?,
        difficulty: args.difficulty,
        tags,
        notes: args.notes.unwrap_or_default(),
        completed: args.completed,
    };

    let (id, record) = store.add_manual(new_task)?;
    Ok(format!(
        "Logged task #{id}: {} ({} {}-{})",
        record.task,
        record.date,
        record.start_time.format("%H:%M"),
        record.end_time.format("%H:%M")
    ))
}
