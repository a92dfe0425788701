//! `prodtrack import` command.

use crate::error::ProdTrackError;
use crate::storage::task_store::TaskStore;
use std::path::Path;

pub fn run(store: &TaskStore, path: &str) -> Result<String, ProdTrackError> {
    let added = store.import(Path::new(path))?;
    Ok(match added {
        0 => "No new tasks to import.".to_string(),
        1 => "Imported 1 task.".to_string(),
        n => format!("Imported {n} tasks."),
    })
}
