//! `prodtrack done` command.

use crate::error::ProdTrackError;
use crate::storage::task_store::TaskStore;

pub fn run(store: &TaskStore, id: usize) -> Result<String, ProdTrackError> {
    let record = store.mark_completed(id)?;
    Ok(format!("Completed task #{id}: {}", record.task))
}
