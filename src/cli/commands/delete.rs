//! `prodtrack delete` command.

use crate::error::ProdTrackError;
use crate::storage::task_store::TaskStore;
use std::io::{self, Write};

pub fn run(store: &TaskStore, id: usize, force: bool) -> Result<String, ProdTrackError> {
    let records = store.load()?;
    let record = id
        .checked_sub(1)
        .and_then(|i| records.get(i))
        .ok_or(ProdTrackError::TaskNotFound(id))?;

    if !force {
        print!("Delete task #{} \"{}\"? [y/N] ", id, record.task);
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            return Ok("Cancelled.".to_string());
        }
    }

    let removed = store.delete(id)?;
    Ok(format!("Deleted task #{id}: {}", removed.task))
}
