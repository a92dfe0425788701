//! `prodtrack export` command.

use crate::error::ProdTrackError;
use crate::storage::csv_format::write_records;
use crate::storage::task_store::TaskStore;
use std::fs::File;
use std::io::BufWriter;

pub fn run(store: &TaskStore, output: Option<String>) -> Result<String, ProdTrackError> {
    let records = store.load()?;

    match output {
        Some(path) => {
            let file = File::create(&path)?;
            write_records(BufWriter::new(file), &records)?;
            Ok(format!("Exported {} tasks to {path}", records.len()))
        }
        None => {
            let mut buf = Vec::new();
            write_records(&mut buf, &records)?;
            let text = String::from_utf8_lossy(&buf);
            Ok(text.trim_end_matches('\n').to_string())
        }
    }
}
