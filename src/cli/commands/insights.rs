//! `prodtrack insights` command.

use crate::analytics::insights::generate_insights;
use crate::analytics::patterns::{peak_hours, weekly_summary};
use crate::analytics::wellbeing::workload_recommendations;
use crate::cli::output::{self, InsightsReport, OutputFormat};
use crate::error::ProdTrackError;
use crate::storage::task_store::TaskStore;
use chrono::Local;

pub fn run(store: &TaskStore, format: OutputFormat) -> Result<String, ProdTrackError> {
    let records = store.load()?;
    let today = Local::now().date_naive();

    let report = InsightsReport {
        peak_hours: peak_hours(&records),
        weekly: weekly_summary(&records, today),
        workload: workload_recommendations(&records, today),
        patterns: generate_insights(&records),
    };
    Ok(output::format_insights(&report, format))
}
