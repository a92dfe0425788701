//! `prodtrack recommend` command.

use crate::cli::output::{self, OutputFormat};
use crate::config::Config;
use crate::domain::record::Priority;
use crate::error::ProdTrackError;
use crate::recommend::recommender::{recommend, TaskContext};
use crate::storage::task_store::TaskStore;

#[allow(clippy::too_many_arguments)]
pub fn run(
    store: &TaskStore,
    config: &Config,
    id: usize,
    top: Option<u8>,
    category: Option<String>,
    priority: Option<String>,
    include_completed: bool,
    format: OutputFormat,
) -> Result<String, ProdTrackError> {
    let records = store.load()?;
    let record = id
        .checked_sub(1)
        .and_then(|i| records.get(i))
        .ok_or(ProdTrackError::TaskNotFound(id))?;

    let mut context = TaskContext::from(record);
    if let Some(c) = category {
        context = context.with_category(c.trim());
    }
    if let Some(p) = priority {
        context = context.with_priority(Priority::from_str_loose(&p)?.as_str());
    }

    let mut options = config.recommend;
    if let Some(top) = top {
        options.top_n = usize::from(top);
    }
    if include_completed {
        options.exclude_completed = false;
    }

    let recs = recommend(&context, &records, options).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "recommendation failed");
        Vec::new()
    });
    Ok(output::format_recommendations((id, record), &recs, format))
}
