//! `prodtrack forecast` command.

use crate::cli::output::{self, OutputFormat};
use crate::config::Config;
use crate::error::ProdTrackError;
use crate::forecast::series::Metric;
use crate::forecast::summary::{summarize, Forecaster};
use crate::forecast::ForecastError;
use crate::storage::task_store::TaskStore;
use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;

const INSUFFICIENT_DATA: &str = "Not enough task history to forecast yet.";

pub fn run(
    store: &TaskStore,
    config: &Config,
    metric: Option<String>,
    horizon: Option<u16>,
    seed: Option<u64>,
    format: OutputFormat,
) -> Result<String, ProdTrackError> {
    let metric = metric
        .map(|m| {
            Metric::from_str_loose(&m).ok_or_else(|| {
                ProdTrackError::InvalidArgument(format!(
                    "Invalid metric: {m} (expected score, workload, tasks, completion)"
                ))
            })
        })
        .transpose()?;

    let mut settings = config.forecast;
    if let Some(h) = horizon {
        settings.horizon = usize::from(h);
    }
    let mut rng = match seed.or(settings.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let records = store.load()?;
    let now = Local::now().naive_local();
    let today = now.date();
    let forecaster = Forecaster::new(settings);

    if let Some(metric) = metric {
        return match forecaster.forecast(metric, &records, today, &mut rng) {
            Ok(f) => Ok(output::format_forecast(&f, format)),
            Err(e @ ForecastError::InvalidHorizon(_)) => {
                Err(ProdTrackError::InvalidArgument(e.to_string()))
            }
            Err(e) => {
                tracing::warn!(error = %e, metric = metric.name(), "forecast unavailable");
                Ok(insufficient(format))
            }
        };
    }

    let forecasts = forecaster
        .forecast_all(&records, today, &mut rng)
        .map_err(|e| ProdTrackError::InvalidArgument(e.to_string()))?;
    let summary = summarize(settings.horizon, today, now, &forecasts);
    Ok(output::format_forecast_summary(&summary, &forecasts, format))
}

fn insufficient(format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => output::to_json(&serde_json::json!({ "error": INSUFFICIENT_DATA })),
        _ => INSUFFICIENT_DATA.to_string(),
    }
}
