//! `prodtrack predict` command.

use crate::cli::args::PredictArgs;
use crate::cli::output::{self, OutputFormat, PredictionReport};
use crate::domain::date_parser::{parse_date, parse_time};
use crate::domain::record::{Intent, Mood, Priority};
use crate::error::ProdTrackError;
use crate::ml::features::PredictionInput;
use crate::ml::handler::ModelHandler;
use crate::storage::task_store::TaskStore;
use chrono::{Datelike, Local, Timelike};

fn build_input(args: PredictArgs) -> Result<PredictionInput, ProdTrackError> {
    let mut input = PredictionInput {
        difficulty: args.difficulty,
        energy_level: args.energy,
        focus_level: args.focus,
        minutes: args.minutes,
        ..PredictionInput::default()
    };
    if let Some(start) = args.start {
        input.hour = parse_time(&start)?.hour();
    }
    if let Some(date) = args.date {
        let today = Local::now().date_naive();
        input.weekday = parse_date(&date, today)?.weekday().num_days_from_monday();
    }
    if let Some(c) = args.category {
        input.category = c.trim().to_string();
    }
    if let Some(p) = args.priority {
        input.priority = Priority::from_str_loose(&p)?.to_string();
    }
    if let Some(m) = args.mood {
        input.mood = Mood::from_str_loose(&m)?.to_string();
    }
    if let Some(i) = args.intent {
        input.intent = Intent::from_str_loose(&i)?.to_string();
    }
    Ok(input)
}

pub fn run(store: &TaskStore, args: PredictArgs, format: OutputFormat) -> Result<String, ProdTrackError> {
    let input = build_input(args)?;
    let records = store.load()?;

    let mut handler = ModelHandler::new();
    let mut notes = Vec::new();
    if let Err(e) = handler.train_completion(&records) {
        tracing::info!(error = %e, "completion model not trained");
        notes.push(format!("Completion model unavailable: {e}"));
    }
    if let Err(e) = handler.train_duration(&records) {
        tracing::info!(error = %e, "duration model not trained");
        notes.push(format!("Duration model unavailable: {e}"));
    }

    let report = PredictionReport {
        completion_probability: handler.predict_completion_probability(&input),
        duration_minutes: handler.predict_task_duration(&input),
        model_accuracy: handler.completion_accuracy,
        duration_mae: handler.duration_mae,
        notes,
    };
    Ok(output::format_prediction(&report, format))
}
