mod analytics;
mod cli;
mod config;
mod domain;
mod error;
mod forecast;
mod logging;
mod ml;
mod recommend;
mod storage;

use crate::cli::args::{Cli, Command};
use crate::cli::output::OutputFormat;
use crate::config::Config;
use crate::error::ProdTrackError;
use crate::storage::task_store::TaskStore;
use clap::Parser;
use std::path::Path;
use std::process;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            if let ProdTrackError::ParseError { source, .. } = &e {
                eprintln!("Caused by: {source}");
            }
            process::exit(e.exit_code());
        }
    }
}

fn run(cli: Cli) -> Result<String, ProdTrackError> {
    let config_path = cli.config.as_deref().map(Path::new);

    // Handle init before loading config
    if let Command::Init { force } = &cli.command {
        return cli::commands::init::run(config_path, *force);
    }

    let config = Config::load(config_path, cli.data_file.as_deref())?;
    let color = config.display.color && !cli.no_color;
    if !color {
        colored::control::set_override(false);
    }
    let format = OutputFormat::from_flags(cli.json, !color);
    let store = TaskStore::new(config.data_file());
    tracing::debug!(data_file = %store.path().display(), "resolved data file");

    match cli.command {
        Command::Init { .. } => unreachable!(),

        Command::Add(args) => cli::commands::add::run(&store, args),

        Command::List {
            days,
            category,
            priority,
            mood,
            status,
        } => cli::commands::list::run(&store, days, category, priority, mood, status, format),

        Command::Done { id } => cli::commands::done::run(&store, id),
        Command::Delete { id, force } => cli::commands::delete::run(&store, id, force),

        Command::Import { path } => cli::commands::import::run(&store, &path),
        Command::Export { output } => cli::commands::export::run(&store, output),

        Command::Stats => cli::commands::stats::run(&store, &config, format),
        Command::Insights => cli::commands::insights::run(&store, format),

        Command::Recommend {
            id,
            top,
            category,
            priority,
            include_completed,
        } => cli::commands::recommend::run(
            &store,
            &config,
            id,
            top,
            category,
            priority,
            include_completed,
            format,
        ),

        Command::Predict(args) => cli::commands::predict::run(&store, args, format),

        Command::Forecast {
            metric,
            horizon,
            seed,
        } => cli::commands::forecast::run(&store, &config, metric, horizon, seed, format),
    }
}
