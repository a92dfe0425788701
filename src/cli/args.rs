//! Command-line argument definitions using clap derive.

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "prodtrack",
    version,
    about = "Track tasks and get productivity scores, recommendations and forecasts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Override the task data file.
    #[arg(long, global = true)]
    pub data_file: Option<String>,

    /// Override config file path.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// More diagnostics on stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a default configuration file.
    Init {
        /// Overwrite existing config file.
        #[arg(long)]
        force: bool,
    },

    /// Log a task.
    Add(AddArgs),

    /// List logged tasks.
    List {
        /// Only tasks from the last N days, today included.
        #[arg(long)]
        days: Option<u32>,

        /// Filter by category.
        #[arg(long, short)]
        category: Option<String>,

        /// Filter by priority.
        #[arg(long, short)]
        priority: Option<String>,

        /// Filter by mood.
        #[arg(long)]
        mood: Option<String>,

        /// Filter by status (completed, pending).
        #[arg(long)]
        status: Option<String>,
    },

    /// Mark a task as completed.
    Done {
        /// Task ID.
        id: usize,
    },

    /// Delete a task.
    Delete {
        /// Task ID.
        id: usize,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Merge tasks from a CSV file.
    Import {
        /// CSV file in the task schema.
        path: String,
    },

    /// Write all tasks as CSV.
    Export {
        /// Output file (stdout when omitted).
        #[arg(long, short)]
        output: Option<String>,
    },

    /// Productivity score, focus time and burnout risk.
    Stats,

    /// Peak hours, weekly summary, workload advice and patterns.
    Insights,

    /// Tasks similar to a logged one.
    Recommend {
        /// Task ID to find neighbours for.
        id: usize,

        /// Number of suggestions.
        #[arg(long, value_parser = clap::value_parser!(u8).range(3..=8))]
        top: Option<u8>,

        /// Pretend the task has this category.
        #[arg(long)]
        category: Option<String>,

        /// Pretend the task has this priority.
        #[arg(long)]
        priority: Option<String>,

        /// Consider completed tasks too.
        #[arg(long)]
        include_completed: bool,
    },

    /// Predict completion probability and duration for a planned task.
    Predict(PredictArgs),

    /// Forecast productivity, workload, task count and completion.
    Forecast {
        /// One metric (score, workload, tasks, completion); all when omitted.
        #[arg(long, short)]
        metric: Option<String>,

        /// Days ahead.
        #[arg(long, value_parser = clap::value_parser!(u16).range(3..=30))]
        horizon: Option<u16>,

        /// Seed for reproducible forecasts.
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task name.
    pub task: String,

    /// Minutes spent.
    #[arg(long, short)]
    pub minutes: f64,

    /// Start time (HH:MM).
    #[arg(long, short)]
    pub start: String,

    /// Date (YYYY-MM-DD, today, yesterday, -3d, monday..sunday).
    #[arg(long, short, default_value = "today")]
    pub date: String,

    #[arg(long, short, default_value = "General")]
    pub category: String,

    /// low, medium, high.
    #[arg(long, short, default_value = "medium")]
    pub priority: String,

    /// happy, neutral, tired, frustrated, energized.
    #[arg(long, default_value = "neutral")]
    pub mood: String,

    /// 1-10.
    #[arg(long, default_value_t = 5)]
    pub energy: u8,

    /// 1-10.
    #[arg(long, default_value_t = 5)]
    pub focus: u8,

    /// complete, learn, review, plan, practice, explore.
    #[arg(long, default_value = "complete")]
    pub intent: String,

    /// 1-5.
    #[arg(long, default_value_t = 3)]
    pub difficulty: u8,

    /// Tags (comma-separated or repeated).
    #[arg(long, short)]
    pub tag: Vec<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Log the task as already completed.
    #[arg(long)]
    pub completed: bool,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// 1-5.
    #[arg(long, default_value_t = 3)]
    pub difficulty: i64,

    /// 1-10.
    #[arg(long, default_value_t = 5)]
    pub energy: i64,

    /// 1-10.
    #[arg(long, default_value_t = 5)]
    pub focus: i64,

    /// Planned minutes.
    #[arg(long, default_value_t = 30.0)]
    pub minutes: f64,

    /// Planned start time (HH:MM); noon when omitted.
    #[arg(long)]
    pub start: Option<String>,

    /// Planned date; Tuesday is assumed when omitted.
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub priority: Option<String>,

    #[arg(long)]
    pub mood: Option<String>,

    #[arg(long)]
    pub intent: Option<String>,
}
