//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Grouping, MemberHandling, Metric},
    lead::LeadUnit,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    /// Log more detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// TOML configuration file, defaults to <config dir>/s2s-skill/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a forecast ensemble against observations
    Score(ScoreArgs),
    /// Rolling 3-month means of a monthly observation series
    Seasonal {
        /// Monthly observation table
        #[arg(long)]
        observation: PathBuf,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    /// Long-format forecast table (init, lead, member, value)
    #[arg(long)]
    pub forecast: PathBuf,

    /// Observation table (time, value)
    #[arg(long)]
    pub observation: PathBuf,

    /// years, seasons, months, weeks, pentads or days
    #[arg(long)]
    pub lead_unit: Option<LeadUnit>,

    /// init_month, init_season or a single month 1-12
    #[arg(long)]
    pub grouping: Option<Grouping>,

    /// mean or pooled
    #[arg(long)]
    pub members: Option<MemberHandling>,

    #[arg(long)]
    pub metric: Option<Metric>,

    /// Output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Installs the log subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("s2s_skill={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Clears `bar` when `result` is an error so it stops ticking.
pub fn clear_on_error<T, E>(bar: &ProgressBar, result: Result<T, E>) -> Result<T, E> {
    if result.is_err() {
        bar.finish_and_clear();
    }

    result
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    let style = ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos:>5}/{len:5} {msg}")
        .map(|style| style.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());

    ProgressBar::new(size).with_message(message).with_style(style)
}

// -- Tests -------------------------------------------------------------------
