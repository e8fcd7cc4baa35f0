//! Terminal front end: reads commands from stdin, drives the core state
//! machine and executes its effects through the engine.

mod app;
mod commands;
mod effects;
mod persistence;
mod render;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use triage_engine::DEFAULT_BACKEND_URL;
use triage_logging::LogDestination;

pub use app::run_app;

/// Command-line arguments for the triage client
#[derive(Parser, Debug)]
#[command(name = "triage")]
#[command(about = "Terminal client for the machine-failure analysis backend")]
#[command(version)]
pub struct Args {
    /// Base address of the analysis backend
    #[arg(long, env = "TRIAGE_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    pub backend_url: String,

    /// Directory holding preferences and the log file
    #[arg(long, env = "TRIAGE_STATE_DIR", default_value = ".triage")]
    pub state_dir: PathBuf,

    /// Where log output goes
    #[arg(long, value_enum, default_value = "file")]
    pub log_to: LogTarget,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,

    /// Seconds between polls of a report the backend is still generating
    #[arg(long, default_value_t = 5)]
    pub poll_interval_secs: u64,

    /// Polls before giving up on a pending report
    #[arg(long, default_value_t = 12)]
    pub poll_attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
