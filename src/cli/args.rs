//! CLI argument definitions using clap
//!
//! Commands:
//! - dr-failover run --event <path|-> [--config <path>] [--log-format json|pretty]
//! - dr-failover parse-event --event <path|->
//! - dr-failover check-config [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::observability::LogFormat;

/// Cross-region database failover controller
#[derive(Parser, Debug)]
#[command(name = "dr-failover")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Process one alarm notification and fail over if it asks for it
    Run {
        /// Notification envelope file, or `-` for stdin
        #[arg(long)]
        event: PathBuf,

        /// JSON settings file; the environment is used when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Log output format
        #[arg(long, default_value = "json")]
        log_format: LogFormat,
    },

    /// Parse a notification envelope and print the trigger it carries
    ParseEvent {
        /// Notification envelope file, or `-` for stdin
        #[arg(long)]
        event: PathBuf,
    },

    /// Validate settings without touching any external service
    CheckConfig {
        /// JSON settings file; the environment is used when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
