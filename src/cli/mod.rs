//! CLI module for the failover controller
//!
//! Provides command-line interface for:
//! - run: process one alarm notification against AWS
//! - parse-event: decode a notification envelope offline
//! - check-config: validate settings offline

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check_config, failover, parse_event, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_event, write_json};
