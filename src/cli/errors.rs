//! CLI-specific error types
//!
//! Any CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::error::FailoverError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Settings missing or invalid
    ConfigError,
    /// I/O error (event file, stdin, stdout)
    IoError,
    /// Notification envelope could not be parsed
    EventError,
    /// Runtime could not be started
    BootFailed,
    /// The run finished with a non-200 status
    FailoverFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "DR_CLI_CONFIG_ERROR",
            Self::IoError => "DR_CLI_IO_ERROR",
            Self::EventError => "DR_CLI_EVENT_ERROR",
            Self::BootFailed => "DR_CLI_BOOT_FAILED",
            Self::FailoverFailed => "DR_CLI_FAILOVER_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn event_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::EventError, msg)
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    pub fn failover_failed(status_code: u16) -> Self {
        Self::new(
            CliErrorCode::FailoverFailed,
            format!("failover run finished with status {}", status_code),
        )
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<FailoverError> for CliError {
    fn from(e: FailoverError) -> Self {
        match e {
            FailoverError::Configuration(msg) => Self::config_error(msg),
            FailoverError::Parse(msg) => Self::event_error(msg),
            other => Self::boot_failed(other.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
