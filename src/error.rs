//! Failover error taxonomy
//!
//! Every fatal condition of a failover run is one `FailoverError` variant.
//! Components return them through the crate `Result` alias; the orchestrator
//! converts them into a `FailoverResult` exactly once.
//!
//! Capabilities (database control plane, credential store, notification
//! transport) report their own `CapabilityError`, which the calling component
//! translates into the category that fits its position in the run.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::replica::LifecycleState;

/// Result type for failover operations
pub type Result<T, E = FailoverError> = std::result::Result<T, E>;

/// Fatal failover errors
#[derive(Debug, Clone, Error)]
pub enum FailoverError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid trigger: {0}")]
    Parse(String),

    #[error("DB instance {instance_id} not in available state: {state}")]
    Precondition {
        instance_id: String,
        state: LifecycleState,
    },

    #[error("dependency error: {0}")]
    Dependency(String),

    #[error(
        "timed out after {}s waiting for DB instance {instance_id} to become available (last state: {last_state})",
        waited.as_secs()
    )]
    ConvergenceTimeout {
        instance_id: String,
        waited: Duration,
        last_state: LifecycleState,
    },

    #[error("credential update failed for '{record_id}': {message}")]
    CredentialUpdate { record_id: String, message: String },

    #[error("forbidden transition: {from} → {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

/// Error categories, as reported to operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailoverErrorKind {
    ConfigurationError,
    ParseFailure,
    PreconditionError,
    DependencyError,
    ConvergenceTimeoutError,
    CredentialUpdateError,
    InvalidTransition,
}

impl FailoverErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigurationError => "ConfigurationError",
            Self::ParseFailure => "ParseFailure",
            Self::PreconditionError => "PreconditionError",
            Self::DependencyError => "DependencyError",
            Self::ConvergenceTimeoutError => "ConvergenceTimeoutError",
            Self::CredentialUpdateError => "CredentialUpdateError",
            Self::InvalidTransition => "InvalidTransition",
        }
    }
}

impl fmt::Display for FailoverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FailoverError {
    /// Get the error category
    pub fn kind(&self) -> FailoverErrorKind {
        match self {
            Self::Configuration(_) => FailoverErrorKind::ConfigurationError,
            Self::Parse(_) => FailoverErrorKind::ParseFailure,
            Self::Precondition { .. } => FailoverErrorKind::PreconditionError,
            Self::Dependency(_) => FailoverErrorKind::DependencyError,
            Self::ConvergenceTimeout { .. } => FailoverErrorKind::ConvergenceTimeoutError,
            Self::CredentialUpdate { .. } => FailoverErrorKind::CredentialUpdateError,
            Self::InvalidTransition { .. } => FailoverErrorKind::InvalidTransition,
        }
    }

    /// Get the status code reported to the caller.
    ///
    /// 400 only for errors detected before any mutation could have started.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration(_) | Self::Parse(_) => 400,
            _ => 500,
        }
    }

    /// True when the instance has been promoted but the credential record
    /// was not repointed.
    pub fn leaves_partial_state(&self) -> bool {
        matches!(self, Self::CredentialUpdate { .. })
    }

    pub(crate) fn credential_update(record_id: &str, message: impl Into<String>) -> Self {
        Self::CredentialUpdate {
            record_id: record_id.to_string(),
            message: message.into(),
        }
    }
}

/// How a capability call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityErrorKind {
    /// The service understood the call and refused it (e.g. invalid state fault)
    Rejected,
    /// The addressed resource does not exist
    NotFound,
    /// Transport, credentials, throttling or any other failure
    Unavailable,
}

/// Failure reported by an external capability
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed ({kind:?}): {message}")]
pub struct CapabilityError {
    pub operation: &'static str,
    pub kind: CapabilityErrorKind,
    pub message: String,
}

impl CapabilityError {
    pub fn new(operation: &'static str, kind: CapabilityErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    pub fn rejected(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, CapabilityErrorKind::Rejected, message)
    }

    pub fn not_found(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, CapabilityErrorKind::NotFound, message)
    }

    pub fn unavailable(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, CapabilityErrorKind::Unavailable, message)
    }
}

impl From<CapabilityError> for FailoverError {
    fn from(e: CapabilityError) -> Self {
        FailoverError::Dependency(e.to_string())
    }
}
