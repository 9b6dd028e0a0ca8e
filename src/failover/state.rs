//! Failover State Machine
//!
//! ```text
//! Idle → Validated → Inspected → Promoting → Waiting → UpdatingCredentials → Succeeded
//!            │            └──────────────────→ Waiting   (already promoted)
//!            └→ NoAction
//! any non-terminal state → Failed
//! ```
//!
//! - States are explicit and enumerable
//! - Transitions consume the current state and either return the next state
//!   or a `InvalidTransition` error
//! - `EndpointInfo` exists only in states reached after convergence

use std::time::Duration;

use crate::error::{FailoverError, FailoverErrorKind, Result};
use crate::replica::EndpointInfo;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FailoverState {
    /// Nothing checked yet.
    #[default]
    Idle,

    /// Configuration complete and region verified.
    Validated,

    /// Trigger matched; the instance is being inspected.
    Inspected { instance_id: String },

    /// Promote command being issued.
    Promoting { instance_id: String },

    /// Waiting for the instance to converge.
    Waiting {
        instance_id: String,
        budget: Duration,
        already_promoted: bool,
    },

    /// Instance available; credential record being repointed.
    UpdatingCredentials { endpoint: EndpointInfo },

    /// Terminal: failover complete.
    Succeeded { endpoint: EndpointInfo },

    /// Terminal: trigger did not ask for failover.
    NoAction,

    /// Terminal: run failed.
    Failed { kind: FailoverErrorKind },
}

impl FailoverState {
    pub fn new() -> Self {
        Self::Idle
    }

    /// Get the state name for observability.
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Validated => "VALIDATED",
            Self::Inspected { .. } => "INSPECTED",
            Self::Promoting { .. } => "PROMOTING",
            Self::Waiting { .. } => "WAITING",
            Self::UpdatingCredentials { .. } => "UPDATING_CREDENTIALS",
            Self::Succeeded { .. } => "SUCCEEDED",
            Self::NoAction => "NO_ACTION",
            Self::Failed { .. } => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::NoAction | Self::Failed { .. })
    }

    /// Resolved endpoint, once converged.
    pub fn endpoint(&self) -> Option<&EndpointInfo> {
        match self {
            Self::UpdatingCredentials { endpoint } | Self::Succeeded { endpoint } => Some(endpoint),
            _ => None,
        }
    }

    fn forbidden(&self, to: &'static str) -> FailoverError {
        FailoverError::InvalidTransition {
            from: self.state_name(),
            to,
        }
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Idle → Validated
    pub fn validate(self) -> Result<Self> {
        match self {
            Self::Idle => Ok(Self::Validated),
            other => Err(other.forbidden("VALIDATED")),
        }
    }

    /// Validated → NoAction
    pub fn ignore_trigger(self) -> Result<Self> {
        match self {
            Self::Validated => Ok(Self::NoAction),
            other => Err(other.forbidden("NO_ACTION")),
        }
    }

    /// Validated → Inspected
    pub fn begin_inspection(self, instance_id: impl Into<String>) -> Result<Self> {
        match self {
            Self::Validated => Ok(Self::Inspected {
                instance_id: instance_id.into(),
            }),
            other => Err(other.forbidden("INSPECTED")),
        }
    }

    /// Inspected → Promoting
    pub fn begin_promotion(self) -> Result<Self> {
        match self {
            Self::Inspected { instance_id } => Ok(Self::Promoting { instance_id }),
            other => Err(other.forbidden("PROMOTING")),
        }
    }

    /// Inspected → Waiting, when the instance is already standalone.
    pub fn skip_promotion(self, budget: Duration) -> Result<Self> {
        match self {
            Self::Inspected { instance_id } => Ok(Self::Waiting {
                instance_id,
                budget,
                already_promoted: true,
            }),
            other => Err(other.forbidden("WAITING")),
        }
    }

    /// Promoting → Waiting
    pub fn begin_waiting(self, budget: Duration) -> Result<Self> {
        match self {
            Self::Promoting { instance_id } => Ok(Self::Waiting {
                instance_id,
                budget,
                already_promoted: false,
            }),
            other => Err(other.forbidden("WAITING")),
        }
    }

    /// Waiting → UpdatingCredentials
    pub fn converged(self, endpoint: EndpointInfo) -> Result<Self> {
        match self {
            Self::Waiting { .. } => Ok(Self::UpdatingCredentials { endpoint }),
            other => Err(other.forbidden("UPDATING_CREDENTIALS")),
        }
    }

    /// UpdatingCredentials → Succeeded
    pub fn complete(self) -> Result<Self> {
        match self {
            Self::UpdatingCredentials { endpoint } => Ok(Self::Succeeded { endpoint }),
            other => Err(other.forbidden("SUCCEEDED")),
        }
    }

    /// Any non-terminal state → Failed
    pub fn fail(self, kind: FailoverErrorKind) -> Result<Self> {
        if self.is_terminal() {
            return Err(self.forbidden("FAILED"));
        }
        Ok(Self::Failed { kind })
    }
}
