//! Observability events for failover runs
//!
//! Every log record emitted by the crate carries one of these as its
//! `event` field, so a run can be followed by event name alone.

use std::fmt;

/// Observable events in a failover run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Run lifecycle
    /// Run received a trigger envelope
    RunStart,
    /// State machine moved between states
    StateTransition,
    /// Trigger did not match; nothing to do
    NoAction,
    /// Failover accepted and started
    FailoverStart,
    /// Failover completed successfully
    FailoverComplete,
    /// Failover reached FAILED
    FailoverFailed,

    // Configuration and trigger
    /// Configuration validated
    ConfigValidated,
    /// Configuration incomplete or wrong region
    ConfigInvalid,
    /// Trigger parsed
    TriggerParsed,
    /// Trigger envelope rejected
    TriggerInvalid,

    // Replica
    /// Instance status fetched
    ReplicaInspected,
    /// Instance status could not be fetched
    ReplicaInspectFailed,

    // Promotion
    /// Instance already standalone; promotion skipped
    PromotionSkipped,
    /// Instance in a state that forbids promotion
    PromotionDenied,
    /// Promote command accepted by the control plane
    PromotionIssued,
    /// Promote command rejected or errored
    PromotionFailed,

    // Convergence
    /// Waiting for the instance to become available
    ConvergenceStart,
    /// One status poll
    ConvergencePoll,
    /// Instance is available with an endpoint
    ConvergenceComplete,
    /// Deadline expired
    ConvergenceTimeout,
    /// Instance entered a state it cannot recover from
    ConvergenceAborted,

    // Credentials
    /// Credential record repointed
    CredentialsUpdated,
    /// Credential record fetch or write failed
    CredentialsUpdateFailed,

    // Notifications
    /// Milestone notification published
    NotificationSent,
    /// Milestone notification could not be published (non-fatal)
    NotificationFailed,
}

impl Event {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RunStart => "RUN_START",
            Event::StateTransition => "STATE_TRANSITION",
            Event::NoAction => "NO_ACTION",
            Event::FailoverStart => "FAILOVER_START",
            Event::FailoverComplete => "FAILOVER_COMPLETE",
            Event::FailoverFailed => "FAILOVER_FAILED",
            Event::ConfigValidated => "CONFIG_VALIDATED",
            Event::ConfigInvalid => "CONFIG_INVALID",
            Event::TriggerParsed => "TRIGGER_PARSED",
            Event::TriggerInvalid => "TRIGGER_INVALID",
            Event::ReplicaInspected => "REPLICA_INSPECTED",
            Event::ReplicaInspectFailed => "REPLICA_INSPECT_FAILED",
            Event::PromotionSkipped => "PROMOTION_SKIPPED",
            Event::PromotionDenied => "PROMOTION_DENIED",
            Event::PromotionIssued => "PROMOTION_ISSUED",
            Event::PromotionFailed => "PROMOTION_FAILED",
            Event::ConvergenceStart => "CONVERGENCE_START",
            Event::ConvergencePoll => "CONVERGENCE_POLL",
            Event::ConvergenceComplete => "CONVERGENCE_COMPLETE",
            Event::ConvergenceTimeout => "CONVERGENCE_TIMEOUT",
            Event::ConvergenceAborted => "CONVERGENCE_ABORTED",
            Event::CredentialsUpdated => "CREDENTIALS_UPDATED",
            Event::CredentialsUpdateFailed => "CREDENTIALS_UPDATE_FAILED",
            Event::NotificationSent => "NOTIFICATION_SENT",
            Event::NotificationFailed => "NOTIFICATION_FAILED",
        }
    }

    /// Events that end a run in FAILED or signal a fault.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::FailoverFailed
                | Event::ConfigInvalid
                | Event::TriggerInvalid
                | Event::ReplicaInspectFailed
                | Event::PromotionDenied
                | Event::PromotionFailed
                | Event::ConvergenceTimeout
                | Event::ConvergenceAborted
                | Event::CredentialsUpdateFailed
                | Event::NotificationFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::FailoverStart.as_str(), "FAILOVER_START");
        assert_eq!(Event::ConvergencePoll.to_string(), "CONVERGENCE_POLL");
        assert_eq!(Event::CredentialsUpdateFailed.as_str(), "CREDENTIALS_UPDATE_FAILED");
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::ConvergenceTimeout.is_failure());
        assert!(Event::NotificationFailed.is_failure());
        assert!(!Event::FailoverComplete.is_failure());
        assert!(!Event::NoAction.is_failure());
    }
}
