//! Instance status snapshots

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a database instance, as reported by the control plane.
///
/// Unknown status strings are preserved in `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Creating,
    Available,
    Modifying,
    BackingUp,
    Rebooting,
    Upgrading,
    Renaming,
    Maintenance,
    StorageOptimization,
    Starting,
    Stopping,
    Stopped,
    Failed,
    Deleting,
    Deleted,
    IncompatibleRestore,
    IncompatibleParameters,
    Other(String),
}

impl LifecycleState {
    /// Parse a control-plane status string. Never fails.
    pub fn parse(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "creating" => Self::Creating,
            "available" => Self::Available,
            "modifying" => Self::Modifying,
            "backing-up" => Self::BackingUp,
            "rebooting" => Self::Rebooting,
            "upgrading" => Self::Upgrading,
            "renaming" => Self::Renaming,
            "maintenance" => Self::Maintenance,
            "storage-optimization" => Self::StorageOptimization,
            "starting" => Self::Starting,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            "failed" => Self::Failed,
            "deleting" => Self::Deleting,
            "deleted" => Self::Deleted,
            "incompatible-restore" => Self::IncompatibleRestore,
            "incompatible-parameters" => Self::IncompatibleParameters,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "creating",
            Self::Available => "available",
            Self::Modifying => "modifying",
            Self::BackingUp => "backing-up",
            Self::Rebooting => "rebooting",
            Self::Upgrading => "upgrading",
            Self::Renaming => "renaming",
            Self::Maintenance => "maintenance",
            Self::StorageOptimization => "storage-optimization",
            Self::Starting => "starting",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
            Self::Deleting => "deleting",
            Self::Deleted => "deleted",
            Self::IncompatibleRestore => "incompatible-restore",
            Self::IncompatibleParameters => "incompatible-parameters",
            Self::Other(s) => s,
        }
    }

    /// The instance is stable and accepting connections.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// The instance can no longer become available without operator action.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            Self::Failed
                | Self::Deleting
                | Self::Deleted
                | Self::IncompatibleRestore
                | Self::IncompatibleParameters
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LifecycleState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LifecycleState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// Network address of an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

/// Fresh snapshot of an instance. Never cached between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaStatus {
    pub instance_id: String,
    pub lifecycle_state: LifecycleState,
    /// Still replicating from a source instance
    pub is_replica: bool,
    pub endpoint: Option<Endpoint>,
}

impl ReplicaStatus {
    /// Promotion is only ever issued in this state.
    pub fn is_promotable(&self) -> bool {
        self.is_replica && self.lifecycle_state == LifecycleState::Available
    }
}

/// Endpoint resolved once the instance has converged.
///
/// Only produced by the convergence waiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointInfo {
    pub host: String,
    pub port: u16,
    pub lifecycle_state: LifecycleState,
}

impl EndpointInfo {
    pub(crate) fn new(endpoint: Endpoint, lifecycle_state: LifecycleState) -> Self {
        Self {
            host: endpoint.host,
            port: endpoint.port,
            lifecycle_state,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_states() {
        assert_eq!(LifecycleState::parse("available"), LifecycleState::Available);
        assert_eq!(LifecycleState::parse("backing-up"), LifecycleState::BackingUp);
        assert_eq!(LifecycleState::parse("Modifying"), LifecycleState::Modifying);
        assert_eq!(
            LifecycleState::parse("incompatible-parameters"),
            LifecycleState::IncompatibleParameters
        );
    }

    #[test]
    fn test_unknown_state_preserved() {
        let state = LifecycleState::parse("configuring-log-exports");
        assert_eq!(state, LifecycleState::Other("configuring-log-exports".into()));
        assert_eq!(state.as_str(), "configuring-log-exports");
        assert!(!state.is_ready());
        assert!(!state.is_terminal_failure());
    }

    #[test]
    fn test_promotable_requires_replica_and_available() {
        let mut status = ReplicaStatus {
            instance_id: "dr".into(),
            lifecycle_state: LifecycleState::Available,
            is_replica: true,
            endpoint: None,
        };
        assert!(status.is_promotable());

        status.lifecycle_state = LifecycleState::BackingUp;
        assert!(!status.is_promotable());

        status.lifecycle_state = LifecycleState::Available;
        status.is_replica = false;
        assert!(!status.is_promotable());
    }

    #[test]
    fn test_state_serializes_as_status_string() {
        let json = serde_json::to_string(&LifecycleState::BackingUp).unwrap();
        assert_eq!(json, "\"backing-up\"");
        let back: LifecycleState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LifecycleState::BackingUp);
    }
}
