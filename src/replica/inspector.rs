//! Replica Inspector
//!
//! Queries the control plane for the current status and replica relationship
//! of an instance. Every call goes to the control plane; nothing is cached.

use std::sync::Arc;

use super::control::DatabaseControl;
use super::status::ReplicaStatus;
use crate::error::Result;
use crate::observability::Event;

pub struct ReplicaInspector {
    control: Arc<dyn DatabaseControl>,
}

impl ReplicaInspector {
    pub fn new(control: Arc<dyn DatabaseControl>) -> Self {
        Self { control }
    }

    /// Fetch a fresh status snapshot.
    ///
    /// A failed describe is a `DependencyError`; it is never read as "not a
    /// replica", which would skip promotion on a transient error.
    pub async fn inspect(&self, instance_id: &str) -> Result<ReplicaStatus> {
        let status = self.control.describe_instance(instance_id).await.map_err(|e| {
            tracing::error!(event = %Event::ReplicaInspectFailed, instance_id, error = %e);
            e
        })?;

        tracing::info!(
            event = %Event::ReplicaInspected,
            instance_id,
            state = %status.lifecycle_state,
            is_replica = status.is_replica,
        );
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CapabilityError, FailoverErrorKind};
    use crate::replica::{LifecycleState, MemoryDatabase};

    #[tokio::test]
    async fn test_inspect_returns_fresh_status() {
        let db = MemoryDatabase::replica("dr", "db.example", 5432);
        let inspector = ReplicaInspector::new(Arc::new(db.clone()));

        let status = inspector.inspect("dr").await.unwrap();
        assert!(status.is_replica);

        db.set_state(LifecycleState::BackingUp);
        let status = inspector.inspect("dr").await.unwrap();
        assert_eq!(status.lifecycle_state, LifecycleState::BackingUp);
        assert_eq!(db.describe_calls(), 2);
    }

    #[tokio::test]
    async fn test_describe_failure_is_dependency_error() {
        let db = MemoryDatabase::replica("dr", "db.example", 5432);
        db.fail_next_describe(CapabilityError::unavailable("DescribeDBInstances", "throttled"));
        let inspector = ReplicaInspector::new(Arc::new(db));

        let err = inspector.inspect("dr").await.unwrap_err();
        assert_eq!(err.kind(), FailoverErrorKind::DependencyError);
    }
}
