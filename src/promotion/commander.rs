//! Promotion Commander
//!
//! Decides whether promotion is needed and issues the promote command.
//!
//! - Not a replica any more: already promoted, no command issued
//! - Replica, `available`: one promote command
//! - Replica, any other state: `PreconditionError`, no command issued
//!
//! Never retries. A rejected command is a `DependencyError`.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::params::PromotionParams;
use crate::convergence::Clock;
use crate::error::{FailoverError, Result};
use crate::observability::Event;
use crate::replica::{DatabaseControl, ReplicaInspector, ReplicaStatus};

/// Result of a promotion attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionOutcome {
    /// No command was issued; the instance was already standalone
    pub already_promoted: bool,
    /// When the decision was taken
    pub initiated_at: DateTime<Utc>,
}

pub struct PromotionCommander {
    control: Arc<dyn DatabaseControl>,
    clock: Arc<dyn Clock>,
    params: PromotionParams,
}

impl PromotionCommander {
    pub fn new(control: Arc<dyn DatabaseControl>, clock: Arc<dyn Clock>) -> Self {
        Self {
            control,
            clock,
            params: PromotionParams::default(),
        }
    }

    /// Inspect the instance, then promote it if needed.
    pub async fn promote(&self, instance_id: &str) -> Result<PromotionOutcome> {
        let status = ReplicaInspector::new(self.control.clone())
            .inspect(instance_id)
            .await?;
        self.promote_inspected(&status).await
    }

    /// Promote based on a status snapshot already taken.
    pub async fn promote_inspected(&self, status: &ReplicaStatus) -> Result<PromotionOutcome> {
        let instance_id = status.instance_id.as_str();

        if !status.is_replica {
            tracing::warn!(
                event = %Event::PromotionSkipped,
                instance_id,
                "instance is not a read replica or is already promoted"
            );
            return Ok(PromotionOutcome {
                already_promoted: true,
                initiated_at: self.clock.utc_now(),
            });
        }

        if !status.is_promotable() {
            tracing::error!(
                event = %Event::PromotionDenied,
                instance_id,
                state = %status.lifecycle_state,
                "instance cannot be promoted in its current state"
            );
            return Err(FailoverError::Precondition {
                instance_id: instance_id.to_string(),
                state: status.lifecycle_state.clone(),
            });
        }

        let initiated_at = self.clock.utc_now();
        self.control
            .promote_read_replica(instance_id, &self.params)
            .await
            .map_err(|e| {
                tracing::error!(event = %Event::PromotionFailed, instance_id, error = %e);
                FailoverError::Dependency(e.to_string())
            })?;

        tracing::info!(
            event = %Event::PromotionIssued,
            instance_id,
            retention_days = self.params.backup_retention_days,
            backup_window = self.params.backup_window,
            maintenance_window = self.params.maintenance_window,
        );

        Ok(PromotionOutcome {
            already_promoted: false,
            initiated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convergence::ManualClock;
    use crate::error::{CapabilityError, FailoverErrorKind};
    use crate::replica::{LifecycleState, MemoryDatabase};

    fn commander(db: &MemoryDatabase) -> PromotionCommander {
        PromotionCommander::new(Arc::new(db.clone()), Arc::new(ManualClock::new()))
    }

    #[tokio::test]
    async fn test_available_replica_is_promoted_once() {
        let db = MemoryDatabase::replica("dr", "db.example", 5432);
        let outcome = commander(&db).promote("dr").await.unwrap();

        assert!(!outcome.already_promoted);
        let calls = db.promote_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "dr");
        assert_eq!(calls[0].1, PromotionParams::default());
    }

    #[tokio::test]
    async fn test_second_promote_detects_already_promoted() {
        let db = MemoryDatabase::replica("dr", "db.example", 5432);
        let commander = commander(&db);

        commander.promote("dr").await.unwrap();
        let outcome = commander.promote("dr").await.unwrap();

        assert!(outcome.already_promoted);
        assert_eq!(db.promote_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_non_available_replica_is_precondition_error() {
        let db = MemoryDatabase::replica("dr", "db.example", 5432);
        db.set_state(LifecycleState::BackingUp);

        let err = commander(&db).promote("dr").await.unwrap_err();
        assert_eq!(err.kind(), FailoverErrorKind::PreconditionError);
        assert!(err.to_string().contains("backing-up"));
        assert!(db.promote_calls().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_command_is_dependency_error() {
        let db = MemoryDatabase::replica("dr", "db.example", 5432);
        db.fail_promotion(CapabilityError::rejected(
            "PromoteReadReplica",
            "InvalidDBInstanceState",
        ));

        let err = commander(&db).promote("dr").await.unwrap_err();
        assert_eq!(err.kind(), FailoverErrorKind::DependencyError);
        assert!(err.to_string().contains("InvalidDBInstanceState"));
    }
}
