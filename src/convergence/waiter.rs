//! Convergence Waiter
//!
//! Polls the instance at a fixed cadence until it is `available` or the
//! deadline expires. This is the only place a run suspends. It is not
//! cancellable except by deadline, and it does not retry failed polls.

use std::sync::Arc;
use std::time::Duration;

use super::clock::Clock;
use crate::error::{FailoverError, Result};
use crate::observability::Event;
use crate::promotion::PromotionOutcome;
use crate::replica::{DatabaseControl, EndpointInfo};

/// Time between status polls
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Wait budget after a genuine promotion
pub const PROMOTED_WAIT: Duration = Duration::from_secs(15 * 60);

/// Wait budget when the instance was already standalone
pub const ALREADY_PROMOTED_WAIT: Duration = Duration::from_secs(60);

/// Poll cadence and deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    pub promoted_budget: Duration,
    pub already_promoted_budget: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            promoted_budget: PROMOTED_WAIT,
            already_promoted_budget: ALREADY_PROMOTED_WAIT,
        }
    }
}

impl WaitPolicy {
    /// Deadline for the wait that follows a promotion decision
    pub fn budget_for(&self, outcome: &PromotionOutcome) -> Duration {
        if outcome.already_promoted {
            self.already_promoted_budget
        } else {
            self.promoted_budget
        }
    }
}

pub struct ConvergenceWaiter {
    control: Arc<dyn DatabaseControl>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
}

impl ConvergenceWaiter {
    pub fn new(control: Arc<dyn DatabaseControl>, clock: Arc<dyn Clock>) -> Self {
        Self {
            control,
            clock,
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Wait until the instance is available and return its endpoint.
    ///
    /// Fails with `ConvergenceTimeoutError` no earlier than `max_wait` after
    /// the first poll. A terminal failure state, a failed poll, or an
    /// available instance without an endpoint are `DependencyError`s.
    pub async fn await_available(&self, instance_id: &str, max_wait: Duration) -> Result<EndpointInfo> {
        tracing::info!(
            event = %Event::ConvergenceStart,
            instance_id,
            max_wait_secs = max_wait.as_secs(),
            poll_interval_secs = self.poll_interval.as_secs(),
        );

        let started = self.clock.now();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let status = self
                .control
                .describe_instance(instance_id)
                .await
                .map_err(|e| FailoverError::Dependency(e.to_string()))?;
            let waited = self.clock.now().saturating_duration_since(started);

            tracing::debug!(
                event = %Event::ConvergencePoll,
                instance_id,
                attempt,
                state = %status.lifecycle_state,
                waited_secs = waited.as_secs(),
            );

            if status.lifecycle_state.is_ready() {
                let endpoint = status.endpoint.ok_or_else(|| {
                    FailoverError::Dependency(format!(
                        "DB instance {} is available but reports no endpoint",
                        instance_id
                    ))
                })?;
                let info = EndpointInfo::new(endpoint, status.lifecycle_state);
                tracing::info!(
                    event = %Event::ConvergenceComplete,
                    instance_id,
                    endpoint = %info.address(),
                    waited_secs = waited.as_secs(),
                );
                return Ok(info);
            }

            if status.lifecycle_state.is_terminal_failure() {
                tracing::error!(
                    event = %Event::ConvergenceAborted,
                    instance_id,
                    state = %status.lifecycle_state,
                );
                return Err(FailoverError::Dependency(format!(
                    "DB instance {} entered terminal state '{}' while waiting",
                    instance_id, status.lifecycle_state
                )));
            }

            if waited >= max_wait {
                tracing::error!(
                    event = %Event::ConvergenceTimeout,
                    instance_id,
                    attempts = attempt,
                    last_state = %status.lifecycle_state,
                );
                return Err(FailoverError::ConvergenceTimeout {
                    instance_id: instance_id.to_string(),
                    waited,
                    last_state: status.lifecycle_state,
                });
            }

            self.clock.sleep(self.poll_interval.min(max_wait - waited)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convergence::ManualClock;
    use crate::error::{CapabilityError, FailoverErrorKind};
    use crate::promotion::PromotionParams;
    use crate::replica::{Convergence, LifecycleState, MemoryDatabase};

    fn waiter(db: &MemoryDatabase, clock: &ManualClock) -> ConvergenceWaiter {
        ConvergenceWaiter::new(Arc::new(db.clone()), Arc::new(clock.clone()))
    }

    async fn promoted(convergence: Convergence) -> MemoryDatabase {
        let db = MemoryDatabase::replica("dr", "db.example", 5432).converging(convergence);
        db.promote_read_replica("dr", &PromotionParams::default()).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_ready_on_first_poll() {
        let db = promoted(Convergence::Immediate).await;
        let clock = ManualClock::new();

        let info = waiter(&db, &clock).await_available("dr", PROMOTED_WAIT).await.unwrap();
        assert_eq!(info.host, "db.example");
        assert_eq!(info.port, 5432);
        assert_eq!(info.lifecycle_state, LifecycleState::Available);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_ready_after_several_polls() {
        let db = promoted(Convergence::AfterPolls(3)).await;
        let clock = ManualClock::new();

        waiter(&db, &clock).await_available("dr", PROMOTED_WAIT).await.unwrap();
        assert_eq!(clock.sleeps(), vec![POLL_INTERVAL; 3]);
        assert_eq!(db.describe_calls(), 4);
    }

    #[tokio::test]
    async fn test_timeout_not_before_deadline() {
        let db = promoted(Convergence::Never(LifecycleState::Modifying)).await;
        let clock = ManualClock::new();

        let err = waiter(&db, &clock)
            .await_available("dr", PROMOTED_WAIT)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailoverErrorKind::ConvergenceTimeoutError);
        assert_eq!(clock.elapsed(), PROMOTED_WAIT);
        match err {
            FailoverError::ConvergenceTimeout { waited, last_state, .. } => {
                assert_eq!(waited, PROMOTED_WAIT);
                assert_eq!(last_state, LifecycleState::Modifying);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_last_sleep_clamped_to_deadline() {
        let db = promoted(Convergence::Never(LifecycleState::Modifying)).await;
        let clock = ManualClock::new();

        waiter(&db, &clock)
            .await_available("dr", Duration::from_secs(45))
            .await
            .unwrap_err();

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(30), Duration::from_secs(15)]);
        assert_eq!(clock.elapsed(), Duration::from_secs(45));
    }

    #[tokio::test]
    async fn test_terminal_state_aborts_early() {
        let db = promoted(Convergence::Never(LifecycleState::Failed)).await;
        let clock = ManualClock::new();

        let err = waiter(&db, &clock)
            .await_available("dr", PROMOTED_WAIT)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailoverErrorKind::DependencyError);
        assert!(clock.elapsed() < PROMOTED_WAIT);
    }

    #[tokio::test]
    async fn test_available_without_endpoint() {
        let db = MemoryDatabase::with_status(crate::replica::ReplicaStatus {
            instance_id: "dr".into(),
            lifecycle_state: LifecycleState::Available,
            is_replica: false,
            endpoint: None,
        });
        let clock = ManualClock::new();

        let err = waiter(&db, &clock)
            .await_available("dr", ALREADY_PROMOTED_WAIT)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no endpoint"));
    }

    #[tokio::test]
    async fn test_poll_failure_is_not_retried() {
        let db = promoted(Convergence::AfterPolls(2)).await;
        db.fail_next_describe(CapabilityError::unavailable("DescribeDBInstances", "connection reset"));
        let clock = ManualClock::new();

        let err = waiter(&db, &clock)
            .await_available("dr", PROMOTED_WAIT)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailoverErrorKind::DependencyError);
        assert_eq!(db.describe_calls(), 1);
    }

    #[test]
    fn test_budget_for_outcome() {
        let policy = WaitPolicy::default();
        let now = chrono::Utc::now();
        let promoted = PromotionOutcome { already_promoted: false, initiated_at: now };
        let skipped = PromotionOutcome { already_promoted: true, initiated_at: now };

        assert_eq!(policy.budget_for(&promoted), Duration::from_secs(900));
        assert_eq!(policy.budget_for(&skipped), Duration::from_secs(60));
    }
}
