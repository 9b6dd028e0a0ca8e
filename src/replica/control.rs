//! Database control-plane capability

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use super::status::{Endpoint, LifecycleState, ReplicaStatus};
use crate::error::CapabilityError;
use crate::promotion::PromotionParams;

/// Result type for control-plane calls
pub type ControlResult<T> = Result<T, CapabilityError>;

/// Database control plane
///
/// `promote_read_replica` is the only mutation the failover performs on the
/// database.
pub trait DatabaseControl: Send + Sync {
    /// Describe the current status of an instance
    fn describe_instance<'a>(&'a self, instance_id: &'a str) -> BoxFuture<'a, ControlResult<ReplicaStatus>>;

    /// Detach a replica from its source and make it a standalone primary
    fn promote_read_replica<'a>(
        &'a self,
        instance_id: &'a str,
        params: &'a PromotionParams,
    ) -> BoxFuture<'a, ControlResult<()>>;
}

/// How a `MemoryDatabase` behaves after a promotion is issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Convergence {
    /// Available again on the next describe
    Immediate,
    /// Stays `modifying` for this many describes, then becomes available
    AfterPolls(u32),
    /// Stays in the given state forever
    Never(LifecycleState),
}

#[derive(Debug)]
struct MemoryDatabaseInner {
    status: ReplicaStatus,
    convergence: Convergence,
    pending_polls: Option<u32>,
    describe_failures: VecDeque<CapabilityError>,
    promote_failure: Option<CapabilityError>,
    promote_calls: Vec<(String, PromotionParams)>,
    describe_calls: usize,
}

/// In-memory database control plane
///
/// Holds a single instance. Promotion flips it to a standalone instance and
/// lets it converge according to its `Convergence` setting.
#[derive(Debug, Clone)]
pub struct MemoryDatabase {
    inner: Arc<Mutex<MemoryDatabaseInner>>,
}

impl MemoryDatabase {
    /// An available replica with the given endpoint.
    pub fn replica(instance_id: &str, host: &str, port: u16) -> Self {
        Self::with_status(ReplicaStatus {
            instance_id: instance_id.to_string(),
            lifecycle_state: LifecycleState::Available,
            is_replica: true,
            endpoint: Some(Endpoint {
                host: host.to_string(),
                port,
            }),
        })
    }

    pub fn with_status(status: ReplicaStatus) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryDatabaseInner {
                status,
                convergence: Convergence::Immediate,
                pending_polls: None,
                describe_failures: VecDeque::new(),
                promote_failure: None,
                promote_calls: Vec::new(),
                describe_calls: 0,
            })),
        }
    }

    pub fn converging(self, convergence: Convergence) -> Self {
        self.lock().convergence = convergence;
        self
    }

    /// Force the instance into a lifecycle state.
    pub fn set_state(&self, state: LifecycleState) {
        self.lock().status.lifecycle_state = state;
    }

    /// Fail the next promote call with this error.
    pub fn fail_promotion(&self, error: CapabilityError) {
        self.lock().promote_failure = Some(error);
    }

    /// Fail the next describe call with this error.
    pub fn fail_next_describe(&self, error: CapabilityError) {
        self.lock().describe_failures.push_back(error);
    }

    pub fn status(&self) -> ReplicaStatus {
        self.lock().status.clone()
    }

    pub fn promote_calls(&self) -> Vec<(String, PromotionParams)> {
        self.lock().promote_calls.clone()
    }

    pub fn describe_calls(&self) -> usize {
        self.lock().describe_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryDatabaseInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn describe_now(&self, instance_id: &str) -> ControlResult<ReplicaStatus> {
        let mut inner = self.lock();
        inner.describe_calls += 1;
        if let Some(err) = inner.describe_failures.pop_front() {
            return Err(err);
        }
        if inner.status.instance_id != instance_id {
            return Err(CapabilityError::not_found(
                "DescribeDBInstances",
                format!("DBInstance {} not found", instance_id),
            ));
        }
        match inner.pending_polls {
            Some(0) => {
                inner.pending_polls = None;
                inner.status.lifecycle_state = LifecycleState::Available;
            }
            Some(n) => inner.pending_polls = Some(n - 1),
            None => {}
        }
        Ok(inner.status.clone())
    }

    fn promote_now(&self, instance_id: &str, params: &PromotionParams) -> ControlResult<()> {
        let mut inner = self.lock();
        inner.promote_calls.push((instance_id.to_string(), params.clone()));
        if let Some(err) = inner.promote_failure.take() {
            return Err(err);
        }
        if !inner.status.is_replica {
            return Err(CapabilityError::rejected(
                "PromoteReadReplica",
                format!("DB instance {} is not a read replica", instance_id),
            ));
        }
        inner.status.is_replica = false;
        match inner.convergence.clone() {
            Convergence::Immediate => {
                inner.status.lifecycle_state = LifecycleState::Available;
            }
            Convergence::AfterPolls(n) => {
                inner.status.lifecycle_state = LifecycleState::Modifying;
                inner.pending_polls = Some(n);
            }
            Convergence::Never(state) => {
                inner.status.lifecycle_state = state;
            }
        }
        Ok(())
    }
}

impl DatabaseControl for MemoryDatabase {
    fn describe_instance<'a>(&'a self, instance_id: &'a str) -> BoxFuture<'a, ControlResult<ReplicaStatus>> {
        async move { self.describe_now(instance_id) }.boxed()
    }

    fn promote_read_replica<'a>(
        &'a self,
        instance_id: &'a str,
        params: &'a PromotionParams,
    ) -> BoxFuture<'a, ControlResult<()>> {
        async move { self.promote_now(instance_id, params) }.boxed()
    }
}
