//! Per-run state holder
//!
//! Owns the `FailoverState` of one run, the path it took, and the instant
//! the run entered VALIDATED. Purely bookkeeping; it makes no decisions.

use std::sync::Arc;
use std::time::Instant;

use super::state::FailoverState;
use crate::convergence::Clock;
use crate::error::{FailoverErrorKind, Result};
use crate::observability::Event;

pub struct FailoverRun {
    state: FailoverState,
    path: Vec<&'static str>,
    validated_at: Option<Instant>,
    clock: Arc<dyn Clock>,
}

impl FailoverRun {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let state = FailoverState::new();
        Self {
            path: vec![state.state_name()],
            state,
            validated_at: None,
            clock,
        }
    }

    pub fn state_name(&self) -> &'static str {
        self.state.state_name()
    }

    /// Every state entered so far, in order
    pub fn path(&self) -> &[&'static str] {
        &self.path
    }

    /// Apply a transition. On error the current state is kept.
    pub fn advance(&mut self, transition: impl FnOnce(FailoverState) -> Result<FailoverState>) -> Result<()> {
        let from = self.state.state_name();
        let next = transition(self.state.clone())?;
        tracing::debug!(event = %Event::StateTransition, from, to = next.state_name());

        if matches!(next, FailoverState::Validated) {
            self.validated_at = Some(self.clock.now());
        }
        self.path.push(next.state_name());
        self.state = next;
        Ok(())
    }

    /// Move to FAILED. A run that is already terminal stays where it is.
    pub fn fail(&mut self, kind: FailoverErrorKind) {
        if let Err(err) = self.advance(|s| s.fail(kind)) {
            tracing::warn!(event = %Event::StateTransition, error = %err, "run already terminal");
        }
    }

    /// Seconds since the run entered VALIDATED; zero if it never did.
    pub fn elapsed_seconds(&self) -> f64 {
        self.validated_at
            .map(|at| self.clock.now().saturating_duration_since(at).as_secs_f64())
            .unwrap_or(0.0)
    }
}
