//! Failover subsystem
//!
//! The orchestration state machine: trigger validation, idempotent promotion
//! decision, bounded-wait convergence and credential hand-off, with a
//! structured result for every run.
//!
//! Per-run invariants:
//! - A promote command is issued only for a replica in the `available` state
//! - The resolved endpoint exists only after convergence succeeded
//! - The credential record is merged, never replaced wholesale
//! - Every fatal error is converted into a result exactly once

mod orchestrator;
mod result;
mod run;
mod state;

pub use orchestrator::FailoverOrchestrator;
pub use result::{FailoverResponse, FailoverResult, FailoverStatus, ResponseBody};
pub use run::FailoverRun;
pub use state::FailoverState;
