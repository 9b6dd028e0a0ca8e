//! Convergence subsystem
//!
//! Bounded waiting for the instance to reach a stable, usable state.

mod clock;
mod waiter;

pub use clock::{Clock, ManualClock, SystemClock};
pub use waiter::{ConvergenceWaiter, WaitPolicy, ALREADY_PROMOTED_WAIT, POLL_INTERVAL, PROMOTED_WAIT};
