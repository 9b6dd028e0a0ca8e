//! Replica subsystem
//!
//! Status model of the standby instance and the control-plane capability
//! used to observe and promote it.

mod control;
mod inspector;
mod status;

pub use control::{Convergence, ControlResult, DatabaseControl, MemoryDatabase};
pub use inspector::ReplicaInspector;
pub use status::{Endpoint, EndpointInfo, LifecycleState, ReplicaStatus};
