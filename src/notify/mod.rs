//! Notification subsystem
//!
//! Operators are told when a failover starts, succeeds, or fails. Delivery
//! is best effort and structurally separate from the fatal components: the
//! notifier has no error return.

mod notifier;
mod sink;

pub use notifier::{Milestone, MilestoneMessage, Notifier};
pub use sink::{Notification, NotificationSink, RecordingSink};
