//! dr-failover - cross-region database failover controller
//!
//! Reacts to a health-alarm notification for a primary database by promoting
//! a standby read replica in another region, waiting for it to become
//! available, repointing the shared credential record at it, and reporting
//! each milestone.
//!
//! External systems sit behind capability traits (`DatabaseControl`,
//! `CredentialStore`, `NotificationSink`, `Clock`) with AWS implementations
//! in `aws` and in-memory ones alongside each trait.

pub mod aws;
pub mod cli;
pub mod config;
pub mod convergence;
pub mod credentials;
pub mod error;
pub mod failover;
pub mod notify;
pub mod observability;
pub mod promotion;
pub mod replica;
pub mod trigger;

pub use config::{FailoverConfig, FailoverSettings};
pub use error::{CapabilityError, FailoverError, FailoverErrorKind, Result};
pub use failover::{FailoverOrchestrator, FailoverResponse, FailoverResult, FailoverStatus};
