//! Promotion subsystem
//!
//! Turns a standby replica into an independent primary. Promotion is
//! irreversible, so the commander refuses to act unless the instance is a
//! replica in the `available` state, and treats an instance that is already
//! standalone as promoted rather than promoting it again.

mod commander;
mod params;

pub use commander::{PromotionCommander, PromotionOutcome};
pub use params::{
    PromotionParams, BACKUP_RETENTION_DAYS, PREFERRED_BACKUP_WINDOW, PREFERRED_MAINTENANCE_WINDOW,
};
