//! Promotion operational parameters
//!
//! Fixed for every promotion; not tunable per call.

use serde::Serialize;

/// Automated backup retention after promotion, in days
pub const BACKUP_RETENTION_DAYS: i32 = 7;

/// Daily backup window (UTC)
pub const PREFERRED_BACKUP_WINDOW: &str = "03:00-04:00";

/// Weekly maintenance window (UTC)
pub const PREFERRED_MAINTENANCE_WINDOW: &str = "sun:04:00-sun:05:00";

/// Parameters sent with a promote command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromotionParams {
    pub backup_retention_days: i32,
    pub backup_window: &'static str,
    pub maintenance_window: &'static str,
}

impl Default for PromotionParams {
    fn default() -> Self {
        Self {
            backup_retention_days: BACKUP_RETENTION_DAYS,
            backup_window: PREFERRED_BACKUP_WINDOW,
            maintenance_window: PREFERRED_MAINTENANCE_WINDOW,
        }
    }
}
