//! AWS-backed capabilities
//!
//! Production implementations of the three capability seams:
//! RDS for the database control plane, Secrets Manager for the credential
//! record, SNS for milestone notifications.

mod rds;
mod secrets;
mod sns;

pub use rds::RdsControl;
pub use secrets::SecretsManagerStore;
pub use sns::SnsNotifier;

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Load the shared SDK configuration for a region.
///
/// Credentials come from the default provider chain.
pub async fn load_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// Clients for every capability, built from one shared configuration
pub struct AwsCapabilities {
    pub database: RdsControl,
    pub credentials: SecretsManagerStore,
    pub notifications: SnsNotifier,
}

impl AwsCapabilities {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            database: RdsControl::new(aws_sdk_rds::Client::new(config)),
            credentials: SecretsManagerStore::new(aws_sdk_secretsmanager::Client::new(config)),
            notifications: SnsNotifier::new(aws_sdk_sns::Client::new(config)),
        }
    }
}
