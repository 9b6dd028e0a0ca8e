//! Failover configuration
//!
//! `FailoverSettings` holds whatever the environment (or a JSON file)
//! provided; `validate` turns it into a complete `FailoverConfig` or a
//! `ConfigurationError` naming every missing field.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FailoverError, Result};

/// Region the failover is expected to run in
pub const DEFAULT_EXPECTED_REGION: &str = "us-east-1";

pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_ALARM_NAME: &str = "PRIMARY_HEALTH_ALARM_NAME";
pub const ENV_INSTANCE_ID: &str = "DR_DB_REPLICA_ID";
pub const ENV_CREDENTIAL_RECORD: &str = "DR_DB_CREDENTIALS_SECRET_NAME";
pub const ENV_NOTIFICATION_TOPIC: &str = "NOTIFICATION_TOPIC_ARN";
pub const ENV_EXPECTED_REGION: &str = "DR_EXPECTED_REGION";

/// Raw, possibly incomplete settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailoverSettings {
    /// Region the process is executing in
    #[serde(default)]
    pub region: Option<String>,

    /// Name of the health alarm that triggers failover
    #[serde(default)]
    pub alarm_name: Option<String>,

    /// Identifier of the standby replica
    #[serde(default)]
    pub instance_id: Option<String>,

    /// Identifier of the credential record to repoint
    #[serde(default)]
    pub credential_record_id: Option<String>,

    /// Destination for milestone notifications
    #[serde(default)]
    pub notification_topic: Option<String>,

    /// Region the failover must run in (default: us-east-1)
    #[serde(default = "default_expected_region")]
    pub expected_region: String,
}

fn default_expected_region() -> String {
    DEFAULT_EXPECTED_REGION.to_string()
}

impl Default for FailoverSettings {
    fn default() -> Self {
        Self {
            region: None,
            alarm_name: None,
            instance_id: None,
            credential_record_id: None,
            notification_topic: None,
            expected_region: default_expected_region(),
        }
    }
}

/// Complete, validated configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailoverConfig {
    pub region: String,
    pub alarm_name: String,
    pub instance_id: String,
    pub credential_record_id: String,
    pub notification_topic: String,
}

impl FailoverSettings {
    /// Load settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            region: lookup(ENV_REGION),
            alarm_name: lookup(ENV_ALARM_NAME),
            instance_id: lookup(ENV_INSTANCE_ID),
            credential_record_id: lookup(ENV_CREDENTIAL_RECORD),
            notification_topic: lookup(ENV_NOTIFICATION_TOPIC),
            expected_region: lookup(ENV_EXPECTED_REGION)
                .filter(|r| !r.is_empty())
                .unwrap_or_else(default_expected_region),
        }
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FailoverError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| FailoverError::Configuration(format!("invalid config JSON: {}", e)))
    }

    /// Validate completeness and the execution region.
    pub fn validate(&self) -> Result<FailoverConfig> {
        let fields = [
            (ENV_REGION, &self.region),
            (ENV_ALARM_NAME, &self.alarm_name),
            (ENV_INSTANCE_ID, &self.instance_id),
            (ENV_CREDENTIAL_RECORD, &self.credential_record_id),
            (ENV_NOTIFICATION_TOPIC, &self.notification_topic),
        ];

        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(FailoverError::Configuration(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        let region = self.region.clone().unwrap_or_default();
        if region != self.expected_region {
            return Err(FailoverError::Configuration(format!(
                "executing in {}, expected {}",
                region, self.expected_region
            )));
        }

        Ok(FailoverConfig {
            region,
            alarm_name: self.alarm_name.clone().unwrap_or_default(),
            instance_id: self.instance_id.clone().unwrap_or_default(),
            credential_record_id: self.credential_record_id.clone().unwrap_or_default(),
            notification_topic: self.notification_topic.clone().unwrap_or_default(),
        })
    }

    /// Topic to notify, if one is configured
    pub fn notification_topic(&self) -> Option<&str> {
        self.notification_topic.as_deref().filter(|t| !t.is_empty())
    }
}
