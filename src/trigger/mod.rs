//! Trigger Parser
//!
//! Extracts a normalized `FailoverTrigger` from an inbound alarm
//! notification. The envelope is a notification record list whose first
//! record carries the alarm payload as a JSON string:
//!
//! ```text
//! { "Records": [ { "Sns": { "Message": "{\"AlarmName\": ..., \"NewStateValue\": ...}" } } ] }
//! ```
//!
//! Parsing is pure: the same envelope always yields the same result.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FailoverError, Result};

/// Reason recorded when the alarm payload carries none
pub const UNKNOWN_REASON: &str = "Unknown";

/// Alarm state carried by a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmState {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ALARM")]
    Alarm,
    #[serde(rename = "INSUFFICIENT_DATA")]
    InsufficientData,
}

impl AlarmState {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "OK" => Some(Self::Ok),
            "ALARM" => Some(Self::Alarm),
            "INSUFFICIENT_DATA" => Some(Self::InsufficientData),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Alarm => "ALARM",
            Self::InsufficientData => "INSUFFICIENT_DATA",
        }
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized alarm event. Read-only once parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailoverTrigger {
    pub alarm_name: String,
    pub state_value: AlarmState,
    pub reason: String,
    /// The decoded alarm payload, as received
    pub raw_source: Value,
}

impl FailoverTrigger {
    /// The trigger asks for failover of the given alarm.
    pub fn requests_failover(&self, target_alarm: &str) -> bool {
        self.state_value == AlarmState::Alarm && self.alarm_name == target_alarm
    }
}

/// Parse an inbound envelope into a trigger.
pub fn parse_envelope(envelope: &str) -> Result<FailoverTrigger> {
    let envelope: Value = serde_json::from_str(envelope)
        .map_err(|e| FailoverError::Parse(format!("envelope is not valid JSON: {}", e)))?;

    let message = envelope
        .get("Records")
        .and_then(|records| records.get(0))
        .and_then(|record| record.get("Sns"))
        .and_then(|sns| sns.get("Message"))
        .ok_or_else(|| FailoverError::Parse("missing Records[0].Sns.Message".to_string()))?;

    let message = message
        .as_str()
        .ok_or_else(|| FailoverError::Parse("Sns.Message is not a string".to_string()))?;

    parse_alarm_message(message)
}

/// Parse the alarm payload carried inside the envelope.
pub fn parse_alarm_message(message: &str) -> Result<FailoverTrigger> {
    let payload: Value = serde_json::from_str(message)
        .map_err(|e| FailoverError::Parse(format!("alarm message is not valid JSON: {}", e)))?;

    let alarm_name = payload
        .get("AlarmName")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| FailoverError::Parse("missing AlarmName".to_string()))?
        .to_string();

    let state = payload
        .get("NewStateValue")
        .and_then(Value::as_str)
        .ok_or_else(|| FailoverError::Parse("missing NewStateValue".to_string()))?;
    let state_value = AlarmState::parse(state)
        .ok_or_else(|| FailoverError::Parse(format!("unrecognized NewStateValue '{}'", state)))?;

    let reason = payload
        .get("NewStateReason")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_REASON)
        .to_string();

    Ok(FailoverTrigger {
        alarm_name,
        state_value,
        reason,
        raw_source: payload,
    })
}

/// Wrap an alarm payload the way the notification service delivers it.
pub fn envelope_for(alarm: &Value) -> String {
    serde_json::json!({
        "Records": [ { "Sns": { "Message": alarm.to_string() } } ]
    })
    .to_string()
}
