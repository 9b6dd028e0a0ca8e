//! Credential record payload
//!
//! The record is an arbitrary JSON object owned by its consumers. A repoint
//! only ever touches the connection fields below; every other key keeps its
//! position and its value exactly as written, numbers included.

use serde_json::{Map, Value};

use crate::error::{FailoverError, Result};

pub const HOST_KEY: &str = "host";
pub const PORT_KEY: &str = "port";
pub const LAST_UPDATED_KEY: &str = "last_updated";
pub const FAILOVER_TIMESTAMP_KEY: &str = "failover_timestamp";

/// Keys written by a repoint
pub const CONNECTION_KEYS: [&str; 4] = [HOST_KEY, PORT_KEY, LAST_UPDATED_KEY, FAILOVER_TIMESTAMP_KEY];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CredentialRecord {
    fields: Map<String, Value>,
}

impl CredentialRecord {
    /// Decode a stored payload. Anything but a JSON object is rejected.
    pub fn decode(record_id: &str, payload: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(payload).map_err(|e| {
            FailoverError::credential_update(record_id, format!("record is not valid JSON: {}", e))
        })?;

        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(FailoverError::credential_update(
                record_id,
                format!("record is a JSON {}, expected an object", json_type(&other)),
            )),
        }
    }

    pub fn encode(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }

    /// Merge a new endpoint into the record, stamping both timestamps.
    pub fn repoint(&mut self, host: &str, port: u16, now_unix: i64) {
        self.fields.insert(HOST_KEY.to_string(), Value::from(host));
        self.fields.insert(PORT_KEY.to_string(), Value::from(port));
        self.fields.insert(LAST_UPDATED_KEY.to_string(), Value::from(now_unix));
        self.fields.insert(FAILOVER_TIMESTAMP_KEY.to_string(), Value::from(now_unix));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_repoint_preserves_unrelated_fields() {
        let prior = json!({
            "username": "app",
            "password": "s3cr3t",
            "engine": "postgres",
            "host": "old.example",
            "port": 5433,
        });
        let mut record = CredentialRecord::decode("db/creds", &prior.to_string()).unwrap();
        record.repoint("db.example", 5432, 1_700_000_000);

        assert_eq!(record.get("username"), Some(&json!("app")));
        assert_eq!(record.get("password"), Some(&json!("s3cr3t")));
        assert_eq!(record.get("engine"), Some(&json!("postgres")));
        assert_eq!(record.get(HOST_KEY), Some(&json!("db.example")));
        assert_eq!(record.get(PORT_KEY), Some(&json!(5432)));
        assert_eq!(record.get(LAST_UPDATED_KEY), Some(&json!(1_700_000_000)));
        assert_eq!(record.get(FAILOVER_TIMESTAMP_KEY), Some(&json!(1_700_000_000)));
        assert_eq!(record.fields().len(), 7);

        let unrelated: Vec<&str> = record
            .fields()
            .keys()
            .map(String::as_str)
            .filter(|key| !CONNECTION_KEYS.contains(key))
            .collect();
        assert_eq!(unrelated, vec!["username", "password", "engine"]);
    }

    #[test]
    fn test_numbers_and_key_order_survive_repoint() {
        let prior = r#"{"account":123456789012345678901234,"ratio":1.10,"username":"app"}"#;
        let mut record = CredentialRecord::decode("r", prior).unwrap();
        record.repoint("db.example", 5432, 1_700_000_000);

        let written = record.encode();
        assert!(
            written.starts_with(r#"{"account":123456789012345678901234,"ratio":1.10,"username":"app","#),
            "written: {}",
            written
        );
        assert!(written.ends_with(
            r#""host":"db.example","port":5432,"last_updated":1700000000,"failover_timestamp":1700000000}"#
        ));
    }

    #[test]
    fn test_existing_connection_keys_updated_in_place() {
        let prior = r#"{"host":"old.example","username":"app","port":5433}"#;
        let mut record = CredentialRecord::decode("r", prior).unwrap();
        record.repoint("db.example", 5432, 7);

        let keys: Vec<&str> = record.fields().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["host", "username", "port", LAST_UPDATED_KEY, FAILOVER_TIMESTAMP_KEY]
        );
    }

    #[test]
    fn test_nested_values_untouched() {
        let prior = json!({"options": {"sslmode": "require", "pool": [1, 2]}});
        let mut record = CredentialRecord::decode("r", &prior.to_string()).unwrap();
        record.repoint("h", 1, 0);
        assert_eq!(record.get("options"), Some(&prior["options"]));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = CredentialRecord::decode("r", "[1, 2]").unwrap_err();
        assert!(err.leaves_partial_state());
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(CredentialRecord::decode("r", "username=app").is_err());
    }

    #[test]
    fn test_encode_decodes_back() {
        let mut record = CredentialRecord::decode("r", r#"{"a": 1}"#).unwrap();
        record.repoint("h", 2, 3);
        let again = CredentialRecord::decode("r", &record.encode()).unwrap();
        assert_eq!(again, record);
    }
}
