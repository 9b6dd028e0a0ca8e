//! Credential Updater
//!
//! Read-merge-write of the credential record: fetch, merge the new endpoint
//! and timestamps, write the whole record back.
//!
//! The store offers no compare-and-swap, so a concurrent external writer can
//! race between fetch and write; the later write wins. That risk is accepted,
//! not handled.

use std::sync::Arc;

use super::record::CredentialRecord;
use super::store::CredentialStore;
use crate::convergence::Clock;
use crate::error::{FailoverError, Result};
use crate::observability::Event;

pub struct CredentialUpdater {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
}

impl CredentialUpdater {
    pub fn new(store: Arc<dyn CredentialStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Point the record at `host:port`. Returns the record as written.
    ///
    /// Any failure is a `CredentialUpdateError`.
    pub async fn repoint(&self, record_id: &str, host: &str, port: u16) -> Result<CredentialRecord> {
        match self.merge_write(record_id, host, port).await {
            Ok(record) => {
                tracing::info!(
                    event = %Event::CredentialsUpdated,
                    record_id,
                    endpoint = %format!("{}:{}", host, port),
                );
                Ok(record)
            }
            Err(err) => {
                tracing::error!(event = %Event::CredentialsUpdateFailed, record_id, error = %err);
                Err(err)
            }
        }
    }

    async fn merge_write(&self, record_id: &str, host: &str, port: u16) -> Result<CredentialRecord> {
        let payload = self
            .store
            .fetch(record_id)
            .await
            .map_err(|e| FailoverError::credential_update(record_id, format!("fetch: {}", e)))?;

        let mut record = CredentialRecord::decode(record_id, &payload)?;
        record.repoint(host, port, self.clock.unix_seconds());

        self.store
            .store(record_id, record.encode())
            .await
            .map_err(|e| FailoverError::credential_update(record_id, format!("write: {}", e)))?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convergence::ManualClock;
    use crate::credentials::{MemoryCredentialStore, HOST_KEY, LAST_UPDATED_KEY, PORT_KEY};
    use crate::error::{CapabilityError, FailoverErrorKind};
    use serde_json::{json, Value};

    fn updater(store: &MemoryCredentialStore) -> CredentialUpdater {
        CredentialUpdater::new(Arc::new(store.clone()), Arc::new(ManualClock::starting_at(1_234)))
    }

    #[tokio::test]
    async fn test_repoint_writes_merged_record() {
        let store = MemoryCredentialStore::new()
            .with_record("db/creds", json!({"username": "app", "password": "pw"}).to_string());

        updater(&store).repoint("db/creds", "db.example", 5432).await.unwrap();

        let written: Value = serde_json::from_str(&store.payload("db/creds").unwrap()).unwrap();
        assert_eq!(written["username"], "app");
        assert_eq!(written["password"], "pw");
        assert_eq!(written[HOST_KEY], "db.example");
        assert_eq!(written[PORT_KEY], 5432);
        assert_eq!(written[LAST_UPDATED_KEY], 1_234);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure() {
        let store = MemoryCredentialStore::new().with_record("db/creds", "{}");
        store.fail_fetch(CapabilityError::unavailable("GetSecretValue", "AccessDenied"));

        let err = updater(&store).repoint("db/creds", "h", 1).await.unwrap_err();
        assert_eq!(err.kind(), FailoverErrorKind::CredentialUpdateError);
        assert!(err.to_string().contains("fetch"));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_leaves_record_unchanged() {
        let store = MemoryCredentialStore::new().with_record("db/creds", r#"{"username":"app"}"#);
        store.fail_store(CapabilityError::rejected("UpdateSecret", "LimitExceeded"));

        let err = updater(&store).repoint("db/creds", "h", 1).await.unwrap_err();
        assert_eq!(err.kind(), FailoverErrorKind::CredentialUpdateError);
        assert!(err.to_string().contains("write"));
        assert_eq!(store.payload("db/creds").unwrap(), r#"{"username":"app"}"#);
    }

    #[tokio::test]
    async fn test_non_object_record() {
        let store = MemoryCredentialStore::new().with_record("db/creds", r#""plain string""#);
        let err = updater(&store).repoint("db/creds", "h", 1).await.unwrap_err();
        assert_eq!(err.kind(), FailoverErrorKind::CredentialUpdateError);
        assert_eq!(store.writes(), 0);
    }
}
