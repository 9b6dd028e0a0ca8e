//! Credential store capability

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::error::CapabilityError;

/// Result type for credential store calls
pub type StoreResult<T> = Result<T, CapabilityError>;

/// Persisted credential records, addressed by identifier.
///
/// No compare-and-swap is offered: a write replaces the whole record.
pub trait CredentialStore: Send + Sync {
    /// Fetch the current payload of a record
    fn fetch<'a>(&'a self, record_id: &'a str) -> BoxFuture<'a, StoreResult<String>>;

    /// Replace the payload of a record
    fn store<'a>(&'a self, record_id: &'a str, payload: String) -> BoxFuture<'a, StoreResult<()>>;
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    records: HashMap<String, String>,
    fail_fetch: Option<CapabilityError>,
    fail_store: Option<CapabilityError>,
    writes: usize,
}

/// In-memory credential store
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, record_id: &str, payload: impl Into<String>) -> Self {
        self.lock().records.insert(record_id.to_string(), payload.into());
        self
    }

    /// Current payload of a record
    pub fn payload(&self, record_id: &str) -> Option<String> {
        self.lock().records.get(record_id).cloned()
    }

    /// Number of successful writes
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    /// Fail every fetch with this error.
    pub fn fail_fetch(&self, error: CapabilityError) {
        self.lock().fail_fetch = Some(error);
    }

    /// Fail every write with this error.
    pub fn fail_store(&self, error: CapabilityError) {
        self.lock().fail_store = Some(error);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn fetch<'a>(&'a self, record_id: &'a str) -> BoxFuture<'a, StoreResult<String>> {
        async move {
            let inner = self.lock();
            if let Some(err) = &inner.fail_fetch {
                return Err(err.clone());
            }
            inner.records.get(record_id).cloned().ok_or_else(|| {
                CapabilityError::not_found("GetSecretValue", format!("record {} not found", record_id))
            })
        }
        .boxed()
    }

    fn store<'a>(&'a self, record_id: &'a str, payload: String) -> BoxFuture<'a, StoreResult<()>> {
        async move {
            let mut inner = self.lock();
            if let Some(err) = &inner.fail_store {
                return Err(err.clone());
            }
            if !inner.records.contains_key(record_id) {
                return Err(CapabilityError::not_found(
                    "UpdateSecret",
                    format!("record {} not found", record_id),
                ));
            }
            inner.records.insert(record_id.to_string(), payload);
            inner.writes += 1;
            Ok(())
        }
        .boxed()
    }
}
