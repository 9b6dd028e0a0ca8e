//! Credential subsystem
//!
//! Repoints the credential record consumers use to reach the database once
//! the promoted instance is available. A failure here happens after
//! promotion: the database is promoted but the record still points at the
//! old endpoint until an operator repairs it.

mod record;
mod store;
mod updater;

pub use record::{
    CredentialRecord, CONNECTION_KEYS, FAILOVER_TIMESTAMP_KEY, HOST_KEY, LAST_UPDATED_KEY, PORT_KEY,
};
pub use store::{CredentialStore, MemoryCredentialStore, StoreResult};
pub use updater::CredentialUpdater;
