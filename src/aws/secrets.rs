//! Secrets Manager credential store

use aws_sdk_secretsmanager::error::{DisplayErrorContext, SdkError};
use aws_sdk_secretsmanager::Client;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::credentials::{CredentialStore, StoreResult};
use crate::error::{CapabilityError, CapabilityErrorKind};

const FETCH: &str = "GetSecretValue";
const STORE: &str = "UpdateSecret";

#[derive(Debug, Clone)]
pub struct SecretsManagerStore {
    client: Client,
}

impl SecretsManagerStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn get(&self, record_id: &str) -> StoreResult<String> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(record_id)
            .send()
            .await
            .map_err(|err| {
                let kind = match &err {
                    SdkError::ServiceError(e) if e.err().is_resource_not_found_exception() => {
                        CapabilityErrorKind::NotFound
                    }
                    SdkError::ServiceError(_) => CapabilityErrorKind::Rejected,
                    _ => CapabilityErrorKind::Unavailable,
                };
                CapabilityError::new(FETCH, kind, DisplayErrorContext(&err).to_string())
            })?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| CapabilityError::rejected(FETCH, format!("{} has no string value", record_id)))
    }

    async fn put(&self, record_id: &str, payload: String) -> StoreResult<()> {
        self.client
            .update_secret()
            .secret_id(record_id)
            .secret_string(payload)
            .send()
            .await
            .map_err(|err| {
                let kind = match &err {
                    SdkError::ServiceError(e) if e.err().is_resource_not_found_exception() => {
                        CapabilityErrorKind::NotFound
                    }
                    SdkError::ServiceError(_) => CapabilityErrorKind::Rejected,
                    _ => CapabilityErrorKind::Unavailable,
                };
                CapabilityError::new(STORE, kind, DisplayErrorContext(&err).to_string())
            })?;
        Ok(())
    }
}

impl CredentialStore for SecretsManagerStore {
    fn fetch<'a>(&'a self, record_id: &'a str) -> BoxFuture<'a, StoreResult<String>> {
        self.get(record_id).boxed()
    }

    fn store<'a>(&'a self, record_id: &'a str, payload: String) -> BoxFuture<'a, StoreResult<()>> {
        self.put(record_id, payload).boxed()
    }
}
