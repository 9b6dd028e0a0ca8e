//! RDS database control plane

use aws_sdk_rds::error::{DisplayErrorContext, SdkError};
use aws_sdk_rds::types::DbInstance;
use aws_sdk_rds::Client;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::error::{CapabilityError, CapabilityErrorKind};
use crate::promotion::PromotionParams;
use crate::replica::{ControlResult, DatabaseControl, Endpoint, LifecycleState, ReplicaStatus};

const DESCRIBE: &str = "DescribeDBInstances";
const PROMOTE: &str = "PromoteReadReplica";

#[derive(Debug, Clone)]
pub struct RdsControl {
    client: Client,
}

impl RdsControl {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn describe(&self, instance_id: &str) -> ControlResult<ReplicaStatus> {
        let output = self
            .client
            .describe_db_instances()
            .db_instance_identifier(instance_id)
            .send()
            .await
            .map_err(|err| {
                let kind = match err.as_service_error() {
                    Some(e) if e.is_db_instance_not_found_fault() => CapabilityErrorKind::NotFound,
                    _ => transport_kind(&err),
                };
                CapabilityError::new(DESCRIBE, kind, DisplayErrorContext(&err).to_string())
            })?;

        let instance = output.db_instances().first().ok_or_else(|| {
            CapabilityError::not_found(DESCRIBE, format!("no instance named {}", instance_id))
        })?;

        to_status(instance_id, instance)
    }

    async fn promote(&self, instance_id: &str, params: &PromotionParams) -> ControlResult<()> {
        // PromoteReadReplica takes no maintenance window; it stays on the
        // instance as configured.
        self.client
            .promote_read_replica()
            .db_instance_identifier(instance_id)
            .backup_retention_period(params.backup_retention_days)
            .preferred_backup_window(params.backup_window)
            .send()
            .await
            .map_err(|err| {
                let kind = match err.as_service_error() {
                    Some(e) if e.is_invalid_db_instance_state_fault() => CapabilityErrorKind::Rejected,
                    Some(e) if e.is_db_instance_not_found_fault() => CapabilityErrorKind::NotFound,
                    _ => transport_kind(&err),
                };
                CapabilityError::new(PROMOTE, kind, DisplayErrorContext(&err).to_string())
            })?;
        Ok(())
    }
}

impl DatabaseControl for RdsControl {
    fn describe_instance<'a>(&'a self, instance_id: &'a str) -> BoxFuture<'a, ControlResult<ReplicaStatus>> {
        self.describe(instance_id).boxed()
    }

    fn promote_read_replica<'a>(
        &'a self,
        instance_id: &'a str,
        params: &'a PromotionParams,
    ) -> BoxFuture<'a, ControlResult<()>> {
        self.promote(instance_id, params).boxed()
    }
}

/// Service errors the caller could act on are `Rejected`; everything else
/// (dispatch, timeout, malformed response) is `Unavailable`.
fn transport_kind<E, R>(err: &SdkError<E, R>) -> CapabilityErrorKind {
    match err {
        SdkError::ServiceError(_) => CapabilityErrorKind::Rejected,
        _ => CapabilityErrorKind::Unavailable,
    }
}

fn to_status(instance_id: &str, instance: &DbInstance) -> ControlResult<ReplicaStatus> {
    let lifecycle_state = LifecycleState::parse(instance.db_instance_status().unwrap_or("unknown"));

    let endpoint = match instance.endpoint() {
        Some(endpoint) => match (endpoint.address(), endpoint.port()) {
            (Some(host), Some(port)) => {
                let port = u16::try_from(port).map_err(|_| {
                    CapabilityError::unavailable(DESCRIBE, format!("endpoint port {} out of range", port))
                })?;
                Some(Endpoint {
                    host: host.to_string(),
                    port,
                })
            }
            _ => None,
        },
        None => None,
    };

    Ok(ReplicaStatus {
        instance_id: instance
            .db_instance_identifier()
            .unwrap_or(instance_id)
            .to_string(),
        lifecycle_state,
        is_replica: instance
            .read_replica_source_db_instance_identifier()
            .map_or(false, |source| !source.is_empty()),
        endpoint,
    })
}
