//! Failover Orchestrator
//!
//! Composes one failover run from trigger to terminal result:
//!
//! 1. validate configuration and region (IDLE → VALIDATED)
//! 2. parse and filter the trigger (→ NO_ACTION when it does not match)
//! 3. announce the start, inspect the replica (→ INSPECTED)
//! 4. promote, or detect that promotion already happened (→ PROMOTING / WAITING)
//! 5. wait for convergence with a budget set by step 4 (→ UPDATING_CREDENTIALS)
//! 6. repoint the credential record (→ SUCCEEDED)
//!
//! Every fatal error is caught once, here, and turned into a FAILED result
//! after a best-effort failure notification. Nothing is retried; the invoker
//! owns retry policy for the whole run.
//!
//! Two runs against the same instance are not mutually excluded.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use super::result::FailoverResult;
use super::run::FailoverRun;
use super::state::FailoverState;
use crate::config::{FailoverConfig, FailoverSettings};
use crate::convergence::{Clock, ConvergenceWaiter, WaitPolicy};
use crate::credentials::{CredentialStore, CredentialUpdater};
use crate::error::{FailoverError, Result};
use crate::notify::{MilestoneMessage, NotificationSink, Notifier};
use crate::observability::Event;
use crate::promotion::PromotionCommander;
use crate::replica::{DatabaseControl, EndpointInfo, ReplicaInspector};
use crate::trigger::{parse_envelope, FailoverTrigger};

pub struct FailoverOrchestrator {
    settings: FailoverSettings,
    database: Arc<dyn DatabaseControl>,
    credentials: Arc<dyn CredentialStore>,
    notifications: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    policy: WaitPolicy,
}

impl FailoverOrchestrator {
    pub fn new(
        settings: FailoverSettings,
        database: Arc<dyn DatabaseControl>,
        credentials: Arc<dyn CredentialStore>,
        notifications: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            database,
            credentials,
            notifications,
            clock,
            policy: WaitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Process one trigger envelope. Never fails: every outcome, including
    /// errors, comes back as a `FailoverResult`.
    pub async fn run(&self, envelope: &str) -> FailoverResult {
        let run_id = Uuid::new_v4();
        self.execute(envelope)
            .instrument(tracing::info_span!("failover", %run_id))
            .await
    }

    async fn execute(&self, envelope: &str) -> FailoverResult {
        let mut run = FailoverRun::new(self.clock.clone());
        let notifier = match self.settings.notification_topic() {
            Some(topic) => Notifier::new(self.notifications.clone(), topic),
            None => Notifier::without_topic(self.notifications.clone()),
        };
        tracing::info!(event = %Event::RunStart);

        let config = match self.settings.validate() {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(event = %Event::ConfigInvalid, error = %err);
                let instance_id = self.settings.instance_id.as_deref();
                return self.fail(&mut run, &notifier, err, instance_id, None).await;
            }
        };
        if let Err(err) = run.advance(FailoverState::validate) {
            return self.fail(&mut run, &notifier, err, None, None).await;
        }
        tracing::info!(
            event = %Event::ConfigValidated,
            region = %config.region,
            instance_id = %config.instance_id,
        );

        let trigger = match parse_envelope(envelope) {
            Ok(trigger) => trigger,
            Err(err) => {
                tracing::error!(event = %Event::TriggerInvalid, error = %err);
                return self
                    .fail(&mut run, &notifier, err, Some(&config.instance_id), None)
                    .await;
            }
        };
        tracing::info!(
            event = %Event::TriggerParsed,
            alarm = %trigger.alarm_name,
            state = %trigger.state_value,
            reason = %trigger.reason,
        );

        if !trigger.requests_failover(&config.alarm_name) {
            if let Err(err) = run.advance(FailoverState::ignore_trigger) {
                return self.fail(&mut run, &notifier, err, None, None).await;
            }
            tracing::info!(
                event = %Event::NoAction,
                alarm = %trigger.alarm_name,
                state = %trigger.state_value,
            );
            return FailoverResult::no_action(&trigger, run.elapsed_seconds()).with_path(run.path());
        }

        match self.failover(&mut run, &notifier, &config, &trigger).await {
            Ok(endpoint) => {
                let elapsed = run.elapsed_seconds();
                tracing::info!(
                    event = %Event::FailoverComplete,
                    instance_id = %config.instance_id,
                    endpoint = %endpoint.address(),
                    elapsed_secs = elapsed,
                );
                notifier
                    .notify(&MilestoneMessage::succeeded(&endpoint, &config.instance_id, elapsed))
                    .await;
                FailoverResult::succeeded(endpoint, elapsed).with_path(run.path())
            }
            Err(err) => {
                self.fail(
                    &mut run,
                    &notifier,
                    err,
                    Some(&config.instance_id),
                    Some(&trigger.alarm_name),
                )
                .await
            }
        }
    }

    /// VALIDATED → SUCCEEDED. Any error leaves `run` in the state where it
    /// occurred.
    async fn failover(
        &self,
        run: &mut FailoverRun,
        notifier: &Notifier,
        config: &FailoverConfig,
        trigger: &FailoverTrigger,
    ) -> Result<EndpointInfo> {
        let instance_id = config.instance_id.as_str();

        run.advance(|s| s.begin_inspection(instance_id))?;
        tracing::info!(event = %Event::FailoverStart, instance_id, alarm = %trigger.alarm_name);
        notifier
            .notify(&MilestoneMessage::started(&trigger.alarm_name, &trigger.reason, instance_id))
            .await;

        let status = ReplicaInspector::new(self.database.clone())
            .inspect(instance_id)
            .await?;

        if status.is_replica {
            run.advance(FailoverState::begin_promotion)?;
        }
        let outcome = PromotionCommander::new(self.database.clone(), self.clock.clone())
            .promote_inspected(&status)
            .await?;

        let budget = self.policy.budget_for(&outcome);
        if outcome.already_promoted {
            run.advance(|s| s.skip_promotion(budget))?;
        } else {
            run.advance(|s| s.begin_waiting(budget))?;
        }

        let endpoint = ConvergenceWaiter::new(self.database.clone(), self.clock.clone())
            .with_poll_interval(self.policy.poll_interval)
            .await_available(instance_id, budget)
            .await?;
        run.advance(|s| s.converged(endpoint.clone()))?;

        CredentialUpdater::new(self.credentials.clone(), self.clock.clone())
            .repoint(&config.credential_record_id, &endpoint.host, endpoint.port)
            .await?;
        run.advance(FailoverState::complete)?;

        Ok(endpoint)
    }

    async fn fail(
        &self,
        run: &mut FailoverRun,
        notifier: &Notifier,
        err: FailoverError,
        instance_id: Option<&str>,
        alarm_name: Option<&str>,
    ) -> FailoverResult {
        let failed_in = run.state_name();
        run.fail(err.kind());
        let elapsed = run.elapsed_seconds();

        tracing::error!(
            event = %Event::FailoverFailed,
            failed_in,
            kind = %err.kind(),
            status_code = err.status_code(),
            partial_failure = err.leaves_partial_state(),
            elapsed_secs = elapsed,
            error = %err,
        );
        notifier
            .notify(&MilestoneMessage::failed(&err, instance_id, alarm_name, elapsed))
            .await;

        FailoverResult::failed(err, elapsed).with_path(run.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailoverSettings;
    use crate::convergence::ManualClock;
    use crate::credentials::MemoryCredentialStore;
    use crate::error::FailoverErrorKind;
    use crate::failover::FailoverStatus;
    use crate::notify::RecordingSink;
    use crate::replica::{LifecycleState, MemoryDatabase};
    use crate::trigger::envelope_for;
    use serde_json::json;

    fn settings() -> FailoverSettings {
        FailoverSettings {
            region: Some("us-east-1".into()),
            alarm_name: Some("primary-health".into()),
            instance_id: Some("dr".into()),
            credential_record_id: Some("db/creds".into()),
            notification_topic: Some("arn:topic".into()),
            expected_region: "us-east-1".into(),
        }
    }

    fn alarm(state: &str) -> String {
        envelope_for(&json!({
            "AlarmName": "primary-health",
            "NewStateValue": state,
            "NewStateReason": "unreachable",
        }))
    }

    struct Fixture {
        db: MemoryDatabase,
        store: MemoryCredentialStore,
        sink: RecordingSink,
        clock: ManualClock,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                db: MemoryDatabase::replica("dr", "db.example", 5432),
                store: MemoryCredentialStore::new().with_record("db/creds", r#"{"username":"app"}"#),
                sink: RecordingSink::new(),
                clock: ManualClock::new(),
            }
        }

        fn orchestrator(&self, settings: FailoverSettings) -> FailoverOrchestrator {
            FailoverOrchestrator::new(
                settings,
                Arc::new(self.db.clone()),
                Arc::new(self.store.clone()),
                Arc::new(self.sink.clone()),
                Arc::new(self.clock.clone()),
            )
        }
    }

    #[tokio::test]
    async fn test_promotion_path() {
        let fx = Fixture::new();
        let result = fx.orchestrator(settings()).run(&alarm("ALARM")).await;

        assert_eq!(result.status(), FailoverStatus::Succeeded);
        assert_eq!(
            result.path(),
            &["IDLE", "VALIDATED", "INSPECTED", "PROMOTING", "WAITING", "UPDATING_CREDENTIALS", "SUCCEEDED"]
        );
    }

    #[tokio::test]
    async fn test_already_promoted_path_skips_promoting() {
        let fx = Fixture::new();
        fx.orchestrator(settings()).run(&alarm("ALARM")).await;
        let result = fx.orchestrator(settings()).run(&alarm("ALARM")).await;

        assert_eq!(result.status(), FailoverStatus::Succeeded);
        assert!(!result.path().contains(&"PROMOTING"));
        assert_eq!(fx.db.promote_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_config_error_fails_from_idle() {
        let fx = Fixture::new();
        let mut incomplete = settings();
        incomplete.credential_record_id = None;

        let result = fx.orchestrator(incomplete).run(&alarm("ALARM")).await;

        assert_eq!(result.error_kind(), Some(FailoverErrorKind::ConfigurationError));
        assert_eq!(result.status_code(), 400);
        assert_eq!(result.path(), &["IDLE", "FAILED"]);
        assert_eq!(result.elapsed_seconds(), 0.0);
        assert_eq!(fx.db.describe_calls(), 0);
        assert_eq!(fx.sink.subjects(), vec!["DR Failover Failed"]);
    }

    #[tokio::test]
    async fn test_parse_failure_fails_from_validated() {
        let fx = Fixture::new();
        let result = fx.orchestrator(settings()).run("{}").await;

        assert_eq!(result.error_kind(), Some(FailoverErrorKind::ParseFailure));
        assert_eq!(result.status_code(), 400);
        assert_eq!(result.path(), &["IDLE", "VALIDATED", "FAILED"]);
        assert_eq!(fx.db.describe_calls(), 0);
    }

    #[tokio::test]
    async fn test_precondition_fails_from_promoting() {
        let fx = Fixture::new();
        fx.db.set_state(LifecycleState::Modifying);

        let result = fx.orchestrator(settings()).run(&alarm("ALARM")).await;

        assert_eq!(result.error_kind(), Some(FailoverErrorKind::PreconditionError));
        assert_eq!(result.status_code(), 500);
        assert_eq!(result.path().last(), Some(&"FAILED"));
        assert!(result.path().contains(&"PROMOTING"));
        assert!(fx.db.promote_calls().is_empty());
    }
}
