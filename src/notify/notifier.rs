//! Best-effort milestone notifications
//!
//! `Notifier::notify` has no error channel. A failed publish is logged and
//! dropped; it never changes the outcome of a run.

use std::fmt;
use std::sync::Arc;

use super::sink::NotificationSink;
use crate::error::FailoverError;
use crate::observability::Event;
use crate::replica::EndpointInfo;

/// Points of a run at which operators are notified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Started,
    Succeeded,
    Failed,
}

impl Milestone {
    pub fn subject(&self) -> &'static str {
        match self {
            Milestone::Started => "DR Failover Started",
            Milestone::Succeeded => "DR Failover Completed Successfully",
            Milestone::Failed => "DR Failover Failed",
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subject())
    }
}

/// Subject and body of one notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneMessage {
    pub milestone: Milestone,
    pub body: String,
}

impl MilestoneMessage {
    pub fn started(alarm_name: &str, reason: &str, instance_id: &str) -> Self {
        Self {
            milestone: Milestone::Started,
            body: format!(
                "DR failover initiated for alarm: {}\nReason: {}\nPromoting replica: {}",
                alarm_name, reason, instance_id
            ),
        }
    }

    pub fn succeeded(endpoint: &EndpointInfo, instance_id: &str, elapsed_secs: f64) -> Self {
        Self {
            milestone: Milestone::Succeeded,
            body: format!(
                "DR failover completed successfully in {:.2} seconds\nNew endpoint: {}\nPromoted instance: {}",
                elapsed_secs,
                endpoint.address(),
                instance_id
            ),
        }
    }

    pub fn failed(
        error: &FailoverError,
        instance_id: Option<&str>,
        alarm_name: Option<&str>,
        elapsed_secs: f64,
    ) -> Self {
        let mut body = format!(
            "DR failover failed after {:.2} seconds: {}\nCategory: {}",
            elapsed_secs,
            error,
            error.kind()
        );
        if let Some(alarm) = alarm_name {
            body.push_str(&format!("\nAlarm: {}", alarm));
        }
        if let Some(instance) = instance_id {
            body.push_str(&format!("\nReplica: {}", instance));
        }
        if error.leaves_partial_state() {
            body.push_str(
                "\nThe instance has been promoted but the credential record was not updated; \
                 manual credential repair may be required.",
            );
        }
        Self {
            milestone: Milestone::Failed,
            body,
        }
    }
}

/// Publishes milestone messages to a fixed topic
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    topic: Option<String>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>, topic: impl Into<String>) -> Self {
        Self {
            sink,
            topic: Some(topic.into()),
        }
    }

    /// A notifier with no destination: every message is only logged.
    pub fn without_topic(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink, topic: None }
    }

    /// Publish a message. Never fails.
    pub async fn notify(&self, message: &MilestoneMessage) {
        let subject = message.milestone.subject();
        let Some(topic) = self.topic.as_deref() else {
            tracing::warn!(
                event = %Event::NotificationFailed,
                subject,
                "no notification destination configured"
            );
            return;
        };

        match self.sink.publish(topic, subject, &message.body).await {
            Ok(()) => tracing::info!(event = %Event::NotificationSent, topic, subject),
            Err(e) => tracing::error!(
                event = %Event::NotificationFailed,
                topic,
                subject,
                error = %e,
                "failed to send notification"
            ),
        }
    }
}
