//! Notification transport capability

use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::error::CapabilityError;

pub trait NotificationSink: Send + Sync {
    /// Publish one message to a topic
    fn publish<'a>(
        &'a self,
        topic: &'a str,
        subject: &'a str,
        body: &'a str,
    ) -> BoxFuture<'a, Result<(), CapabilityError>>;
}

/// A published message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub topic: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Default)]
struct RecordingInner {
    sent: Vec<Notification>,
    failing: Option<CapabilityError>,
    attempts: usize,
}

/// Keeps every published message in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<RecordingInner>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every publish fails
    pub fn failing(error: CapabilityError) -> Self {
        let sink = Self::default();
        sink.lock().failing = Some(error);
        sink
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.lock().sent.clone()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.lock().sent.iter().map(|n| n.subject.clone()).collect()
    }

    /// Publish attempts, including failed ones
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordingInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl NotificationSink for RecordingSink {
    fn publish<'a>(
        &'a self,
        topic: &'a str,
        subject: &'a str,
        body: &'a str,
    ) -> BoxFuture<'a, Result<(), CapabilityError>> {
        async move {
            let mut inner = self.lock();
            inner.attempts += 1;
            if let Some(err) = &inner.failing {
                return Err(err.clone());
            }
            inner.sent.push(Notification {
                topic: topic.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
            Ok(())
        }
        .boxed()
    }
}
