//! SNS notification sink

use aws_sdk_sns::error::{DisplayErrorContext, SdkError};
use aws_sdk_sns::Client;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::error::{CapabilityError, CapabilityErrorKind};
use crate::notify::NotificationSink;

const PUBLISH: &str = "Publish";

#[derive(Debug, Clone)]
pub struct SnsNotifier {
    client: Client,
}

impl SnsNotifier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn send(&self, topic: &str, subject: &str, body: &str) -> Result<(), CapabilityError> {
        self.client
            .publish()
            .topic_arn(topic)
            .subject(subject)
            .message(body)
            .send()
            .await
            .map_err(|err| {
                let kind = match &err {
                    SdkError::ServiceError(e) if e.err().is_not_found_exception() => CapabilityErrorKind::NotFound,
                    SdkError::ServiceError(_) => CapabilityErrorKind::Rejected,
                    _ => CapabilityErrorKind::Unavailable,
                };
                CapabilityError::new(PUBLISH, kind, DisplayErrorContext(&err).to_string())
            })?;
        Ok(())
    }
}

impl NotificationSink for SnsNotifier {
    fn publish<'a>(
        &'a self,
        topic: &'a str,
        subject: &'a str,
        body: &'a str,
    ) -> BoxFuture<'a, Result<(), CapabilityError>> {
        self.send(topic, subject, body).boxed()
    }
}
