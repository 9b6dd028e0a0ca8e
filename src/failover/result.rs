//! Terminal result of a failover run and its wire response

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FailoverError, FailoverErrorKind};
use crate::replica::EndpointInfo;
use crate::trigger::{AlarmState, FailoverTrigger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailoverStatus {
    NoAction,
    Succeeded,
    Failed,
}

impl fmt::Display for FailoverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoAction => "NO_ACTION",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
        })
    }
}

/// Outcome of one run. Built once, never modified.
#[derive(Debug, Clone)]
pub struct FailoverResult {
    status: FailoverStatus,
    detail: String,
    endpoint: Option<EndpointInfo>,
    elapsed_seconds: f64,
    alarm: Option<(String, AlarmState)>,
    error: Option<FailoverError>,
    path: Vec<&'static str>,
}

impl FailoverResult {
    pub(crate) fn no_action(trigger: &FailoverTrigger, elapsed_seconds: f64) -> Self {
        Self {
            status: FailoverStatus::NoAction,
            detail: "No action required".to_string(),
            endpoint: None,
            elapsed_seconds,
            alarm: Some((trigger.alarm_name.clone(), trigger.state_value)),
            error: None,
            path: Vec::new(),
        }
    }

    pub(crate) fn succeeded(endpoint: EndpointInfo, elapsed_seconds: f64) -> Self {
        Self {
            status: FailoverStatus::Succeeded,
            detail: "DR failover completed successfully".to_string(),
            endpoint: Some(endpoint),
            elapsed_seconds,
            alarm: None,
            error: None,
            path: Vec::new(),
        }
    }

    pub(crate) fn failed(error: FailoverError, elapsed_seconds: f64) -> Self {
        Self {
            status: FailoverStatus::Failed,
            detail: format!(
                "DR failover failed after {:.2} seconds: {}",
                elapsed_seconds, error
            ),
            endpoint: None,
            elapsed_seconds,
            alarm: None,
            error: Some(error),
            path: Vec::new(),
        }
    }

    pub(crate) fn with_path(mut self, path: &[&'static str]) -> Self {
        self.path = path.to_vec();
        self
    }

    pub fn status(&self) -> FailoverStatus {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn endpoint(&self) -> Option<&EndpointInfo> {
        self.endpoint.as_ref()
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn error(&self) -> Option<&FailoverError> {
        self.error.as_ref()
    }

    /// States the run went through, IDLE first
    pub fn path(&self) -> &[&'static str] {
        &self.path
    }

    pub fn error_kind(&self) -> Option<FailoverErrorKind> {
        self.error.as_ref().map(FailoverError::kind)
    }

    /// 200 for NO_ACTION and SUCCEEDED, otherwise the error's code.
    pub fn status_code(&self) -> u16 {
        match &self.error {
            Some(err) => err.status_code(),
            None => 200,
        }
    }

    pub fn to_response(&self) -> FailoverResponse {
        let mut body = ResponseBody {
            execution_time_seconds: self.elapsed_seconds,
            ..ResponseBody::default()
        };

        match self.status {
            FailoverStatus::Failed => {
                body.error = Some(self.detail.clone());
                body.error_kind = self.error_kind().map(|k| k.as_str().to_string());
            }
            _ => body.message = Some(self.detail.clone()),
        }

        if let Some((alarm, state)) = &self.alarm {
            body.alarm = Some(alarm.clone());
            body.state = Some(state.as_str().to_string());
        }

        if let Some(endpoint) = &self.endpoint {
            body.endpoint = Some(endpoint.host.clone());
            body.port = Some(endpoint.port);
        }

        FailoverResponse {
            status_code: self.status_code(),
            body,
        }
    }
}

/// Response handed back to the invoker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailoverResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    pub execution_time_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replica::LifecycleState;
    use crate::trigger::parse_alarm_message;
    use serde_json::json;

    #[test]
    fn test_no_action_response() {
        let trigger =
            parse_alarm_message(r#"{"AlarmName": "other", "NewStateValue": "OK"}"#).unwrap();
        let response = FailoverResult::no_action(&trigger, 0.0).to_response();

        assert_eq!(response.status_code, 200);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "statusCode": 200,
                "body": {
                    "message": "No action required",
                    "alarm": "other",
                    "state": "OK",
                    "execution_time_seconds": 0.0,
                }
            })
        );
    }

    #[test]
    fn test_success_response() {
        let endpoint = EndpointInfo {
            host: "db.example".into(),
            port: 5432,
            lifecycle_state: LifecycleState::Available,
        };
        let result = FailoverResult::succeeded(endpoint, 30.5);
        assert_eq!(result.status(), FailoverStatus::Succeeded);

        let response = result.to_response();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body.endpoint.as_deref(), Some("db.example"));
        assert_eq!(response.body.port, Some(5432));
        assert!(response.body.error.is_none());
    }

    #[test]
    fn test_failure_responses() {
        let parse = FailoverResult::failed(FailoverError::Parse("missing AlarmName".into()), 0.0);
        assert_eq!(parse.to_response().status_code, 400);

        let timeout = FailoverResult::failed(FailoverError::Dependency("boom".into()), 61.0);
        let response = timeout.to_response();
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body.error_kind.as_deref(), Some("DependencyError"));
        assert!(response
            .body
            .error
            .unwrap()
            .starts_with("DR failover failed after 61.00 seconds"));
    }
}
