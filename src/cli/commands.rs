//! CLI command implementations
//!
//! `run` is the only command that talks to AWS. `parse-event` and
//! `check-config` are offline and safe to use while preparing a deployment.

use std::path::Path;
use std::sync::Arc;

use crate::aws::{self, AwsCapabilities};
use crate::config::FailoverSettings;
use crate::convergence::SystemClock;
use crate::error::FailoverError;
use crate::failover::{FailoverOrchestrator, FailoverResponse, FailoverResult};
use crate::observability::{init_logging, Event, LogFormat};
use crate::trigger::parse_envelope;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_event, write_json};

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Run {
            event,
            config,
            log_format,
        } => failover(&event, config.as_deref(), log_format),
        Command::ParseEvent { event } => parse_event(&event),
        Command::CheckConfig { config } => check_config(config.as_deref()),
    }
}

fn load_settings(config: Option<&Path>) -> CliResult<FailoverSettings> {
    match config {
        Some(path) => Ok(FailoverSettings::load(path)?),
        None => Ok(FailoverSettings::from_env()),
    }
}

/// Process one notification envelope end to end.
///
/// The response document is always written to stdout, including when the
/// settings or the envelope cannot be loaded; the process exits non-zero
/// when its status is not 200.
pub fn failover(event: &Path, config: Option<&Path>, log_format: LogFormat) -> CliResult<()> {
    init_logging(log_format);

    let response = match load_inputs(event, config) {
        Ok((envelope, settings)) => execute(envelope, settings)?,
        Err(response) => response,
    };

    write_json(&response)?;
    if response.status_code != 200 {
        return Err(CliError::failover_failed(response.status_code));
    }
    Ok(())
}

/// Settings first, then the envelope, so a bad configuration is reported
/// ahead of a bad trigger. Either failure becomes a 400 response.
fn load_inputs(
    event: &Path,
    config: Option<&Path>,
) -> Result<(String, FailoverSettings), FailoverResponse> {
    let settings = match config {
        Some(path) => FailoverSettings::load(path).map_err(rejected_input)?,
        None => FailoverSettings::from_env(),
    };
    let envelope = read_event(event)
        .map_err(|e| rejected_input(FailoverError::Parse(e.message().to_string())))?;
    Ok((envelope, settings))
}

fn rejected_input(err: FailoverError) -> FailoverResponse {
    tracing::error!(
        event = %Event::FailoverFailed,
        failed_in = "IDLE",
        kind = %err.kind(),
        status_code = err.status_code(),
        error = %err,
    );
    FailoverResult::failed(err, 0.0).to_response()
}

fn execute(envelope: String, settings: FailoverSettings) -> CliResult<FailoverResponse> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    Ok(rt.block_on(async {
        // A missing region fails validation before any call is made; the
        // expected region only keeps the SDK loader satisfied.
        let region = settings
            .region
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| settings.expected_region.clone());
        let sdk_config = aws::load_config(&region).await;
        let capabilities = AwsCapabilities::new(&sdk_config);

        let orchestrator = FailoverOrchestrator::new(
            settings,
            Arc::new(capabilities.database),
            Arc::new(capabilities.credentials),
            Arc::new(capabilities.notifications),
            Arc::new(SystemClock),
        );
        orchestrator.run(&envelope).await.to_response()
    }))
}

/// Print the trigger carried by an envelope
pub fn parse_event(event: &Path) -> CliResult<()> {
    let envelope = read_event(event)?;
    let trigger = parse_envelope(&envelope)?;
    write_json(&trigger)
}

/// Validate settings and print the resolved configuration
pub fn check_config(config: Option<&Path>) -> CliResult<()> {
    let settings = load_settings(config)?;
    let resolved = settings.validate()?;
    write_json(&resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::envelope_for;
    use serde_json::json;
    use std::io::Write as _;

    fn temp_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_parse_event_accepts_valid_envelope() {
        let file = temp_file(&envelope_for(&json!({
            "AlarmName": "primary-health",
            "NewStateValue": "ALARM",
        })));
        assert!(parse_event(file.path()).is_ok());
    }

    #[test]
    fn test_parse_event_rejects_malformed_envelope() {
        let file = temp_file(r#"{"Records": []}"#);
        let err = parse_event(file.path()).unwrap_err();
        assert_eq!(err.code_str(), "DR_CLI_EVENT_ERROR");
    }

    #[test]
    fn test_check_config_reports_missing_fields() {
        let file = temp_file(r#"{"region": "us-east-1"}"#);
        let err = check_config(Some(file.path())).unwrap_err();
        assert_eq!(err.code_str(), "DR_CLI_CONFIG_ERROR");
        assert!(err.message().contains("DR_DB_REPLICA_ID"));
    }

    #[test]
    fn test_malformed_config_file_yields_400_response() {
        let config = temp_file("{ not json");
        let event = temp_file(&envelope_for(&json!({
            "AlarmName": "primary-health",
            "NewStateValue": "ALARM",
        })));

        let response = load_inputs(event.path(), Some(config.path())).unwrap_err();

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body.error_kind.as_deref(), Some("ConfigurationError"));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], 400);
        assert_eq!(value["body"]["execution_time_seconds"], 0.0);
        assert!(value["body"]["error"]
            .as_str()
            .unwrap()
            .starts_with("DR failover failed after 0.00 seconds: configuration error: invalid config JSON"));
        assert!(value["body"].get("message").is_none());
    }

    #[test]
    fn test_missing_config_file_yields_400_response() {
        let event = temp_file("{}");
        let response =
            load_inputs(event.path(), Some(Path::new("/nonexistent/dr.json"))).unwrap_err();

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body.error_kind.as_deref(), Some("ConfigurationError"));
    }

    #[test]
    fn test_unreadable_event_yields_400_response() {
        let config = temp_file(r#"{"region": "us-east-1"}"#);
        let response =
            load_inputs(Path::new("/nonexistent/event.json"), Some(config.path())).unwrap_err();

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body.error_kind.as_deref(), Some("ParseFailure"));
        assert!(response.body.error.unwrap().contains("/nonexistent/event.json"));
    }

    #[test]
    fn test_inputs_loaded() {
        let config = temp_file(r#"{"region": "us-west-2"}"#);
        let event = temp_file(r#"{"Records": []}"#);

        let (envelope, settings) = load_inputs(event.path(), Some(config.path())).unwrap();
        assert_eq!(envelope, r#"{"Records": []}"#);
        assert_eq!(settings.region.as_deref(), Some("us-west-2"));
    }

    #[test]
    fn test_check_config_accepts_complete_file() {
        let file = temp_file(
            &json!({
                "region": "us-east-1",
                "alarm_name": "primary-health",
                "instance_id": "dr",
                "credential_record_id": "db/creds",
                "notification_topic": "arn:aws:sns:us-east-1:1:dr",
            })
            .to_string(),
        );
        assert!(check_config(Some(file.path())).is_ok());
    }
}
