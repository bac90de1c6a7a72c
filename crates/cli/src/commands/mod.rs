pub mod antecedents;
pub mod config;
pub mod dedupe;
pub mod encode;
pub mod mine;
pub mod propose;

use std::fs;
use std::path::Path;

use basketry_core::config::{AppConfig, LoadOptions};
use basketry_core::errors::ApplicationError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success_with(command: &str, message: impl Into<String>, data: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        tracing::warn!(
            event_name = "cli.command.failed",
            command,
            error_class = error.error_class(),
            error = %error,
            "command failed"
        );
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }

    /// Wraps a command body, mapping its error onto the failure payload.
    pub(crate) fn from_outcome(
        command: &str,
        outcome: Result<(String, Value), ApplicationError>,
    ) -> Self {
        match outcome {
            Ok((message, data)) => Self::success_with(command, message, Some(data)),
            Err(error) => Self::from_error(command, &error),
        }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(options: LoadOptions) -> Result<AppConfig, ApplicationError> {
    AppConfig::load(options).map_err(|error| ApplicationError::Configuration(error.to_string()))
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ApplicationError> {
    let raw = fs::read_to_string(path).map_err(|error| {
        ApplicationError::Input(format!("could not read `{}`: {error}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|error| {
        ApplicationError::Input(format!("could not decode `{}`: {error}", path.display()))
    })
}

pub(crate) fn to_value<T: Serialize>(value: &T) -> Result<Value, ApplicationError> {
    serde_json::to_value(value)
        .map_err(|error| ApplicationError::Input(format!("could not encode output: {error}")))
}
