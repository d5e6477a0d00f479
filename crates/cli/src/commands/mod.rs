pub mod config;
pub mod doctor;
pub mod products;
pub mod session;
pub mod walk;

use std::error::Error as _;
use std::sync::Arc;

use serde::Serialize;
use stepwise_core::config::{AppConfig, LoadOptions};
use stepwise_core::{ApplicationError, Dataset};

use crate::render::Renderer;

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
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
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
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Already-formatted output (rendered walkthrough, pretty JSON) passed through as-is.
    pub fn rendered(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn from_application_error(command: &str, error: ApplicationError) -> Self {
        let (error_class, exit_code) = match &error {
            ApplicationError::Configuration(_) => ("config_validation", 2),
            ApplicationError::Dataset(_) => ("dataset_unavailable", 3),
            ApplicationError::Step(_) => ("step_rejected", 4),
        };
        Self::failure(command, error_class, error.to_string(), exit_code)
    }

    pub fn render_failure(command: &str, error: tera::Error) -> Self {
        Self::failure(command, "render", describe_render_error(&error), 1)
    }
}

/// Loaded configuration plus the dataset it points at, shared by every walkthrough command.
#[derive(Clone, Debug)]
pub struct Runtime {
    pub config: AppConfig,
    pub dataset: Arc<Dataset>,
}

impl Runtime {
    pub fn load(options: LoadOptions) -> Result<Self, ApplicationError> {
        let config = AppConfig::load(options)?;
        let dataset = Dataset::load(config.dataset.path.as_deref())?;
        Ok(Self { config, dataset })
    }

    pub fn from_parts(config: AppConfig, dataset: Arc<Dataset>) -> Self {
        Self { config, dataset }
    }

    pub fn renderer(&self) -> Result<Renderer, tera::Error> {
        Renderer::new(self.config.display.score_precision)
    }
}

/// Tera nests the useful detail (missing variable, bad filter argument) in the source chain.
pub(crate) fn describe_render_error(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
