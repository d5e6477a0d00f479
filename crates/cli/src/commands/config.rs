use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use stepwise_core::config::{AppConfig, LoadOptions};
use toml::Value;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct EffectiveConfig {
    precedence: &'static str,
    config_file: Option<String>,
    config: AppConfig,
    sources: BTreeMap<&'static str, String>,
}

struct FieldSpec {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    flag: Option<&'static str>,
}

const FIELDS: [FieldSpec; 4] = [
    FieldSpec {
        key_path: "dataset.path",
        env_keys: &["STEPWISE_DATASET_PATH"],
        flag: Some("--dataset"),
    },
    FieldSpec {
        key_path: "display.score_precision",
        env_keys: &["STEPWISE_DISPLAY_SCORE_PRECISION"],
        flag: None,
    },
    FieldSpec {
        key_path: "logging.level",
        env_keys: &["STEPWISE_LOGGING_LEVEL", "STEPWISE_LOG_LEVEL"],
        flag: Some("--log-level"),
    },
    FieldSpec {
        key_path: "logging.format",
        env_keys: &["STEPWISE_LOGGING_FORMAT", "STEPWISE_LOG_FORMAT"],
        flag: None,
    },
];

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            )
        }
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let sources = FIELDS
        .iter()
        .map(|field| {
            let flag_set = match field.key_path {
                "dataset.path" => options.overrides.dataset_path.is_some(),
                "logging.level" => options.overrides.log_level.is_some(),
                _ => false,
            };
            let source = field_source(
                field,
                flag_set,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            );
            (field.key_path, source)
        })
        .collect();

    let report = EffectiveConfig {
        precedence: "flag > env > file > default",
        config_file: config_file_path.map(|path| path.display().to_string()),
        config,
        sources,
    };

    match serde_json::to_string_pretty(&report) {
        Ok(output) => CommandResult::rendered(output),
        Err(error) => CommandResult::failure("config", "serialization", error.to_string(), 1),
    }
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("stepwise.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/stepwise.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    field: &FieldSpec,
    flag_set: bool,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let (true, Some(flag)) = (flag_set, field.flag) {
        return format!("flag ({flag})");
    }

    let env_hit = field
        .env_keys
        .iter()
        .find(|key| env::var(key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(env_key) = env_hit {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, field.key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
