use serde::Serialize;
use stepwise_core::config::{AppConfig, LoadOptions};
use stepwise_core::Dataset;

use super::{describe_render_error, CommandResult};
use crate::render::Renderer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const DATASET_CHECKS: [&str; 4] =
    ["catalog_totals", "lexicon_disjoint", "aspect_keywords", "stopwords_lowercase"];

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(pass("config_validation", "configuration loaded and validated"));
            checks.push(check_templates(&config));
            checks.extend(check_dataset(&config));
        }
        Err(error) => {
            checks.push(fail("config_validation", error.to_string()));
            checks.push(skipped("templates"));
            checks.push(skipped("dataset_load"));
            checks.extend(DATASET_CHECKS.iter().map(|name| skipped(name)));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_templates(config: &AppConfig) -> DoctorCheck {
    match Renderer::new(config.display.score_precision) {
        Ok(_) => pass("templates", "snapshot templates compiled"),
        Err(error) => fail("templates", describe_render_error(&error)),
    }
}

fn check_dataset(config: &AppConfig) -> Vec<DoctorCheck> {
    let source = config
        .dataset
        .path
        .as_ref()
        .map(|path| format!("`{}`", path.display()))
        .unwrap_or_else(|| "built-in tables".to_string());

    let dataset = match Dataset::load(config.dataset.path.as_deref()) {
        Ok(dataset) => dataset,
        Err(error) => {
            let mut checks = vec![fail("dataset_load", error.to_string())];
            checks.extend(DATASET_CHECKS.iter().map(|name| skipped(name)));
            return checks;
        }
    };

    let mut checks = vec![pass("dataset_load", format!("loaded {source}"))];
    checks.extend(dataset.diagnostics().into_iter().map(|diagnostic| DoctorCheck {
        name: diagnostic.check.to_string(),
        status: if diagnostic.passed { CheckStatus::Pass } else { CheckStatus::Fail },
        details: diagnostic.details,
    }));
    checks
}

fn pass(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck { name: name.to_string(), status: CheckStatus::Pass, details: details.into() }
}

fn fail(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck { name: name.to_string(), status: CheckStatus::Fail, details: details.into() }
}

fn skipped(name: &str) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        status: CheckStatus::Skipped,
        details: "skipped because an earlier check failed".to_string(),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
