//! One-shot walkthroughs: initialize with the given input and advance to the requested step.

use serde::Serialize;
use stepwise_core::walkthrough::{StepMachine, Walkthrough};
use stepwise_core::{ApplicationError, RecommendationEngine, ReviewEngine, Snapshot};
use tracing::info;

use super::{CommandResult, Runtime};
use crate::render::Renderer;

type RenderFn<T> = fn(&Renderer, &Snapshot<T>) -> Result<String, tera::Error>;

#[derive(Debug, Serialize)]
struct WalkReport<'a, T> {
    command: &'a str,
    input: &'a str,
    fingerprint: String,
    snapshots: &'a [Snapshot<T>],
}

pub fn recommend(
    runtime: &Runtime,
    product: &str,
    through: Option<u8>,
    json_output: bool,
) -> CommandResult {
    let mut engine = RecommendationEngine::with_dataset(runtime.dataset.clone());
    run_walk(
        "recommend",
        runtime,
        &mut engine,
        product,
        through,
        json_output,
        Renderer::recommendation,
    )
}

pub fn review(
    runtime: &Runtime,
    text: &str,
    through: Option<u8>,
    json_output: bool,
) -> CommandResult {
    let mut engine = ReviewEngine::with_dataset(runtime.dataset.clone());
    run_walk("review", runtime, &mut engine, text, through, json_output, Renderer::review)
}

fn run_walk<W>(
    command: &str,
    runtime: &Runtime,
    engine: &mut StepMachine<W>,
    input: &str,
    through: Option<u8>,
    json_output: bool,
    render: RenderFn<W::Trace>,
) -> CommandResult
where
    W: Walkthrough,
{
    let through = through.unwrap_or_else(|| engine.max_steps());
    let snapshots = match engine.walk(input, through) {
        Ok(snapshots) => snapshots,
        Err(error) => {
            return CommandResult::from_application_error(command, ApplicationError::from(error))
        }
    };

    info!(
        event_name = "cli.walk.completed",
        command,
        steps = snapshots.len(),
        completed = engine.is_complete(),
        "walkthrough rendered"
    );

    if json_output {
        return render_json(command, input, &snapshots);
    }

    let renderer = match runtime.renderer() {
        Ok(renderer) => renderer,
        Err(error) => return CommandResult::render_failure(command, error),
    };
    let rendered: Result<Vec<String>, tera::Error> =
        snapshots.iter().map(|snapshot| render(&renderer, snapshot)).collect();

    match rendered {
        Ok(sections) => CommandResult::rendered(sections.join("\n\n")),
        Err(error) => CommandResult::render_failure(command, error),
    }
}

fn render_json<T: Serialize>(
    command: &str,
    input: &str,
    snapshots: &[Snapshot<T>],
) -> CommandResult {
    let fingerprint = match snapshots.last().map(Snapshot::fingerprint).transpose() {
        Ok(fingerprint) => fingerprint.unwrap_or_default(),
        Err(error) => {
            return CommandResult::failure(command, "serialization", error.to_string(), 1)
        }
    };
    let report = WalkReport { command, input, fingerprint, snapshots };

    match serde_json::to_string_pretty(&report) {
        Ok(output) => CommandResult::rendered(output),
        Err(error) => CommandResult::failure(command, "serialization", error.to_string(), 1),
    }
}
