//! Interactive line protocol driving both walkthroughs side by side.
//!
//! Every rejected action is reported on the output stream and the session keeps reading;
//! only `quit`, end of input or an I/O failure ends it.

use std::io::{self, BufRead, Write};

use stepwise_core::audit::{AuditContext, InMemoryAuditSink};
use stepwise_core::{ApplicationError, InterfaceError, RecommendationEngine, ReviewEngine, StepError};
use tracing::{debug, info};

use super::{describe_render_error, CommandResult, Runtime};
use crate::render::Renderer;

const HELP: &str = "commands:
  select <product>        start a recommendation walkthrough
  submit <review text>    start a review walkthrough
  next rec|review         advance one step
  reset rec|review        discard the current trace
  show rec|review         render the current snapshot
  products                list catalog products
  history                 list journal events for this session
  help                    show this message
  quit                    end the session";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    Recommendation,
    Review,
}

impl Target {
    fn as_str(self) -> &'static str {
        match self {
            Self::Recommendation => "recommendation",
            Self::Review => "review",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum SessionCommand {
    Select(String),
    Submit(String),
    Next(Target),
    Reset(Target),
    Show(Target),
    Products,
    History,
    Help,
    Quit,
}

/// Review text after `submit ` is kept byte for byte; every other argument is trimmed.
fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim_start();
    let (verb, raw) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = raw.trim();

    match verb.to_ascii_lowercase().as_str() {
        "select" => Ok(SessionCommand::Select(rest.to_string())),
        "submit" => Ok(SessionCommand::Submit(raw.to_string())),
        "next" => parse_target(rest).map(SessionCommand::Next),
        "reset" => parse_target(rest).map(SessionCommand::Reset),
        "show" => parse_target(rest).map(SessionCommand::Show),
        "products" => Ok(SessionCommand::Products),
        "history" => Ok(SessionCommand::History),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" => Ok(SessionCommand::Quit),
        other => Err(format!("unknown command `{other}`; type `help` for the list")),
    }
}

fn parse_target(raw: &str) -> Result<Target, String> {
    match raw.to_ascii_lowercase().as_str() {
        "rec" | "recommend" | "recommendation" => Ok(Target::Recommendation),
        "review" => Ok(Target::Review),
        "" => Err("missing target; expected `rec` or `review`".to_string()),
        other => Err(format!("unknown target `{other}`; expected `rec` or `review`")),
    }
}

struct Session<'a> {
    runtime: &'a Runtime,
    renderer: Renderer,
    recommendation: RecommendationEngine,
    review: ReviewEngine,
    sink: InMemoryAuditSink,
    session_id: String,
    line_number: usize,
}

impl<'a> Session<'a> {
    fn new(runtime: &'a Runtime) -> Result<Self, tera::Error> {
        Ok(Self {
            runtime,
            renderer: runtime.renderer()?,
            recommendation: RecommendationEngine::with_dataset(runtime.dataset.clone()),
            review: ReviewEngine::with_dataset(runtime.dataset.clone()),
            sink: InMemoryAuditSink::default(),
            session_id: format!("session-{}", std::process::id()),
            line_number: 0,
        })
    }

    fn drive<R, W>(&mut self, input: R, output: &mut W) -> io::Result<usize>
    where
        R: BufRead,
        W: Write,
    {
        writeln!(output, "stepwise session; type `help` for commands")?;
        let mut handled = 0;

        for line in input.lines() {
            let line = line?;
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }

            let command = match parse_command(&line) {
                Ok(SessionCommand::Quit) => break,
                Ok(command) => command,
                Err(message) => {
                    writeln!(output, "error: {message}")?;
                    continue;
                }
            };

            handled += 1;
            match self.handle(command) {
                Ok(text) => writeln!(output, "{text}")?,
                Err(error) => {
                    debug!(
                        event_name = "cli.session.rejected",
                        correlation_id = self.correlation_id(),
                        error = %error,
                        "session command rejected"
                    );
                    writeln!(output, "error: {} ({})", error.user_message(), error.message())?;
                }
            }
        }

        output.flush()?;
        Ok(handled)
    }

    fn handle(&mut self, command: SessionCommand) -> Result<String, InterfaceError> {
        let audit = AuditContext::new(Some(self.session_id.clone()), self.correlation_id(), "cli");

        match command {
            SessionCommand::Select(product) => {
                self.recommendation
                    .initialize_with_audit(&product, &self.sink, &audit)
                    .map_err(|error| self.rejected(error))?;
                self.render_target(Target::Recommendation)
            }
            SessionCommand::Submit(text) => {
                self.review
                    .initialize_with_audit(&text, &self.sink, &audit)
                    .map_err(|error| self.rejected(error))?;
                self.render_target(Target::Review)
            }
            SessionCommand::Next(Target::Recommendation) => {
                self.recommendation
                    .advance_with_audit(&self.sink, &audit)
                    .map_err(|error| self.rejected(error))?;
                self.render_target(Target::Recommendation)
            }
            SessionCommand::Next(Target::Review) => {
                self.review
                    .advance_with_audit(&self.sink, &audit)
                    .map_err(|error| self.rejected(error))?;
                self.render_target(Target::Review)
            }
            SessionCommand::Reset(target) => {
                match target {
                    Target::Recommendation => {
                        self.recommendation.reset_with_audit(&self.sink, &audit)
                    }
                    Target::Review => self.review.reset_with_audit(&self.sink, &audit),
                }
                Ok(format!("{} trace discarded", target.as_str()))
            }
            SessionCommand::Show(target) => self.render_target(target),
            SessionCommand::Products => self
                .renderer
                .products(self.runtime.dataset.catalog.products())
                .map_err(|error| self.render_error(&error)),
            SessionCommand::History => Ok(self.render_history()),
            SessionCommand::Help | SessionCommand::Quit => Ok(HELP.to_string()),
        }
    }

    fn render_target(&self, target: Target) -> Result<String, InterfaceError> {
        let rendered = match target {
            Target::Recommendation => self.renderer.recommendation(&self.recommendation.snapshot()),
            Target::Review => self.renderer.review(&self.review.snapshot()),
        };
        rendered.map_err(|error| self.render_error(&error))
    }

    fn render_history(&self) -> String {
        let events = self.sink.events();
        if events.is_empty() {
            return "no journal events yet".to_string();
        }

        events
            .iter()
            .map(|event| {
                let kind = event.metadata.get("kind").map(String::as_str).unwrap_or("-");
                let step = event
                    .metadata
                    .get("step")
                    .or_else(|| event.metadata.get("discarded_step"))
                    .map(String::as_str)
                    .unwrap_or("-");
                format!("- {} [{:?}] {kind} step {step}", event.event_type, event.outcome)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn correlation_id(&self) -> String {
        format!("{}:{}", self.session_id, self.line_number)
    }

    fn rejected(&self, error: StepError) -> InterfaceError {
        let hint = if error.is_recoverable_by_reset() {
            Some("start a new run with `select` or `submit`".to_string())
        } else if matches!(error, StepError::UnknownProduct { .. }) {
            let names: Vec<_> = self.runtime.dataset.catalog.names().collect();
            Some(format!("known products: {}", names.join(", ")))
        } else {
            None
        };
        let mut interface = ApplicationError::from(error).into_interface(self.correlation_id());
        if let (Some(hint), InterfaceError::BadRequest { message, .. }) = (hint, &mut interface) {
            message.push_str("; ");
            message.push_str(&hint);
        }
        interface
    }

    fn render_error(&self, error: &tera::Error) -> InterfaceError {
        InterfaceError::Internal {
            message: describe_render_error(error),
            correlation_id: self.correlation_id(),
        }
    }
}

pub fn run<R, W>(runtime: &Runtime, input: R, output: &mut W) -> CommandResult
where
    R: BufRead,
    W: Write,
{
    let mut session = match Session::new(runtime) {
        Ok(session) => session,
        Err(error) => return CommandResult::render_failure("session", error),
    };

    match session.drive(input, output) {
        Ok(handled) => {
            let journal = session.sink.drain().len();
            info!(
                event_name = "cli.session.closed",
                session_id = %session.session_id,
                commands = handled,
                journal_events = journal,
                "session closed"
            );
            CommandResult::success(
                "session",
                format!("session closed after {handled} commands ({journal} journal events)"),
            )
        }
        Err(error) => CommandResult::failure("session", "io", error.to_string(), 1),
    }
}
