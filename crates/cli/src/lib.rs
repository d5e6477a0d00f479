pub mod commands;
pub mod render;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use stepwise_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat, LoggingConfig};

use commands::{CommandResult, Runtime};

#[derive(Debug, Parser)]
#[command(
    name = "stepwise",
    about = "Step-by-step algorithm walkthroughs",
    long_about = "Walk through item-to-item recommendation and lexicon review analysis one step at a time.",
    after_help = "Examples:\n  stepwise recommend Laptop\n  stepwise review \"Fast delivery, great quality\" --through 4\n  stepwise session\n  stepwise doctor --json"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    #[arg(long, global = true, value_name = "PATH", help = "Config file to load (must exist)")]
    config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Dataset TOML overriding the built-in tables"
    )]
    dataset: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        help = "Log level: trace|debug|info|warn|error"
    )]
    log_level: Option<String>,
}

impl GlobalArgs {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                dataset_path: self.dataset.clone(),
                log_level: self.log_level.clone(),
                ..ConfigOverrides::default()
            },
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List catalog products with purchase totals")]
    Products {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run the six-step recommendation walkthrough for a product")]
    Recommend {
        product: String,
        #[arg(long, value_name = "STEP", help = "Stop after this step (default: final step)")]
        through: Option<u8>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run the eight-step review analysis walkthrough for a text")]
    Review {
        text: String,
        #[arg(long, value_name = "STEP", help = "Stop after this step (default: final step)")]
        through: Option<u8>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Drive both walkthroughs interactively from stdin")]
    Session,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, templates and dataset invariants")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_logging(config: &LoggingConfig) {
    use tracing::Level;
    use LogFormat::*;

    let log_level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(io::stderr);

    let _ = match config.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
}

/// Logging for `config` and `doctor`, which report load failures themselves: the loaded
/// settings when the config is valid, otherwise defaults plus the command-line overrides.
fn logging_for(options: &LoadOptions) -> LoggingConfig {
    if let Ok(config) = AppConfig::load(options.clone()) {
        return config.logging;
    }

    let mut logging = AppConfig::default().logging;
    if let Some(level) = &options.overrides.log_level {
        logging.level = level.clone();
    }
    if let Some(format) = options.overrides.log_format {
        logging.format = format;
    }
    logging
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.global.load_options();

    let result = match cli.command {
        Command::Config => {
            init_logging(&logging_for(&options));
            commands::config::run(&options)
        }
        Command::Doctor { json } => {
            init_logging(&logging_for(&options));
            commands::doctor::run(&options, json)
        }
        Command::Products { json } => {
            with_runtime("products", options, |runtime| commands::products::run(runtime, json))
        }
        Command::Recommend { product, through, json } => {
            with_runtime("recommend", options, |runtime| {
                commands::walk::recommend(runtime, &product, through, json)
            })
        }
        Command::Review { text, through, json } => with_runtime("review", options, |runtime| {
            commands::walk::review(runtime, &text, through, json)
        }),
        Command::Session => with_runtime("session", options, |runtime| {
            commands::session::run(runtime, io::stdin().lock(), &mut io::stdout())
        }),
    };

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    ExitCode::from(result.exit_code)
}

fn with_runtime(
    command: &str,
    options: LoadOptions,
    run: impl FnOnce(&Runtime) -> CommandResult,
) -> CommandResult {
    match Runtime::load(options) {
        Ok(runtime) => {
            init_logging(&runtime.config.logging);
            run(&runtime)
        }
        Err(error) => CommandResult::from_application_error(command, error),
    }
}
