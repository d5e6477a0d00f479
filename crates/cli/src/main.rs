use std::process::ExitCode;

fn main() -> ExitCode {
    stepwise_cli::run()
}
