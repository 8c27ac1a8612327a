//! stu-astgen CLI entry point
//!
//! Exit codes: 0 on full success, 1 on any pipeline failure (source read,
//! model validation, interpreter fault, output write), 2 on a usage error
//! from argument parsing.

// The driver's contractual output goes to stdout/stderr directly
#![allow(clippy::print_stdout, clippy::print_stderr)]

use stu_astgen::tracing::{TracingConfig, init_tracing};
use stu_astgen::{cli, pipeline};
use stu_engine::{EngineCommand, PilotEngine};

fn main() {
    // NOTE: eprintln! in the panic hook is intentional - tracing may be
    // corrupted during a panic, so use the most reliable output method.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    let config = TracingConfig {
        format: cli.log_format.clone(),
        level: cli.level.clone().into(),
        ..Default::default()
    };
    // Ignore the error if a subscriber is already installed (e.g. in tests)
    let _ = init_tracing(config);

    std::process::exit(run(&cli));
}

fn run(cli: &cli::Cli) -> i32 {
    match try_run(cli) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn try_run(cli: &cli::Cli) -> Result<(), pipeline::PipelineError> {
    let command = EngineCommand::parse(&cli.engine)?;
    let mut engine = PilotEngine::spawn(&command)?;

    let args = cli.pipeline_args();
    let mut stdout = std::io::stdout().lock();
    pipeline::run(&mut engine, &args, &mut stdout)
}
