//! Binary entry point for `scena`.

use clap::Parser;
use scena_cli::{Cli, Command, RunArgs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Logs go to stderr; stdout belongs to the reporter.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scena_core=warn,scena_cli=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let args = match cli.command {
        Some(Command::Run(args)) => args,
        // Bare `scena` behaves like `scena run` with config defaults.
        None => RunArgs::default(),
    };
    args.color.apply();

    match scena_cli::run(&args) {
        Ok(report) => std::process::exit(scena_cli::exit_code(&report)),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(2);
        }
    }
}
