//! # scena-cli
//!
//! Binary entry point for the Scena scenario runner.
//!
//! This crate provides:
//! - CLI argument parsing using `clap`
//! - Config file loading and flag merging
//! - The YAML + shell-command scenario source
//! - The plain console reporter
//! - Exit-code derivation from the run summary
//!
//! The engine itself never terminates a process; everything
//! process-shaped lives here.

mod reporter;
mod yaml_source;

pub use reporter::ConsoleReporter;
pub use yaml_source::YamlScenarioSource;

use std::io::{IsTerminal, stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use scena_core::plugins::{EventLog, FailFast, Slicer};
use scena_core::{
    Discoverer, Dispatcher, PathRuleSet, Report, RunConfig, RunContext, Runner, Selector, Slice,
};

/// Command-line interface for Scena.
#[derive(Debug, Parser)]
#[command(name = "scena", version, about = "Scenario-based test runner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover and execute scenarios.
    Run(RunArgs),
}

/// Color output mode for terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Automatically detect if stdout is a TTY
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorMode {
    /// Applies the mode to the global color switch.
    pub fn apply(self) {
        match self {
            ColorMode::Always => colored::control::set_override(true),
            ColorMode::Never => colored::control::set_override(false),
            ColorMode::Auto => {
                if !stdout().is_terminal() {
                    colored::control::set_override(false);
                }
            }
        }
    }
}

/// Arguments for the `run` command.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Files or directories to discover scenarios beneath.
    #[arg(value_name = "FILE_OR_DIR")]
    pub paths: Vec<PathBuf>,

    /// Paths excluded from selection; exclusion wins over inclusion.
    #[arg(short = 'i', long = "ignore", value_name = "PATH")]
    pub ignore: Vec<PathBuf>,

    /// Abort the run on the first failed scenario.
    #[arg(long)]
    pub fail_fast: bool,

    /// Run one slice of the run-set, as `index/total` (e.g. `0/4`).
    #[arg(long, value_name = "INDEX/TOTAL", value_parser = parse_slice)]
    pub slice: Option<Slice>,

    /// Append lifecycle events as JSON lines to this file.
    #[arg(long, value_name = "PATH")]
    pub event_log: Option<PathBuf>,

    /// Config file path.
    #[arg(short = 'c', long, value_name = "PATH", default_value = RunConfig::DEFAULT_PATH)]
    pub config: PathBuf,

    /// When to color output.
    #[arg(long, value_enum, default_value = "auto")]
    pub color: ColorMode,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            ignore: Vec::new(),
            fail_fast: false,
            slice: None,
            event_log: None,
            config: PathBuf::from(RunConfig::DEFAULT_PATH),
            color: ColorMode::default(),
        }
    }
}

fn parse_slice(raw: &str) -> std::result::Result<Slice, String> {
    let (index, total) = raw
        .split_once('/')
        .ok_or_else(|| format!("expected `index/total`, got '{raw}'"))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("invalid slice index '{index}'"))?;
    let total = total
        .trim()
        .parse()
        .map_err(|_| format!("invalid slice total '{total}'"))?;
    Ok(Slice { index, total })
}

/// Executes the run command over the configured scenario tree.
///
/// Errors returned here are configuration errors: they surface before any
/// run starts and map to exit code 2 in `main`.
pub fn run(args: &RunArgs) -> Result<Report> {
    let config = RunConfig::load(&args.config)
        .with_context(|| format!("loading config '{}'", args.config.display()))?;
    debug!(?config, "configuration resolved");

    let roots: Vec<PathBuf> = if args.paths.is_empty() {
        vec![config.scenarios_dir.clone()]
    } else {
        args.paths.clone()
    };

    let mut rules = PathRuleSet::new();
    for root in &roots {
        rules = rules.include(root.clone());
    }
    for path in config.ignore.iter().chain(&args.ignore) {
        rules = rules.ignore(path.clone());
    }

    let mut dispatcher = Dispatcher::new();
    dispatcher.register(Box::new(ConsoleReporter::stdout()))?;
    if let Some(slice) = args.slice.or(config.slice) {
        dispatcher.register(Box::new(Slicer::new(slice)?))?;
    }
    if args.fail_fast || config.fail_fast {
        dispatcher.register(Box::new(FailFast::new()))?;
    }
    if let Some(path) = args.event_log.as_ref().or(config.event_log.as_ref()) {
        let log = EventLog::to_file(path)
            .with_context(|| format!("opening event log '{}'", path.display()))?;
        dispatcher.register(Box::new(log))?;
    }

    let mut ctx = RunContext::new();
    let mut discoverer = Discoverer::new(YamlScenarioSource::new());
    discoverer.discover(&roots, &mut ctx, &mut dispatcher)?;
    info!(discovered = ctx.scenarios().len(), "discovery finished");

    Selector::new(rules).select(&mut ctx);

    let mut runner = Runner::new(dispatcher);
    Ok(runner.run(&mut ctx))
}

/// Exit code derived from the run summary.
///
/// 0 when nothing failed or aborted, 130 on interrupt, 1 otherwise.
/// Configuration errors never reach this point; they exit with 2.
pub fn exit_code(report: &Report) -> i32 {
    if report.was_interrupted() {
        130
    } else if report.is_success() {
        0
    } else {
        1
    }
}
