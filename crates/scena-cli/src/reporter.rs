//! Plain console reporter.
//!
//! One line per finished scenario plus a final summary. Rendering stays a
//! collaborator concern: the reporter is an ordinary plugin on the same
//! bus as everything else, consuming only event payloads and the run
//! context.

use std::io::{self, Write};

use colored::Colorize;

use scena_core::{Plugin, RunContext};
use scena_proto::{Event, EventKind, HandlerError, ScenarioStatus};

/// Writes one status line per scenario and a closing summary.
pub struct ConsoleReporter<W: Write> {
    writer: W,
}

impl ConsoleReporter<io::Stdout> {
    /// Creates a reporter writing to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Creates a reporter over any writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn report(&mut self, event: &Event, ctx: &RunContext) -> io::Result<()> {
        match event {
            Event::RunStarted { scenarios } => {
                writeln!(self.writer, "{}", format!("running {scenarios} scenarios").bold())
            }
            Event::ScenarioFinished {
                scenario,
                status,
                reason,
            } => {
                let name = ctx
                    .scenario(*scenario)
                    .map_or_else(|| scenario.to_string(), |s| s.name().to_string());
                let line = match status {
                    ScenarioStatus::Passed => format!(" ✔ {name}").green(),
                    ScenarioStatus::Failed => match reason {
                        Some(reason) => format!(" ✗ {name}: {reason}").red(),
                        None => format!(" ✗ {name}").red(),
                    },
                    ScenarioStatus::Skipped => match reason {
                        Some(reason) => format!(" ○ {name} ({reason})").yellow(),
                        None => format!(" ○ {name}").yellow(),
                    },
                    ScenarioStatus::Aborted => format!(" ! {name} (not run)").red(),
                    ScenarioStatus::Pending => format!(" ? {name}").normal(),
                };
                writeln!(self.writer, "{line}")
            }
            Event::RunFinished { summary } => {
                let line = if summary.is_success() {
                    summary.to_string().green()
                } else {
                    summary.to_string().red()
                };
                writeln!(self.writer, "\n{line}")
            }
            _ => Ok(()),
        }
    }
}

impl<W: Write> Plugin for ConsoleReporter<W> {
    fn name(&self) -> &str {
        "console-reporter"
    }

    fn subscriptions(&self) -> Vec<EventKind> {
        vec![
            EventKind::RunStarted,
            EventKind::ScenarioFinished,
            EventKind::RunFinished,
        ]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RunContext) -> Result<(), HandlerError> {
        self.report(event, ctx)
            .map_err(|err| HandlerError::recoverable(format!("write report: {err}")))
    }
}
