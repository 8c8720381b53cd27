//! Aborts the run on the first failed scenario.

use scena_proto::{Event, EventKind, HandlerError, ScenarioStatus};

use crate::plugin::Plugin;
use crate::run_context::RunContext;

/// Declares the first scenario failure fatal-to-run.
///
/// Every scenario that has not finished by then is marked `aborted`, so
/// reporters still see one terminal status per scenario.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFast;

impl FailFast {
    /// Creates the plugin.
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for FailFast {
    fn name(&self) -> &str {
        "fail-fast"
    }

    fn subscriptions(&self) -> Vec<EventKind> {
        vec![EventKind::ScenarioFinished]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RunContext) -> Result<(), HandlerError> {
        if let Event::ScenarioFinished {
            scenario,
            status: ScenarioStatus::Failed,
            ..
        } = event
        {
            let name = ctx
                .scenario(*scenario)
                .map_or_else(|| scenario.to_string(), |s| s.name().to_string());
            return Err(HandlerError::fatal(format!("scenario '{name}' failed")));
        }
        Ok(())
    }
}
