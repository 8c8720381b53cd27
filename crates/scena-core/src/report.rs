//! Outcome aggregation.

use scena_proto::{RunSummary, ScenarioStatus};

use crate::run_context::{AbortReason, RunContext};

/// Aggregated outcome of one run.
///
/// One result per scenario in the selected run-set; path-excluded
/// scenarios are not counted. The summary is the exit-status contract
/// surface: an external CLI layer derives its process exit code from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    summary: RunSummary,
    abort: Option<AbortReason>,
}

impl Report {
    /// Builds the report from a finished run context.
    pub(crate) fn from_context(ctx: &RunContext) -> Self {
        let mut summary = RunSummary::default();
        for scenario in ctx.scenarios() {
            let in_run_set = ctx
                .selection(scenario.id())
                .is_none_or(|selection| selection.in_run_set());
            if !in_run_set {
                continue;
            }
            summary.total += 1;
            match scenario.status() {
                ScenarioStatus::Passed => summary.passed += 1,
                ScenarioStatus::Failed => summary.failed += 1,
                ScenarioStatus::Skipped => summary.skipped += 1,
                ScenarioStatus::Aborted => summary.aborted += 1,
                // The runner guarantees terminal statuses for the run-set.
                ScenarioStatus::Pending => debug_assert!(false, "non-terminal status after run"),
            }
        }
        Self {
            summary,
            abort: ctx.abort().cloned(),
        }
    }

    /// Returns the aggregated counts.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Returns the abort reason, when the run aborted early.
    pub fn abort(&self) -> Option<&AbortReason> {
        self.abort.as_ref()
    }

    /// Returns true when nothing failed and nothing was aborted.
    pub fn is_success(&self) -> bool {
        self.summary.is_success()
    }

    /// Returns true when the run ended on a cooperative interrupt.
    pub fn was_interrupted(&self) -> bool {
        matches!(self.abort, Some(AbortReason::Interrupted))
    }
}
