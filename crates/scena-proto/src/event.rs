//! Lifecycle event taxonomy.
//!
//! Events are synchronous and ordered; a given kind for a given scenario
//! is dispatched exactly once per run. Payloads are immutable records:
//! handlers observe them and mutate run state only through the run context.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::scenario::{ScenarioId, ScenarioStatus, StepError, StepKind, StepStatus};

/// Kind discriminant used for subscription matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    RunStarted,
    ScenarioDiscovered,
    ScenarioSelected,
    ScenarioStarted,
    StepStarted,
    StepFinished,
    ScenarioFinished,
    RunFinished,
}

impl EventKind {
    /// Every event kind, in lifecycle order.
    pub const ALL: [EventKind; 8] = [
        EventKind::RunStarted,
        EventKind::ScenarioDiscovered,
        EventKind::ScenarioSelected,
        EventKind::ScenarioStarted,
        EventKind::StepStarted,
        EventKind::StepFinished,
        EventKind::ScenarioFinished,
        EventKind::RunFinished,
    ];

    /// Returns the kind name as a string slice.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::RunStarted => "run-started",
            EventKind::ScenarioDiscovered => "scenario-discovered",
            EventKind::ScenarioSelected => "scenario-selected",
            EventKind::ScenarioStarted => "scenario-started",
            EventKind::StepStarted => "step-started",
            EventKind::StepFinished => "step-finished",
            EventKind::ScenarioFinished => "scenario-finished",
            EventKind::RunFinished => "run-finished",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated counts exposed to reporters and the exit-status contract.
///
/// An external CLI layer derives its process exit code from this record;
/// the engine itself never terminates a process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub aborted: usize,
}

impl RunSummary {
    /// Returns true when nothing failed and nothing was aborted.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.aborted == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} total, {} passed, {} failed, {} skipped, {} aborted",
            self.total, self.passed, self.failed, self.skipped, self.aborted
        )
    }
}

/// A lifecycle event with its immutable payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Event {
    RunStarted {
        /// Number of scenarios in the selected run-set.
        scenarios: usize,
    },
    ScenarioDiscovered {
        scenario: ScenarioId,
        name: String,
    },
    ScenarioSelected {
        scenario: ScenarioId,
    },
    ScenarioStarted {
        scenario: ScenarioId,
    },
    StepStarted {
        scenario: ScenarioId,
        step: usize,
        phase: StepKind,
    },
    StepFinished {
        scenario: ScenarioId,
        step: usize,
        phase: StepKind,
        status: StepStatus,
        error: Option<StepError>,
    },
    ScenarioFinished {
        scenario: ScenarioId,
        status: ScenarioStatus,
        /// Skip reason or failure detail, when there is one.
        reason: Option<String>,
    },
    RunFinished {
        summary: RunSummary,
    },
}

impl Event {
    /// Returns the kind discriminant for subscription matching.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::RunStarted { .. } => EventKind::RunStarted,
            Event::ScenarioDiscovered { .. } => EventKind::ScenarioDiscovered,
            Event::ScenarioSelected { .. } => EventKind::ScenarioSelected,
            Event::ScenarioStarted { .. } => EventKind::ScenarioStarted,
            Event::StepStarted { .. } => EventKind::StepStarted,
            Event::StepFinished { .. } => EventKind::StepFinished,
            Event::ScenarioFinished { .. } => EventKind::ScenarioFinished,
            Event::RunFinished { .. } => EventKind::RunFinished,
        }
    }

    /// Returns the scenario this event concerns, if it concerns one.
    pub fn scenario(&self) -> Option<ScenarioId> {
        match self {
            Event::RunStarted { .. } | Event::RunFinished { .. } => None,
            Event::ScenarioDiscovered { scenario, .. }
            | Event::ScenarioSelected { scenario }
            | Event::ScenarioStarted { scenario }
            | Event::StepStarted { scenario, .. }
            | Event::StepFinished { scenario, .. }
            | Event::ScenarioFinished { scenario, .. } => Some(*scenario),
        }
    }
}
