//! Run-scoped shared state.
//!
//! The run context owns the run-set for the duration of one run: the
//! discovered scenarios in stable order, the selector's verdicts, any
//! plugin-issued late-skip requests, and the abort flag. It is created at
//! run start and dropped at run end; nothing in it persists across runs.
//!
//! All plugin mutation goes through these methods, inside a
//! dispatcher-invoked handler. The engine is single-threaded, so no
//! locking is involved.

use std::collections::BTreeMap;
use std::fmt;

use scena_proto::{Scenario, ScenarioId, StepError};

use crate::selector::Selection;

/// Why a run aborted before finishing its run-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// A plugin handler failed with a fatal error.
    PluginFatal { plugin: String, message: String },
    /// Cooperative user interrupt.
    Interrupted,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::PluginFatal { plugin, message } => {
                write!(f, "plugin '{plugin}' failed fatally: {message}")
            }
            AbortReason::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Shared state for the duration of one run.
#[derive(Debug, Default)]
pub struct RunContext {
    scenarios: Vec<Scenario>,
    selections: Vec<Selection>,
    skip_requests: BTreeMap<ScenarioId, String>,
    abort: Option<AbortReason>,
}

impl RunContext {
    /// Creates an empty context for a new run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a scenario at discovery time.
    ///
    /// Scenario ids are their discovery index; the push order defines the
    /// run order.
    pub(crate) fn push(&mut self, scenario: Scenario) -> ScenarioId {
        debug_assert_eq!(scenario.id().index(), self.scenarios.len());
        let id = scenario.id();
        self.scenarios.push(scenario);
        id
    }

    /// Id the next pushed scenario will receive.
    pub(crate) fn next_id(&self) -> ScenarioId {
        ScenarioId(self.scenarios.len())
    }

    /// Returns every discovered scenario, in discovery order.
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Looks up a scenario by id.
    pub fn scenario(&self, id: ScenarioId) -> Option<&Scenario> {
        self.scenarios.get(id.index())
    }

    pub(crate) fn scenario_mut(&mut self, id: ScenarioId) -> Option<&mut Scenario> {
        self.scenarios.get_mut(id.index())
    }

    /// Invokes one step of a scenario.
    pub(crate) fn run_step(&mut self, id: ScenarioId, step: usize) -> Result<(), StepError> {
        match self.scenario_mut(id).and_then(|s| s.step_mut(step)) {
            Some(step) => step.run(),
            None => Err(StepError::new(format!("scenario {id} has no step {step}"))),
        }
    }

    pub(crate) fn set_selections(&mut self, selections: Vec<Selection>) {
        debug_assert_eq!(selections.len(), self.scenarios.len());
        self.selections = selections;
    }

    /// Returns the selector's verdict for a scenario.
    ///
    /// `None` until selection has run.
    pub fn selection(&self, id: ScenarioId) -> Option<&Selection> {
        self.selections.get(id.index())
    }

    /// Requests that a scenario be skipped before it starts (late-skip).
    ///
    /// Additive only: it can never un-skip a scenario the selector already
    /// flagged, and it is ignored once the scenario has started. The first
    /// recorded reason wins.
    pub fn request_skip(&mut self, id: ScenarioId, reason: impl Into<String>) {
        self.skip_requests.entry(id).or_insert_with(|| reason.into());
    }

    /// Returns the late-skip reason requested for a scenario, if any.
    pub fn skip_request(&self, id: ScenarioId) -> Option<&str> {
        self.skip_requests.get(&id).map(String::as_str)
    }

    pub(crate) fn set_abort(&mut self, reason: AbortReason) {
        // First abort wins; later causes are not more interesting.
        if self.abort.is_none() {
            self.abort = Some(reason);
        }
    }

    /// Returns the abort reason once the run is unwinding.
    pub fn abort(&self) -> Option<&AbortReason> {
        self.abort.as_ref()
    }
}
