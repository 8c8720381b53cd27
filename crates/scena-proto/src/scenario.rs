//! Scenario model.
//!
//! A scenario is one discoverable behavioral test unit: a stable identity
//! (resolved path plus declared name), an ordered sequence of steps, and a
//! status that the runner writes exactly once per run. Identity and steps
//! are immutable after discovery.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Identifier of a scenario within one run.
///
/// Assigned sequentially in discovery order and stable for the run's
/// lifetime; it doubles as the index into the run context's scenario list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ScenarioId(pub usize);

impl ScenarioId {
    /// Returns the underlying index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Phase of a scenario step.
///
/// Steps execute strictly in declared order: `given` before `when` before
/// the `then` phases. Multiple `then` phases are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Given,
    When,
    Then,
}

impl StepKind {
    /// Returns the phase name as a string slice.
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Given => "given",
            StepKind::When => "when",
            StepKind::Then => "then",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure captured from a step's behavior.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct StepError {
    pub message: String,
}

impl StepError {
    /// Creates a step failure with the given detail.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for StepError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for StepError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

/// Invocable behavior of a single step.
///
/// The scenario source supplies one behavior per step; the runner invokes
/// it at most once per run. A step is an opaque blocking unit of work: the
/// engine never interleaves behaviors from different scenarios.
pub trait StepBehavior {
    /// Runs the step, completing or failing with a captured detail.
    fn run(&mut self) -> Result<(), StepError>;
}

impl<F> StepBehavior for F
where
    F: FnMut() -> Result<(), StepError>,
{
    fn run(&mut self) -> Result<(), StepError> {
        self()
    }
}

/// Per-step outcome recorded by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
    /// Not executed because an earlier step of the same scenario failed.
    Skipped,
}

/// One phase of a scenario's execution.
pub struct Step {
    kind: StepKind,
    name: String,
    behavior: Box<dyn StepBehavior>,
}

impl Step {
    /// Creates a step from a phase, a label, and its behavior.
    pub fn new(kind: StepKind, name: impl Into<String>, behavior: impl StepBehavior + 'static) -> Self {
        Self {
            kind,
            name: name.into(),
            behavior: Box::new(behavior),
        }
    }

    /// Returns the step's phase.
    pub fn kind(&self) -> StepKind {
        self.kind
    }

    /// Returns the step's label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the step's behavior.
    pub fn run(&mut self) -> Result<(), StepError> {
        self.behavior.run()
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Author-declared selection markers attached to a scenario definition.
///
/// Set at construction time by the scenario source; the engine never
/// inspects anything but these fields. `skip` always wins over `only` for
/// the same scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionTags {
    pub only: bool,
    pub skip: bool,
    /// Author-supplied reason shown when the scenario is skipped by tag.
    pub skip_reason: Option<String>,
}

impl SelectionTags {
    /// Tags marking a scenario as the exclusive run-set.
    pub fn with_only() -> Self {
        Self {
            only: true,
            ..Self::default()
        }
    }

    /// Tags marking a scenario as skipped, with an optional reason.
    pub fn with_skip(reason: Option<String>) -> Self {
        Self {
            skip: true,
            skip_reason: reason,
            ..Self::default()
        }
    }
}

/// Terminal status of a scenario.
///
/// Every selected scenario ends a run with exactly one terminal status;
/// `Pending` exists only between discovery and execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Pending,
    Passed,
    Failed,
    Skipped,
    /// Not run because the run aborted early.
    Aborted,
}

impl ScenarioStatus {
    /// Returns the status name as a string slice.
    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioStatus::Pending => "pending",
            ScenarioStatus::Passed => "passed",
            ScenarioStatus::Failed => "failed",
            ScenarioStatus::Skipped => "skipped",
            ScenarioStatus::Aborted => "aborted",
        }
    }

    /// Returns true once the runner has recorded an outcome.
    pub fn is_terminal(self) -> bool {
        self != ScenarioStatus::Pending
    }
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered test unit.
pub struct Scenario {
    id: ScenarioId,
    path: PathBuf,
    name: String,
    steps: Vec<Step>,
    tags: SelectionTags,
    status: ScenarioStatus,
    skip_reason: Option<String>,
    construction_error: Option<String>,
}

impl Scenario {
    /// Creates a scenario from a loaded spec.
    pub fn new(id: ScenarioId, path: PathBuf, spec: crate::source::ScenarioSpec) -> Self {
        Self {
            id,
            path,
            name: spec.name,
            steps: spec.steps,
            tags: spec.tags,
            status: ScenarioStatus::Pending,
            skip_reason: None,
            construction_error: None,
        }
    }

    /// Creates a placeholder for a unit that failed to construct.
    ///
    /// The runner reports it as failed without invoking any steps, so one
    /// malformed unit never aborts discovery of its siblings.
    pub fn broken(id: ScenarioId, path: PathBuf, error: impl Into<String>) -> Self {
        let error = error.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            id,
            path,
            name,
            steps: Vec::new(),
            tags: SelectionTags::default(),
            status: ScenarioStatus::Pending,
            skip_reason: None,
            construction_error: Some(error),
        }
    }

    /// Returns the run-scoped identifier.
    pub fn id(&self) -> ScenarioId {
        self.id
    }

    /// Returns the resolved path of the declaring file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ordered steps.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns a step for execution.
    pub fn step_mut(&mut self, index: usize) -> Option<&mut Step> {
        self.steps.get_mut(index)
    }

    /// Returns the author-declared selection tags.
    pub fn tags(&self) -> &SelectionTags {
        &self.tags
    }

    /// Returns the current status.
    pub fn status(&self) -> ScenarioStatus {
        self.status
    }

    /// Returns the reason this scenario was skipped, if it was.
    pub fn skip_reason(&self) -> Option<&str> {
        self.skip_reason.as_deref()
    }

    /// Returns the construction error for a unit that failed to load.
    pub fn construction_error(&self) -> Option<&str> {
        self.construction_error.as_deref()
    }

    /// Returns true if this unit failed to construct during discovery.
    pub fn is_broken(&self) -> bool {
        self.construction_error.is_some()
    }

    /// Records a passed outcome.
    pub fn mark_passed(&mut self) {
        self.set_status(ScenarioStatus::Passed);
    }

    /// Records a failed outcome.
    pub fn mark_failed(&mut self) {
        self.set_status(ScenarioStatus::Failed);
    }

    /// Records a skipped outcome with its reason.
    pub fn mark_skipped(&mut self, reason: impl Into<String>) {
        self.skip_reason = Some(reason.into());
        self.set_status(ScenarioStatus::Skipped);
    }

    /// Records that the scenario never ran because the run aborted.
    pub fn mark_aborted(&mut self) {
        self.set_status(ScenarioStatus::Aborted);
    }

    fn set_status(&mut self, status: ScenarioStatus) {
        // Status is written exactly once per run.
        debug_assert_eq!(self.status, ScenarioStatus::Pending);
        self.status = status;
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .field("tags", &self.tags)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
