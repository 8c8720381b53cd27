//! Test support for exercising the engine without a real authoring surface.
//!
//! Used by this crate's own tests and available to downstream crates that
//! need an in-memory scenario supply.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use scena_proto::{
    Event, EventKind, HandlerError, LoadError, Scenario, ScenarioId, ScenarioSource, ScenarioSpec,
    Step, StepError, StepKind,
};

use crate::plugin::Plugin;
use crate::run_context::RunContext;

/// Appends scenarios to a context directly, bypassing discovery.
///
/// Scenarios land in the given order under the given path, exactly as a
/// discovery pass over one file would place them.
pub fn push_scenarios(
    ctx: &mut RunContext,
    path: impl AsRef<Path>,
    specs: Vec<ScenarioSpec>,
) -> Vec<ScenarioId> {
    specs
        .into_iter()
        .map(|spec| {
            let scenario = Scenario::new(ctx.next_id(), path.as_ref().to_path_buf(), spec);
            ctx.push(scenario)
        })
        .collect()
}

/// Scenario source backed by an in-memory map of path to specs.
///
/// Each entry is consumed on load, so a source instance serves one
/// discovery pass.
#[derive(Default)]
pub struct StaticSource {
    files: BTreeMap<PathBuf, Result<Vec<ScenarioSpec>, String>>,
}

impl StaticSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file with its declared scenarios.
    pub fn file(mut self, path: impl AsRef<Path>, specs: Vec<ScenarioSpec>) -> Self {
        self.files.insert(path.as_ref().to_path_buf(), Ok(specs));
        self
    }

    /// Registers a file that fails to load.
    pub fn broken_file(mut self, path: impl AsRef<Path>, error: impl Into<String>) -> Self {
        self.files
            .insert(path.as_ref().to_path_buf(), Err(error.into()));
        self
    }
}

impl ScenarioSource for StaticSource {
    fn matches(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn load(&mut self, path: &Path) -> Result<Vec<ScenarioSpec>, LoadError> {
        match self.files.remove(path) {
            Some(Ok(specs)) => Ok(specs),
            Some(Err(message)) => Err(LoadError::new(message)),
            None => Err(LoadError::new(format!(
                "no scenarios registered for '{}'",
                path.display()
            ))),
        }
    }
}

/// A step that always completes.
pub fn passing_step(kind: StepKind, name: &str) -> Step {
    Step::new(kind, name, || Ok(()))
}

/// A step that always fails with the given detail.
pub fn failing_step(kind: StepKind, name: &str, message: &str) -> Step {
    let message = message.to_string();
    Step::new(kind, name, move || Err(StepError::new(message.clone())))
}

/// A step that records its label into a shared trace before completing.
pub fn traced_step(kind: StepKind, name: &str, trace: &Rc<RefCell<Vec<String>>>) -> Step {
    let label = name.to_string();
    let trace = Rc::clone(trace);
    Step::new(kind, name, move || {
        trace.borrow_mut().push(label.clone());
        Ok(())
    })
}

/// Plugin capturing every event it sees, for assertions.
pub struct RecordingPlugin {
    events: Rc<RefCell<Vec<Event>>>,
}

impl RecordingPlugin {
    /// Creates the plugin and the shared handle tests read afterwards.
    pub fn new() -> (Self, Rc<RefCell<Vec<Event>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                events: Rc::clone(&events),
            },
            events,
        )
    }
}

impl Plugin for RecordingPlugin {
    fn name(&self) -> &str {
        "recording"
    }

    fn subscriptions(&self) -> Vec<EventKind> {
        EventKind::ALL.to_vec()
    }

    fn handle(&mut self, event: &Event, _ctx: &mut RunContext) -> Result<(), HandlerError> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}
