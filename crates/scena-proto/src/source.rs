//! Collaborator traits for scenario supply and path resolution.
//!
//! The engine never parses scenario files itself: a [`ScenarioSource`]
//! turns recognized files into uniform [`ScenarioSpec`] records, and a
//! [`PathResolver`] expands root paths into concrete files. Both are
//! supplied per run, keeping the core decoupled from any authoring surface.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::scenario::{SelectionTags, Step, StepBehavior, StepKind};

/// Error constructing scenario units from one file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
    pub message: String,
}

impl LoadError {
    /// Creates a load error with the given detail.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One declared scenario unit as supplied by a source.
///
/// Declaration order within a file is preserved by discovery.
pub struct ScenarioSpec {
    pub name: String,
    pub steps: Vec<Step>,
    pub tags: SelectionTags,
}

impl ScenarioSpec {
    /// Creates an empty spec with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            tags: SelectionTags::default(),
        }
    }

    /// Appends a step.
    pub fn step(
        mut self,
        kind: StepKind,
        name: impl Into<String>,
        behavior: impl StepBehavior + 'static,
    ) -> Self {
        self.steps.push(Step::new(kind, name, behavior));
        self
    }

    /// Sets the selection tags.
    pub fn tags(mut self, tags: SelectionTags) -> Self {
        self.tags = tags;
        self
    }
}

impl fmt::Debug for ScenarioSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioSpec")
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .field("tags", &self.tags)
            .finish()
    }
}

/// Supplies scenario units for discovered files.
pub trait ScenarioSource {
    /// Returns true if the file is a scenario unit this source can load.
    ///
    /// Files this returns false for are silently skipped by discovery.
    fn matches(&self, path: &Path) -> bool;

    /// Loads every scenario declared in the file, in declaration order.
    fn load(&mut self, path: &Path) -> Result<Vec<ScenarioSpec>, LoadError>;
}

/// Expands root paths into concrete files.
///
/// Directory expansion is the resolver's responsibility; the precedence of
/// inclusion vs. exclusion rules stays in the engine's selector.
pub trait PathResolver {
    /// Resolves one root to the files beneath it, in lexicographic order.
    fn resolve(&self, root: &Path) -> std::io::Result<Vec<PathBuf>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_builder_preserves_declaration_order() {
        let spec = ScenarioSpec::new("checkout")
            .step(StepKind::Given, "a cart", || Ok(()))
            .step(StepKind::When, "paying", || Ok(()))
            .step(StepKind::Then, "order is placed", || Ok(()))
            .step(StepKind::Then, "receipt is sent", || Ok(()));

        let kinds: Vec<_> = spec.steps.iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            [StepKind::Given, StepKind::When, StepKind::Then, StepKind::Then]
        );
        assert_eq!(spec.steps[3].name(), "receipt is sent");
    }

    #[test]
    fn test_load_error_display() {
        let err = LoadError::new("missing `steps` key");
        assert_eq!(err.to_string(), "missing `steps` key");
    }
}
