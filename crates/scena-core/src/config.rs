//! Run configuration.
//!
//! Loaded from `scena.yaml` when present; every field has a default so an
//! empty or missing file is valid. CLI flags override config values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use scena_proto::{Error, Result};

/// Slice assignment for distributing a run-set across workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    /// Zero-based slice to execute.
    pub index: usize,
    /// Total number of slices.
    pub total: usize,
}

/// Run configuration, merged from `scena.yaml` and CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Default discovery root when no paths are given.
    pub scenarios_dir: PathBuf,
    /// Paths excluded from selection.
    pub ignore: Vec<PathBuf>,
    /// Abort the run on the first failed scenario.
    pub fail_fast: bool,
    /// Optional slice assignment.
    pub slice: Option<Slice>,
    /// Append lifecycle events as JSON lines to this file.
    pub event_log: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scenarios_dir: PathBuf::from("scenarios"),
            ignore: Vec::new(),
            fail_fast: false,
            slice: None,
            event_log: None,
        }
    }
}

impl RunConfig {
    /// Default config file name, resolved against the working directory.
    pub const DEFAULT_PATH: &'static str = "scena.yaml";

    /// Loads configuration from `path`.
    ///
    /// A missing file yields defaults; a malformed one is a configuration
    /// error, surfaced before any run starts.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&raw)
            .map_err(|err| Error::Config(format!("{}: {err}", path.display())))
    }
}
