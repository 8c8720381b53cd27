//! YAML scenario files executed through shell commands.
//!
//! Recognizes `*.scenario.yaml` / `*.scenario.yml` files. A file declares
//! one scenario or a list of them:
//!
//! ```yaml
//! - name: user can log in
//!   steps:
//!     - given: a seeded database
//!       run: ./scripts/seed.sh
//!     - when: credentials are submitted
//!       run: curl -fsS http://localhost:8000/login -d user=admin
//!     - then: a session cookie exists
//!       run: test -s session.txt
//! - name: quota warning banner
//!   skip: blocked on billing sandbox
//!   steps: []
//! ```
//!
//! `only` is a boolean; `skip` is either a boolean or a reason string.
//! Each step runs its command via `sh -c`; a non-zero exit fails the step
//! with the stderr tail as the captured detail.

use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use scena_proto::{
    LoadError, ScenarioSource, ScenarioSpec, SelectionTags, Step, StepBehavior, StepError,
    StepKind,
};

const EXTENSIONS: [&str; 2] = [".scenario.yaml", ".scenario.yml"];

/// How much captured output a step failure carries.
const DETAIL_LIMIT: usize = 400;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileSchema {
    Many(Vec<ScenarioSchema>),
    One(ScenarioSchema),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioSchema {
    name: String,
    #[serde(default)]
    only: bool,
    #[serde(default)]
    skip: Option<SkipField>,
    #[serde(default)]
    steps: Vec<StepSchema>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SkipField {
    Flag(bool),
    Reason(String),
}

#[derive(Debug, Deserialize)]
struct StepSchema {
    #[serde(flatten)]
    phase: PhaseSchema,
    run: String,
}

#[derive(Debug, Deserialize)]
enum PhaseSchema {
    #[serde(rename = "given")]
    Given(String),
    #[serde(rename = "when")]
    When(String),
    #[serde(rename = "then")]
    Then(String),
}

impl PhaseSchema {
    fn into_parts(self) -> (StepKind, String) {
        match self {
            PhaseSchema::Given(label) => (StepKind::Given, label),
            PhaseSchema::When(label) => (StepKind::When, label),
            PhaseSchema::Then(label) => (StepKind::Then, label),
        }
    }
}

/// A step behavior that shells out to `sh -c`.
#[derive(Debug, Clone)]
struct ShellCommand {
    command: String,
}

impl StepBehavior for ShellCommand {
    fn run(&mut self) -> Result<(), StepError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .output()
            .map_err(|err| StepError::new(format!("failed to spawn `{}`: {err}", self.command)))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = tail(stderr.trim(), stdout.trim());
        let mut message = match output.status.code() {
            Some(code) => format!("`{}` exited with status {code}", self.command),
            None => format!("`{}` was terminated by a signal", self.command),
        };
        if !detail.is_empty() {
            message.push_str(": ");
            message.push_str(&detail);
        }
        Err(StepError::new(message))
    }
}

fn tail(stderr: &str, stdout: &str) -> String {
    let detail = if stderr.is_empty() { stdout } else { stderr };
    match detail.char_indices().nth_back(DETAIL_LIMIT) {
        Some((index, _)) => detail[index..].to_string(),
        None => detail.to_string(),
    }
}

/// Scenario source for YAML files with shell-command steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlScenarioSource;

impl YamlScenarioSource {
    /// Creates the source.
    pub fn new() -> Self {
        Self
    }
}

impl ScenarioSource for YamlScenarioSource {
    fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        EXTENSIONS.iter().any(|ext| name.ends_with(ext))
    }

    fn load(&mut self, path: &Path) -> Result<Vec<ScenarioSpec>, LoadError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| LoadError::new(format!("read '{}': {err}", path.display())))?;
        let schema: FileSchema = serde_yaml::from_str(&raw)
            .map_err(|err| LoadError::new(format!("parse '{}': {err}", path.display())))?;

        let declared = match schema {
            FileSchema::Many(scenarios) => scenarios,
            FileSchema::One(scenario) => vec![scenario],
        };
        debug!(path = %path.display(), scenarios = declared.len(), "parsed scenario file");

        Ok(declared.into_iter().map(into_spec).collect())
    }
}

fn into_spec(schema: ScenarioSchema) -> ScenarioSpec {
    let mut tags = SelectionTags {
        only: schema.only,
        ..SelectionTags::default()
    };
    match schema.skip {
        Some(SkipField::Flag(flag)) => tags.skip = flag,
        Some(SkipField::Reason(reason)) => {
            tags.skip = true;
            tags.skip_reason = Some(reason);
        }
        None => {}
    }

    let mut spec = ScenarioSpec::new(schema.name).tags(tags);
    for step in schema.steps {
        let (kind, label) = step.phase.into_parts();
        spec.steps
            .push(Step::new(kind, label, ShellCommand { command: step.run }));
    }
    spec
}
