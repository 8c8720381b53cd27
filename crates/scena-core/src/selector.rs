//! Run-set selection.
//!
//! Selection reconciles two rule families over the discovered sequence:
//! filesystem path rules (inclusion roots, exclusion paths) and
//! author-declared tags (`only`, `skip`). Exclusion removes a scenario
//! from the run-set outright; tag-driven deselection keeps it in the
//! run-set, flagged skip-without-execution, so reporters still observe it.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::run_context::RunContext;

/// A filesystem-path-based selection rule.
///
/// A rule matches a scenario when the rule path equals the scenario's
/// resolved path or is an ancestor directory of it. Rules and scenario
/// paths must be resolved against the same base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRule {
    Include(PathBuf),
    Ignore(PathBuf),
}

/// A set of path rules with set-difference semantics.
///
/// Ordering among inclusions is irrelevant, and exclusion wins over
/// inclusion unconditionally: excluding a path twice is the same as
/// excluding it once.
#[derive(Debug, Clone, Default)]
pub struct PathRuleSet {
    includes: Vec<PathBuf>,
    ignores: Vec<PathBuf>,
}

impl PathRuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a rule set from individual rules.
    pub fn from_rules(rules: impl IntoIterator<Item = PathRule>) -> Self {
        let mut set = Self::new();
        for rule in rules {
            match rule {
                PathRule::Include(path) => set.includes.push(path),
                PathRule::Ignore(path) => set.ignores.push(path),
            }
        }
        set
    }

    /// Adds an inclusion root.
    pub fn include(mut self, path: impl Into<PathBuf>) -> Self {
        self.includes.push(path.into());
        self
    }

    /// Adds an exclusion path.
    pub fn ignore(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignores.push(path.into());
        self
    }

    /// Returns the inclusion roots, for use as discovery roots.
    pub fn includes(&self) -> &[PathBuf] {
        &self.includes
    }

    /// Returns true when the path matches any exclusion rule.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.ignores.iter().any(|rule| rule_matches(rule, path))
    }
}

fn rule_matches(rule: &Path, path: &Path) -> bool {
    path == rule || path.starts_with(rule)
}

/// Verdict the selector records for each discovered scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Eligible for execution.
    Run,
    /// Stays in the run-set; receives lifecycle events, steps never invoked.
    Skip { reason: String },
    /// Removed by an exclusion path rule; receives no lifecycle events.
    Excluded,
}

impl Selection {
    /// Returns true for scenarios that remain in the run-set.
    pub fn in_run_set(&self) -> bool {
        !matches!(self, Selection::Excluded)
    }
}

/// Applies path rules and selection tags to the discovered sequence.
#[derive(Debug, Default)]
pub struct Selector {
    rules: PathRuleSet,
}

impl Selector {
    /// Creates a selector over the given rule set.
    pub fn new(rules: PathRuleSet) -> Self {
        Self { rules }
    }

    /// Records a selection verdict for every discovered scenario.
    ///
    /// In order: exclusion path rules drop scenarios from the run-set;
    /// then, if any remaining scenario carries `only`, every remaining
    /// scenario without `only` is flagged for skip; `skip`-tagged
    /// scenarios are flagged with their author-supplied reason. `skip`
    /// wins over `only` for the same scenario, but a scenario tagged both
    /// still activates `only` filtering for the others. Discovery order
    /// is preserved.
    pub fn select(&self, ctx: &mut RunContext) {
        let excluded: Vec<bool> = ctx
            .scenarios()
            .iter()
            .map(|s| self.rules.is_excluded(s.path()))
            .collect();

        let only_present = ctx
            .scenarios()
            .iter()
            .zip(&excluded)
            .any(|(s, dropped)| !dropped && s.tags().only);

        let selections: Vec<Selection> = ctx
            .scenarios()
            .iter()
            .zip(&excluded)
            .map(|(s, dropped)| {
                if *dropped {
                    Selection::Excluded
                } else if s.tags().skip {
                    let reason = s
                        .tags()
                        .skip_reason
                        .clone()
                        .unwrap_or_else(|| "skipped by tag".to_string());
                    Selection::Skip { reason }
                } else if only_present && !s.tags().only {
                    Selection::Skip {
                        reason: "not tagged `only`".to_string(),
                    }
                } else {
                    Selection::Run
                }
            })
            .collect();

        debug!(
            discovered = selections.len(),
            excluded = selections.iter().filter(|s| !s.in_run_set()).count(),
            only_present,
            "selection resolved"
        );
        ctx.set_selections(selections);
    }
}
