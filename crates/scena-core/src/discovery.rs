//! Scenario discovery.
//!
//! Discovery expands root paths into a deterministic, finite sequence of
//! scenarios: lexicographic by resolved path across all roots (duplicates
//! collapsed), then declaration order within a file. Files the source does
//! not recognize are silently skipped. A root that resolves to no
//! scenarios is not an error; a root that does not exist on the filesystem
//! is a fatal configuration error. One malformed unit becomes a single
//! construction-failed scenario and never aborts discovery of its
//! siblings.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use scena_proto::{Error, Event, PathResolver, Result, Scenario, ScenarioSource};
use tracing::{debug, warn};

use crate::dispatcher::Dispatcher;
use crate::run_context::RunContext;

/// Default resolver: recursive directory walk in lexicographic order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPathResolver;

impl PathResolver for FsPathResolver {
    fn resolve(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        if root.is_dir() {
            walk(root, &mut files)?;
        } else {
            files.push(root.to_path_buf());
        }
        Ok(files)
    }
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Walks root paths and appends discovered scenarios to the run context.
pub struct Discoverer<S, R = FsPathResolver> {
    source: S,
    resolver: R,
}

impl<S: ScenarioSource> Discoverer<S> {
    /// Creates a discoverer over the default filesystem resolver.
    pub fn new(source: S) -> Self {
        Self::with_resolver(source, FsPathResolver)
    }
}

impl<S: ScenarioSource, R: PathResolver> Discoverer<S, R> {
    /// Creates a discoverer with an explicit path resolver.
    pub fn with_resolver(source: S, resolver: R) -> Self {
        Self { source, resolver }
    }

    /// Discovers scenarios beneath `roots`, in stable order.
    ///
    /// Emits `scenario-discovered` for every appended scenario. Fails
    /// fast, before touching any file, when an explicitly named root does
    /// not exist.
    pub fn discover(
        &mut self,
        roots: &[PathBuf],
        ctx: &mut RunContext,
        dispatcher: &mut Dispatcher,
    ) -> Result<()> {
        for root in roots {
            if !root.exists() {
                return Err(Error::Config(format!(
                    "scenario path '{}' does not exist",
                    root.display()
                )));
            }
        }

        let mut files = BTreeSet::new();
        for root in roots {
            files.extend(self.resolver.resolve(root)?);
        }

        for file in files {
            if !self.source.matches(&file) {
                continue;
            }
            match self.source.load(&file) {
                Ok(specs) => {
                    debug!(path = %file.display(), scenarios = specs.len(), "loaded scenario unit");
                    for spec in specs {
                        let scenario = Scenario::new(ctx.next_id(), file.clone(), spec);
                        self.announce(scenario, ctx, dispatcher)?;
                    }
                }
                Err(err) => {
                    // Isolation: one bad unit must not abort its siblings.
                    warn!(path = %file.display(), "failed to load scenario unit: {err}");
                    let scenario = Scenario::broken(ctx.next_id(), file.clone(), err.message);
                    self.announce(scenario, ctx, dispatcher)?;
                }
            }
        }
        Ok(())
    }

    fn announce(
        &mut self,
        scenario: Scenario,
        ctx: &mut RunContext,
        dispatcher: &mut Dispatcher,
    ) -> Result<()> {
        let event = Event::ScenarioDiscovered {
            scenario: scenario.id(),
            name: scenario.name().to_string(),
        };
        ctx.push(scenario);
        dispatcher.publish(&event, ctx).map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticSource;
    use scena_proto::{ScenarioSpec, StepKind};
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap();
    }

    fn spec(name: &str) -> ScenarioSpec {
        ScenarioSpec::new(name).step(StepKind::Given, "noop", || Ok(()))
    }

    #[test]
    fn test_missing_root_is_a_configuration_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("no-such-dir");

        let mut discoverer = Discoverer::new(StaticSource::new());
        let mut ctx = RunContext::new();
        let mut dispatcher = Dispatcher::new();

        let err = discoverer
            .discover(&[missing], &mut ctx, &mut dispatcher)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(ctx.scenarios().is_empty());
    }

    #[test]
    fn test_walk_is_lexicographic_and_recursive() {
        let temp = TempDir::new().unwrap();
        let b = temp.path().join("b.unit");
        let nested = temp.path().join("a/nested.unit");
        let other = temp.path().join("a/readme.md");
        touch(&b);
        touch(&nested);
        touch(&other);

        let source = StaticSource::new()
            .file(&nested, vec![spec("nested")])
            .file(&b, vec![spec("b")]);
        let mut discoverer = Discoverer::new(source);
        let mut ctx = RunContext::new();
        let mut dispatcher = Dispatcher::new();
        discoverer
            .discover(&[temp.path().to_path_buf()], &mut ctx, &mut dispatcher)
            .unwrap();

        // `a/nested.unit` sorts before `b.unit`; `readme.md` is not a
        // scenario unit and is silently skipped.
        let names: Vec<_> = ctx.scenarios().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["nested", "b"]);
    }

    #[test]
    fn test_overlapping_roots_collapse_duplicates() {
        let temp = TempDir::new().unwrap();
        let unit = temp.path().join("a/login.unit");
        touch(&unit);

        let source = StaticSource::new().file(&unit, vec![spec("login")]);
        let mut discoverer = Discoverer::new(source);
        let mut ctx = RunContext::new();
        let mut dispatcher = Dispatcher::new();
        discoverer
            .discover(
                &[temp.path().to_path_buf(), temp.path().join("a"), unit.clone()],
                &mut ctx,
                &mut dispatcher,
            )
            .unwrap();

        assert_eq!(ctx.scenarios().len(), 1);
    }

    #[test]
    fn test_malformed_unit_is_isolated_as_a_broken_scenario() {
        let temp = TempDir::new().unwrap();
        let bad = temp.path().join("a_bad.unit");
        let good = temp.path().join("b_good.unit");
        touch(&bad);
        touch(&good);

        let source = StaticSource::new()
            .broken_file(&bad, "unexpected token")
            .file(&good, vec![spec("good")]);
        let mut discoverer = Discoverer::new(source);
        let mut ctx = RunContext::new();
        let mut dispatcher = Dispatcher::new();
        discoverer
            .discover(&[temp.path().to_path_buf()], &mut ctx, &mut dispatcher)
            .unwrap();

        assert_eq!(ctx.scenarios().len(), 2);
        assert!(ctx.scenarios()[0].is_broken());
        assert_eq!(
            ctx.scenarios()[0].construction_error(),
            Some("unexpected token")
        );
        assert_eq!(ctx.scenarios()[1].name(), "good");
    }

    #[test]
    fn test_declaration_order_within_a_file_is_preserved() {
        let temp = TempDir::new().unwrap();
        let unit = temp.path().join("multi.unit");
        touch(&unit);

        let source =
            StaticSource::new().file(&unit, vec![spec("first"), spec("second"), spec("third")]);
        let mut discoverer = Discoverer::new(source);
        let mut ctx = RunContext::new();
        let mut dispatcher = Dispatcher::new();
        discoverer
            .discover(&[unit.clone()], &mut ctx, &mut dispatcher)
            .unwrap();

        let names: Vec<_> = ctx.scenarios().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }
}
