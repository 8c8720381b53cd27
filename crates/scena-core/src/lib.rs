//! # scena-core
//!
//! Core execution engine for the Scena framework.
//!
//! This crate provides:
//! - Scenario discovery over root paths via collaborator-supplied sources
//! - Run-set selection from path rules and author tags
//! - The synchronous publish/subscribe dispatcher plugins attach to
//! - The runner driving the per-scenario lifecycle state machine
//! - Outcome aggregation into a run report
//! - Run configuration loading and built-in plugins

mod config;
mod discovery;
mod dispatcher;
mod plugin;
pub mod plugins;
mod report;
mod run_context;
mod runner;
mod selector;
pub mod testing;

pub use config::{RunConfig, Slice};
pub use discovery::{Discoverer, FsPathResolver};
pub use dispatcher::{Dispatcher, FatalHandler, HandlerFailure};
pub use plugin::Plugin;
pub use report::Report;
pub use run_context::{AbortReason, RunContext};
pub use runner::Runner;
pub use selector::{PathRule, PathRuleSet, Selection, Selector};
