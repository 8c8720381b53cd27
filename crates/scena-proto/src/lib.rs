//! # scena-proto
//!
//! Shared types, error definitions, and traits for the Scena framework.
//!
//! This crate provides the foundational abstractions used across all Scena
//! crates, including:
//! - The scenario model (scenarios, steps, selection tags, statuses)
//! - The lifecycle event taxonomy
//! - Collaborator traits for scenario sources and path resolution
//! - Common error types

mod error;
mod event;
mod scenario;
mod source;

pub use error::{Error, HandlerError, Result};
pub use event::{Event, EventKind, RunSummary};
pub use scenario::{
    Scenario, ScenarioId, ScenarioStatus, SelectionTags, Step, StepBehavior, StepError, StepKind,
    StepStatus,
};
pub use source::{LoadError, PathResolver, ScenarioSource, ScenarioSpec};
