//! Plugin contract.

use scena_proto::{Event, EventKind, HandlerError};

use crate::run_context::RunContext;

/// A unit of run-scoped behavior subscribed to lifecycle events.
///
/// Plugins register with the dispatcher before `run-started` and are
/// invoked synchronously, in registration order, for every event kind
/// they subscribe to. A handler may observe the event and mutate run
/// state through the [`RunContext`] (for example late-skipping a
/// scenario from a `scenario-selected` handler), but it can never
/// reorder events that were already dispatched.
///
/// Returning [`HandlerError::Recoverable`] isolates the failure to this
/// handler; [`HandlerError::Fatal`] aborts the remaining run-set.
pub trait Plugin {
    /// Stable name used in failure records and logs.
    fn name(&self) -> &str;

    /// Event kinds this plugin handles.
    ///
    /// Snapshotted at registration and fixed for the run; subscribe to
    /// [`EventKind::ALL`] to observe everything.
    fn subscriptions(&self) -> Vec<EventKind>;

    /// Handles one event.
    fn handle(&mut self, event: &Event, ctx: &mut RunContext) -> Result<(), HandlerError>;
}
