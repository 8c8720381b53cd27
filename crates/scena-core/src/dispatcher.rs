//! Synchronous publish/subscribe bus for lifecycle events.
//!
//! The dispatcher is single-threaded and strictly synchronous: `publish`
//! invokes every subscribed handler for the event's kind, in registration
//! order, and all handlers complete before `publish` returns. Handler
//! failures are isolated per handler unless fatal, in which case the
//! failure propagates to the runner.

use scena_proto::{Error, Event, EventKind, HandlerError, Result};
use tracing::{debug, warn};

use crate::plugin::Plugin;
use crate::run_context::RunContext;

/// A fatal handler failure propagated to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalHandler {
    pub plugin: String,
    pub message: String,
}

impl From<FatalHandler> for Error {
    fn from(fatal: FatalHandler) -> Self {
        Error::PluginFatal {
            plugin: fatal.plugin,
            message: fatal.message,
        }
    }
}

/// A recoverable handler failure recorded by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    pub plugin: String,
    pub event: EventKind,
    pub message: String,
}

struct Subscriber {
    plugin: Box<dyn Plugin>,
    /// Subscription set snapshotted at registration time.
    kinds: Vec<EventKind>,
}

/// The event bus plugins attach to for one run.
#[derive(Default)]
pub struct Dispatcher {
    subscribers: Vec<Subscriber>,
    failures: Vec<HandlerFailure>,
    sealed: bool,
}

impl Dispatcher {
    /// Creates a dispatcher with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin.
    ///
    /// Registration order is dispatch order. The plugin's subscription
    /// set is snapshotted here and fixed for the run; registering after
    /// `run-started` has been published is an error.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Result<()> {
        if self.sealed {
            return Err(Error::SubscriptionsSealed);
        }
        let kinds = plugin.subscriptions();
        debug!(plugin = plugin.name(), subscriptions = kinds.len(), "registered plugin");
        self.subscribers.push(Subscriber { plugin, kinds });
        Ok(())
    }

    /// Publishes an event to every subscriber of its kind.
    ///
    /// A handler failure aborts only that handler's work for the event;
    /// the dispatcher records it and continues, unless the failure is
    /// fatal-to-run, which stops this publish and propagates.
    pub fn publish(
        &mut self,
        event: &Event,
        ctx: &mut RunContext,
    ) -> std::result::Result<(), FatalHandler> {
        let kind = event.kind();
        if kind == EventKind::RunStarted {
            self.sealed = true;
        }

        for subscriber in &mut self.subscribers {
            if !subscriber.kinds.contains(&kind) {
                continue;
            }
            match subscriber.plugin.handle(event, ctx) {
                Ok(()) => {}
                Err(HandlerError::Recoverable(message)) => {
                    warn!(
                        plugin = subscriber.plugin.name(),
                        event = %kind,
                        "plugin handler failed: {message}"
                    );
                    self.failures.push(HandlerFailure {
                        plugin: subscriber.plugin.name().to_string(),
                        event: kind,
                        message,
                    });
                }
                Err(HandlerError::Fatal(message)) => {
                    warn!(
                        plugin = subscriber.plugin.name(),
                        event = %kind,
                        "plugin handler failed fatally: {message}"
                    );
                    return Err(FatalHandler {
                        plugin: subscriber.plugin.name().to_string(),
                        message,
                    });
                }
            }
        }
        Ok(())
    }

    /// Recoverable handler failures recorded so far.
    pub fn failures(&self) -> &[HandlerFailure] {
        &self.failures
    }

    /// Returns true once `run-started` has been published.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Number of registered plugins.
    pub fn plugin_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("plugins", &self.subscribers.len())
            .field("failures", &self.failures.len())
            .field("sealed", &self.sealed)
            .finish()
    }
}
