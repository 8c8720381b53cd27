//! Distributes a run-set across workers.
//!
//! Each worker runs the same discovery and selection, so runnable
//! scenarios line up identically everywhere; the slicer then late-skips
//! every scenario outside its own slice. Scenarios the selector already
//! flagged for skip keep their verdict and do not consume a slot, which
//! keeps the partition balanced across workers.

use scena_proto::{Error, Event, EventKind, HandlerError, Result};

use crate::config::Slice;
use crate::plugin::Plugin;
use crate::run_context::RunContext;
use crate::selector::Selection;

/// Late-skips every scenario outside this worker's slice.
#[derive(Debug, Clone)]
pub struct Slicer {
    slice: Slice,
    seen: usize,
}

impl Slicer {
    /// Creates a slicer for one worker's assignment.
    pub fn new(slice: Slice) -> Result<Self> {
        if slice.total == 0 {
            return Err(Error::Config("slice total must be at least 1".to_string()));
        }
        if slice.index >= slice.total {
            return Err(Error::Config(format!(
                "slice index {} out of range for {} slices",
                slice.index, slice.total
            )));
        }
        Ok(Self { slice, seen: 0 })
    }
}

impl Plugin for Slicer {
    fn name(&self) -> &str {
        "slicer"
    }

    fn subscriptions(&self) -> Vec<EventKind> {
        vec![EventKind::ScenarioSelected]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RunContext) -> std::result::Result<(), HandlerError> {
        let Event::ScenarioSelected { scenario } = event else {
            return Ok(());
        };

        let runnable = matches!(ctx.selection(*scenario), Some(Selection::Run))
            && ctx.skip_request(*scenario).is_none()
            && ctx.scenario(*scenario).is_some_and(|s| !s.is_broken());
        if !runnable {
            return Ok(());
        }

        let slot = self.seen;
        self.seen += 1;
        if slot % self.slice.total != self.slice.index {
            ctx.request_skip(
                *scenario,
                format!("outside slice {}/{}", self.slice.index, self.slice.total),
            );
        }
        Ok(())
    }
}
