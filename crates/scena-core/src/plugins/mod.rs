//! Built-in plugins.
//!
//! Each exercises one extension point of the dispatcher contract and is
//! registered on the same bus as user plugins.

mod event_log;
mod fail_fast;
mod slicer;

pub use event_log::EventLog;
pub use fail_fast::FailFast;
pub use slicer::Slicer;
