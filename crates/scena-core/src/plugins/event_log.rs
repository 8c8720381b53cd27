//! Appends lifecycle events as JSON lines.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use scena_proto::{Event, EventKind, HandlerError};

use crate::plugin::Plugin;
use crate::run_context::RunContext;

/// One logged line: the event payload plus a wall-clock timestamp.
#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    timestamp: String,
    #[serde(flatten)]
    event: &'a Event,
}

/// Writes every event as one JSON line, in dispatch order.
///
/// Write failures are recoverable: logging must never take down the run.
pub struct EventLog<W: Write> {
    writer: W,
}

impl EventLog<BufWriter<File>> {
    /// Opens (appending) a log file at `path`.
    pub fn to_file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> EventLog<W> {
    /// Creates a log over any writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> Plugin for EventLog<W> {
    fn name(&self) -> &str {
        "event-log"
    }

    fn subscriptions(&self) -> Vec<EventKind> {
        EventKind::ALL.to_vec()
    }

    fn handle(&mut self, event: &Event, _ctx: &mut RunContext) -> Result<(), HandlerError> {
        let record = EventRecord {
            timestamp: Utc::now().to_rfc3339(),
            event,
        };
        let line = serde_json::to_string(&record)
            .map_err(|err| HandlerError::recoverable(format!("serialize event: {err}")))?;
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .map_err(|err| HandlerError::recoverable(format!("write event log: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scena_proto::{RunSummary, ScenarioId, ScenarioStatus};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Writer handle that stays readable after the plugin takes ownership.
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_events_are_logged_one_json_line_each() {
        let buf = SharedBuf::default();
        let mut plugin = EventLog::new(buf.clone());
        let mut ctx = RunContext::new();

        plugin
            .handle(&Event::RunStarted { scenarios: 2 }, &mut ctx)
            .unwrap();
        plugin
            .handle(
                &Event::ScenarioFinished {
                    scenario: ScenarioId(0),
                    status: ScenarioStatus::Passed,
                    reason: None,
                },
                &mut ctx,
            )
            .unwrap();
        plugin
            .handle(
                &Event::RunFinished {
                    summary: RunSummary::default(),
                },
                &mut ctx,
            )
            .unwrap();

        let raw = buf.0.borrow().clone();
        let lines: Vec<serde_json::Value> = String::from_utf8(raw)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["kind"], "run-started");
        assert_eq!(lines[0]["scenarios"], 2);
        assert!(lines[0]["timestamp"].is_string());
        assert_eq!(lines[1]["kind"], "scenario-finished");
        assert_eq!(lines[1]["status"], "passed");
        assert_eq!(lines[2]["kind"], "run-finished");
    }

    #[test]
    fn test_to_file_appends() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("events.jsonl");
        let mut ctx = RunContext::new();

        for _ in 0..2 {
            let mut plugin = EventLog::to_file(&path).unwrap();
            plugin
                .handle(&Event::RunStarted { scenarios: 0 }, &mut ctx)
                .unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
