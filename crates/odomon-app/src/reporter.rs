//! Console reporting
//!
//! A [`Reporter`] receives everything a monitoring session wants the user to
//! see. [`TextReporter`] prints human-readable lines; [`JsonReporter`] prints
//! one JSON object per line for scripts:
//!
//! ```json
//! {"event":"passthrough","line":"Validation","timestamp":1704700001000}
//! {"event":"status_changed","text":"Running","phase":"running","status":{...},"timestamp":1704700002000}
//! {"event":"process_exited","code":0,"timestamp":1704700003000}
//! ```

use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;

use odomon_core::prelude::*;
use odomon_core::{ComponentStatus, Event, StatusChange, StatusPhase};
use odomon_daemon::LogStream;

use crate::config::OutputFormat;

/// Sink for session output
pub trait Reporter {
    /// The component status changed visibly
    fn status_changed(&mut self, change: &StatusChange) -> Result<()>;

    /// A line of odo output that is not an event
    fn passthrough(&mut self, line: &str) -> Result<()>;

    /// A decoded odo event shown as is
    fn odo_event(&mut self, event: &Event) -> Result<()>;

    /// A line of the component's application log
    fn log_line(&mut self, stream: LogStream, line: &str) -> Result<()>;

    /// odo exited and its output has been fully consumed
    fn process_exited(&mut self, code: Option<i32>) -> Result<()>;
}

/// Reporter for the configured format, writing to stdout
pub fn stdout_reporter(format: OutputFormat) -> Box<dyn Reporter + Send> {
    match format {
        OutputFormat::Text => Box::new(TextReporter::new(io::stdout())),
        OutputFormat::Json => Box::new(JsonReporter::new(io::stdout())),
    }
}

// ─────────────────────────────────────────────────────────
// Text
// ─────────────────────────────────────────────────────────

/// Human-readable output
pub struct TextReporter<W: Write> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) -> Result<()> {
        writeln!(self.out, "{}", text)
            .and_then(|_| self.out.flush())
            .map_err(|e| Error::output(format!("Failed to write to console: {}", e)))
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn status_changed(&mut self, change: &StatusChange) -> Result<()> {
        self.line(format_args!("- Status: {}", change))
    }

    fn passthrough(&mut self, line: &str) -> Result<()> {
        self.line(format_args!("> {}", line))
    }

    fn odo_event(&mut self, event: &Event) -> Result<()> {
        self.line(format_args!("* {}: {}", event.kind(), event.summary()))
    }

    fn log_line(&mut self, stream: LogStream, line: &str) -> Result<()> {
        self.line(format_args!("{} {}", stream.prefix(), line))
    }

    fn process_exited(&mut self, code: Option<i32>) -> Result<()> {
        debug!("odo exit code: {:?}", code);
        self.line(format_args!("Process terminated."))
    }
}

// ─────────────────────────────────────────────────────────
// NDJSON
// ─────────────────────────────────────────────────────────

/// Events emitted in JSON mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OutputEvent {
    StatusChanged {
        text: String,
        phase: StatusPhase,
        status: ComponentStatus,
        timestamp: i64,
    },

    Passthrough { line: String, timestamp: i64 },

    OdoEvent {
        kind: String,
        summary: String,
        timestamp: i64,
    },

    LogLine {
        stream: String,
        line: String,
        timestamp: i64,
    },

    ProcessExited { code: Option<i32>, timestamp: i64 },
}

impl OutputEvent {
    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    pub fn status_changed(change: &StatusChange) -> Self {
        Self::StatusChanged {
            text: change.text.clone(),
            phase: change.current.phase(),
            status: change.current.clone(),
            timestamp: Self::now(),
        }
    }

    pub fn passthrough(line: &str) -> Self {
        Self::Passthrough {
            line: line.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn odo_event(event: &Event) -> Self {
        Self::OdoEvent {
            kind: event.kind().to_string(),
            summary: event.summary(),
            timestamp: Self::now(),
        }
    }

    pub fn log_line(stream: LogStream, line: &str) -> Self {
        Self::LogLine {
            stream: stream.name().to_string(),
            line: line.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn process_exited(code: Option<i32>) -> Self {
        Self::ProcessExited {
            code,
            timestamp: Self::now(),
        }
    }
}

/// NDJSON output
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: OutputEvent) -> Result<()> {
        let json = serde_json::to_string(&event)?;
        writeln!(self.out, "{}", json)
            .and_then(|_| self.out.flush())
            .map_err(|e| Error::output(format!("Failed to write JSON event: {}", e)))
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn status_changed(&mut self, change: &StatusChange) -> Result<()> {
        self.emit(OutputEvent::status_changed(change))
    }

    fn passthrough(&mut self, line: &str) -> Result<()> {
        self.emit(OutputEvent::passthrough(line))
    }

    fn odo_event(&mut self, event: &Event) -> Result<()> {
        self.emit(OutputEvent::odo_event(event))
    }

    fn log_line(&mut self, stream: LogStream, line: &str) -> Result<()> {
        self.emit(OutputEvent::log_line(stream, line))
    }

    fn process_exited(&mut self, code: Option<i32>) -> Result<()> {
        self.emit(OutputEvent::process_exited(code))
    }
}
