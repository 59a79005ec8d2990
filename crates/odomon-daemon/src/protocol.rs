//! odo machine-output protocol handling
//!
//! odo's `-o json` mode prints one JSON object per line. Each object wraps a
//! single event under a key naming its kind:
//!
//! ```json
//! {"kubernetesPodStatus":{"pods":[...],"timestamp":"1593440223.123"}}
//! ```
//!
//! Anything that is not such an object (progress spinners, warnings, plain
//! errors printed by odo before it switches to JSON) is passed through as text.

use serde::Deserialize;

use odomon_core::events::{
    CommandExecutionBegin, CommandExecutionComplete, ContainerStatus, Event, KubernetesPodStatus,
    LogText, ReportError, SupervisordStatus, UrlReachable,
};
use odomon_core::prelude::*;

/// What one line of odo output turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// A machine-readable event
    Event(Event),
    /// Free-form text to echo unchanged
    Text(String),
    /// Nothing but whitespace
    Empty,
}

/// Raw wire wrapper: every event kind is an optional member
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEventWrapper {
    dev_file_command_execution_begin: Option<CommandExecutionBegin>,
    dev_file_command_execution_complete: Option<CommandExecutionComplete>,
    report_error: Option<ReportError>,
    log_text: Option<LogText>,
    supervisord_status: Option<SupervisordStatus>,
    container_status: Option<ContainerStatus>,
    url_reachable: Option<UrlReachable>,
    kubernetes_pod_status: Option<KubernetesPodStatus>,
}

impl RawEventWrapper {
    /// Parse a JSON string into a RawEventWrapper
    pub fn parse(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }

    /// All populated members as events, in wrapper order
    fn into_events(self) -> Vec<Event> {
        [
            self.dev_file_command_execution_begin
                .map(Event::CommandExecutionBegin),
            self.dev_file_command_execution_complete
                .map(Event::CommandExecutionComplete),
            self.report_error.map(Event::ReportError),
            self.log_text.map(Event::LogText),
            self.supervisord_status.map(Event::SupervisordStatus),
            self.container_status.map(Event::ContainerStatus),
            self.url_reachable.map(Event::UrlReachable),
            self.kubernetes_pod_status.map(Event::KubernetesPodStatus),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

// ─────────────────────────────────────────────────────────
// Line Parsing (Free Functions)
// ─────────────────────────────────────────────────────────

/// Parses one line of odo machine output.
///
/// # Returns
/// * `Ok(ParsedLine::Event)` for a wrapper carrying exactly one event
/// * `Ok(ParsedLine::Text)` for anything that is not a wrapper object
/// * `Ok(ParsedLine::Empty)` for blank lines
/// * `Err(Error::EmptyEvent)` / `Err(Error::AmbiguousEvent)` for a wrapper
///   carrying zero or several events; odo guarantees exactly one, so these
///   are contract violations and not recoverable
pub fn parse_line(line: &str) -> Result<ParsedLine> {
    if line.trim().is_empty() {
        return Ok(ParsedLine::Empty);
    }

    let Some(wrapper) = RawEventWrapper::parse(line) else {
        return Ok(ParsedLine::Text(line.to_string()));
    };

    let mut events = wrapper.into_events();
    match events.len() {
        0 => Err(Error::empty_event(line)),
        1 => Ok(ParsedLine::Event(events.remove(0))),
        _ => {
            let kinds: Vec<&str> = events.iter().map(Event::kind).collect();
            Err(Error::ambiguous_event(&kinds, line))
        }
    }
}
