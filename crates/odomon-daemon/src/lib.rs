//! # odomon-daemon - odo Process Management
//!
//! Runs odo child processes, turns their output pipes into ordered line
//! streams and decodes odo's machine-readable (`-o json`) output.
//!
//! Depends on [`odomon_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Line Streams
//! - [`LineStream`] - Ordered lines from one or more blocking byte sources
//!
//! ### Protocol Parsing
//! - [`parse_line()`] - Decode one line of odo output into an event or text
//! - [`ParsedLine`] - Event / text / blank
//!
//! ### Process Management
//! - [`OdoProcess`] - Spawn `odo component status`, `odo push`, `odo log`
//! - [`resolve_odo_binary()`] - Locate the odo executable
//! - [`LogWatcher`] - Follow the component's application log

pub mod bridge;
pub mod log_watcher;
pub mod process;
pub mod protocol;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

// Public API re-exports
pub use bridge::LineStream;
pub use log_watcher::{LogStream, LogWatcher};
pub use process::{resolve_odo_binary, OdoProcess, LOG_ARGS, PUSH_ARGS, STATUS_ARGS};
pub use protocol::{parse_line, ParsedLine};
