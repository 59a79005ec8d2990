//! # odomon-app - Session Orchestration
//!
//! Ties odomon together: loads per-component settings, runs a monitoring
//! session against odo and reports what it sees.
//!
//! Depends on [`odomon_core`] for domain types and [`odomon_daemon`] for odo
//! process management and event decoding.
//!
//! ## Public API
//!
//! ### Configuration (`config`)
//! - [`Settings`] - Contents of `.odomon/config.toml`
//! - [`load_settings()`] - Load settings, falling back to defaults
//! - [`OutputFormat`] - Text or NDJSON console output
//!
//! ### Sessions (`monitor`)
//! - [`run_status()`] - Follow component status and report changes
//! - [`run_push()`] - Push the component and show odo's events
//! - [`run_logs()`] - Echo the component's application log
//! - [`SessionSummary`] - Counts and exit code of a finished session
//!
//! ### Reporting (`reporter`)
//! - [`Reporter`] - Output sink trait
//! - [`TextReporter`], [`JsonReporter`] - Console implementations

pub mod config;
pub mod monitor;
pub mod reporter;

pub use config::{load_settings, OutputFormat, Settings};
pub use monitor::{follow_status, run_logs, run_push, run_status, MonitorOptions, SessionSummary};
pub use reporter::{stdout_reporter, JsonReporter, OutputEvent, Reporter, TextReporter};
