//! # odomon-core - Core Domain Types
//!
//! Foundation crate for odomon. Provides the odo event model, the component
//! status reconciler, error handling and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Events (`events`)
//! - [`Event`] - One decoded line of odo's `-o json` output
//! - [`KubernetesPodStatus`], [`PodEntry`], [`ContainerEntry`] - Pod/container state
//! - [`SupervisordStatus`], [`ProgramStatus`] - Programs inside the container
//!
//! ### Status (`status`)
//! - [`ComponentStatus`] - Immutable snapshot of component health
//! - [`reconcile()`] - Pure (snapshot, event) -> snapshot reducer
//! - [`StatusTracker`] - Per-session snapshot owner that reports changes
//! - [`StatusRules`] - Program name and reset policy
//!
//! ### Context (`context`)
//! - [`OdoContext`] - odo binary, component directory, kubeconfig
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum; `is_fatal()` marks session-ending errors
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use odomon_core::prelude::*;
//! ```

pub mod context;
pub mod error;
pub mod events;
pub mod logging;
pub mod status;

/// Prelude for common imports used throughout all odomon crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use context::OdoContext;
pub use error::{Error, Result, ResultExt};
pub use events::{
    CommandExecutionBegin, CommandExecutionComplete, ContainerEntry, ContainerState,
    ContainerStateRunning, ContainerStateTerminated, ContainerStateWaiting, ContainerStatus,
    Event, KubernetesPodStatus, LogText, PodEntry, ProgramStatus, ReportError,
    SupervisordStatus, UrlReachable, POD_PHASE_RUNNING, PROGRAM_STATUS_RUNNING,
};
pub use status::{
    reconcile, ComponentStatus, ProgramState, StatusChange, StatusPhase, StatusRules,
    StatusTracker, DEFAULT_PROGRAM_NAME,
};
