//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // odo Process Errors
    // ─────────────────────────────────────────────────────────────
    #[error("odo binary not found: {path}. Pass --odo or put 'odo' in your PATH.")]
    OdoNotFound { path: PathBuf },

    #[error("Component context directory not found: {path}")]
    NoContext { path: PathBuf },

    #[error("Failed to spawn odo process: {reason}")]
    ProcessSpawn { reason: String },

    #[error("odo process error: {message}")]
    Process { message: String },

    // ─────────────────────────────────────────────────────────────
    // Event Stream Errors
    // ─────────────────────────────────────────────────────────────
    /// A well-formed event line with no recognizable event in it.
    #[error("odo event line carried no known event: {line}")]
    EmptyEvent { line: String },

    /// A well-formed event line with more than one event in it.
    #[error("odo event line carried several events ({kinds}): {line}")]
    AmbiguousEvent { kinds: String, line: String },

    // ─────────────────────────────────────────────────────────────
    // Output Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Output error: {message}")]
    Output { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn odo_not_found(path: impl Into<PathBuf>) -> Self {
        Self::OdoNotFound { path: path.into() }
    }

    pub fn no_context(path: impl Into<PathBuf>) -> Self {
        Self::NoContext { path: path.into() }
    }

    pub fn process_spawn(reason: impl Into<String>) -> Self {
        Self::ProcessSpawn {
            reason: reason.into(),
        }
    }

    pub fn process(message: impl Into<String>) -> Self {
        Self::Process {
            message: message.into(),
        }
    }

    pub fn empty_event(line: impl Into<String>) -> Self {
        Self::EmptyEvent { line: line.into() }
    }

    pub fn ambiguous_event(kinds: &[&str], line: impl Into<String>) -> Self {
        Self::AmbiguousEvent {
            kinds: kinds.join(", "),
            line: line.into(),
        }
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Check if this error should end the monitoring session
    ///
    /// Event-contract violations are fatal: the external tool promises exactly
    /// one event per JSON line.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::OdoNotFound { .. }
                | Error::NoContext { .. }
                | Error::ProcessSpawn { .. }
                | Error::EmptyEvent { .. }
                | Error::AmbiguousEvent { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
