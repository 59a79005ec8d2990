//! Configuration types for odomon
//!
//! Defines:
//! - `Settings` - Per-component settings from `.odomon/config.toml`
//! - Related sub-types and enums

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use odomon_core::{ProgramState, StatusRules, DEFAULT_PROGRAM_NAME};

/// Per-component settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub odo: OdoSettings,

    #[serde(default)]
    pub status: StatusSettings,

    #[serde(default)]
    pub output: OutputSettings,
}

impl Settings {
    /// Reconciler rules for this component
    pub fn status_rules(&self) -> StatusRules {
        StatusRules {
            program_name: self.status.program.clone(),
            reset_program_state: self.status.reset_program_state,
        }
    }
}

/// How odo is invoked
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OdoSettings {
    /// odo executable, or a directory containing it
    #[serde(default)]
    pub binary: Option<PathBuf>,

    /// Exported as `KUBECONFIG` to every odo process
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,
}

/// Status reconciliation settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StatusSettings {
    /// Supervisord program that has to be running
    #[serde(default = "default_program")]
    pub program: String,

    /// Program state assumed after an error or when the pod goes away
    #[serde(default = "default_reset_program_state")]
    pub reset_program_state: ProgramState,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            reset_program_state: default_reset_program_state(),
        }
    }
}

fn default_program() -> String {
    DEFAULT_PROGRAM_NAME.to_string()
}

fn default_reset_program_state() -> ProgramState {
    ProgramState::NotRunning
}

/// Console output settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,

    /// Also print every decoded odo event
    #[serde(default)]
    pub debug_events: bool,
}

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line (NDJSON)
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
