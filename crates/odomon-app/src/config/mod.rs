//! Configuration file parsing for odomon
//!
//! Supports:
//! - `.odomon/config.toml` in the component directory

pub mod settings;
pub mod types;

pub use settings::{load_settings, CONFIG_FILENAME, ODOMON_DIR};
pub use types::*;
