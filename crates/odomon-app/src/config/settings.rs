//! Settings loading from `.odomon/config.toml`

use std::path::Path;

use odomon_core::prelude::*;

use super::types::Settings;

/// Directory holding odomon's per-component files
pub const ODOMON_DIR: &str = ".odomon";

pub const CONFIG_FILENAME: &str = "config.toml";

/// Load settings from .odomon/config.toml
///
/// Returns default settings if file doesn't exist or can't be parsed.
pub fn load_settings(context_path: &Path) -> Settings {
    let config_path = context_path.join(ODOMON_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}
