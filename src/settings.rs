//! Dashboard settings with an optional JSON override file.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "dashboard_settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// CSV loaded at startup.
    pub source_path: PathBuf,
    /// Cities pre-selected when the user has made no choice.
    pub default_city_count: usize,
    /// Rows shown in the AQI table.
    pub preview_rows: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("air_quality_data.csv"),
            default_city_count: 3,
            preview_rows: 10,
        }
    }
}

impl DashboardSettings {
    /// Read settings from `path`, falling back to defaults when the file is absent or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };

        match serde_json::from_str(&content) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Ignoring invalid settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
