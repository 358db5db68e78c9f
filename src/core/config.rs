use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::core::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extension_type: String,         // Value expected after TYPE in ATTACH
    pub default_schema: String,         // Implicit schema of a single-schema root
    pub log_dir_name: String,           // Directory marking a table root
    pub skip_hidden: bool,              // Ignore '.' and '_' prefixed directories
    pub pin_snapshot_by_default: bool,  // PIN_SNAPSHOT when the option is absent
}

impl Default for Config {
    fn default() -> Self {
        Config {
            extension_type: "delta_classic".to_string(),
            default_schema: "main".to_string(),
            log_dir_name: "_delta_log".to_string(),
            skip_hidden: true,
            pin_snapshot_by_default: false,
        }
    }
}

impl Config {
    /// Missing keys fall back to their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        if name.is_empty() {
            return true;
        }
        self.skip_hidden && (name.starts_with('.') || name.starts_with('_'))
    }
}
