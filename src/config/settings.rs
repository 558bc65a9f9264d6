//! User settings for tailor-backup
//!
//! Manages the import size limit and export/restore preferences.

use serde::{Deserialize, Serialize};

use super::paths::TailorPaths;
use crate::error::TailorError;

/// Hard ceiling on snapshot input size (10 MiB)
pub const MAX_IMPORT_BYTES: u64 = 10 * 1024 * 1024;

/// User settings for tailor-backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Largest snapshot file accepted by restore, in bytes
    #[serde(default = "default_max_import_bytes")]
    pub max_import_bytes: u64,

    /// Whether exported snapshots are pretty-printed
    #[serde(default = "default_true")]
    pub pretty_export: bool,

    /// Whether the current dataset is exported before a destructive restore
    #[serde(default = "default_true")]
    pub safety_backup_before_restore: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_max_import_bytes() -> u64 {
    MAX_IMPORT_BYTES
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            max_import_bytes: default_max_import_bytes(),
            pretty_export: true,
            safety_backup_before_restore: true,
        }
    }
}

impl Settings {
    /// Effective import limit; never above the hard ceiling
    pub fn import_limit(&self) -> u64 {
        self.max_import_bytes.min(MAX_IMPORT_BYTES)
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &TailorPaths) -> Result<Self, TailorError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| TailorError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                TailorError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TailorPaths) -> Result<(), TailorError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| TailorError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| TailorError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
