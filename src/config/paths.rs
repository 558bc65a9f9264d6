//! Path management for tailor-backup
//!
//! Provides path resolution for configuration, record data, and snapshots.
//!
//! ## Path Resolution Order
//!
//! 1. `TAILOR_DATA_DIR` environment variable (if set)
//! 2. The platform config directory joined with `tailor-backup`
//!    (`~/.config/tailor-backup` on Linux, `%APPDATA%\tailor-backup` on Windows)

use std::path::PathBuf;

use crate::error::TailorError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "TAILOR_DATA_DIR";

/// Manages all paths used by tailor-backup
#[derive(Debug, Clone)]
pub struct TailorPaths {
    /// Base directory for all tailor-backup data
    base_dir: PathBuf,
}

impl TailorPaths {
    /// Create a new TailorPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home or config directory can be determined.
    pub fn new() -> Result<Self, TailorError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create TailorPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory holding the record files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the directory where snapshots are saved by default
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to customers.json
    pub fn customers_file(&self) -> PathBuf {
        self.data_dir().join("customers.json")
    }

    /// Get the path to orders.json
    pub fn orders_file(&self) -> PathBuf {
        self.data_dir().join("orders.json")
    }

    /// Ensure the base, data, and backup directories exist
    pub fn ensure_directories(&self) -> Result<(), TailorError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| TailorError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| TailorError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir())
            .map_err(|e| TailorError::Io(format!("Failed to create backup directory: {}", e)))?;

        Ok(())
    }
}

fn resolve_default_path() -> Result<PathBuf, TailorError> {
    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| TailorError::Config("Could not determine home directory".into()))?;
    Ok(dirs.config_dir().join("tailor-backup"))
}
