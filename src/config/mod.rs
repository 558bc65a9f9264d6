//! Configuration module for tailor-backup
//!
//! This module provides configuration management including:
//! - Platform config directory resolution
//! - User settings persistence (import size limit, export style)

pub mod paths;
pub mod settings;

pub use paths::TailorPaths;
pub use settings::Settings;
