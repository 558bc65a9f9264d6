//! tailor-backup - backup and restore for a tailoring shop's records
//!
//! This library exports every customer and order from a record store into a
//! versioned JSON snapshot, and restores a snapshot by validating it
//! completely before replacing the store's contents.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `logging`: `tracing` subscriber setup
//! - `models`: Customers, orders, and their ids
//! - `storage`: The record store trait and its JSON file implementation
//! - `backup`: Snapshot export, validation, and restore
//! - `cli`: Command handlers for the `tailor` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use tailor_backup::backup::Restorer;
//! use tailor_backup::config::paths::TailorPaths;
//! use tailor_backup::storage::Storage;
//!
//! let mut storage = Storage::new(TailorPaths::new()?)?;
//! storage.load_all()?;
//! let summary = Restorer::new().restore_file(path, &storage)?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod storage;

pub use error::{TailorError, TailorResult};
