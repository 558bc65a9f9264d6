//! Backup and restore for the tailoring shop dataset
//!
//! # Pipeline
//!
//! Export reads every customer and order through the
//! [`RecordStore`](crate::storage::RecordStore) and produces a versioned
//! [`Snapshot`]. Restore runs the reverse path as a sequence of stages:
//!
//! - `validate`: untyped JSON to a typed snapshot, or a list of violations
//! - `check_integrity`: every order must reference a customer in the snapshot
//! - `sanitize`: trim, truncate, and fill defaults
//! - `apply`: wipe the store, then reinsert the sanitized records
//!
//! The first three are pure functions. Only `apply` touches the store, and a
//! restore is always fully destructive.
//!
//! # Snapshot format
//!
//! ```json
//! {
//!   "formatVersion": "1.0",
//!   "createdAt": "2024-01-01T00:00:00Z",
//!   "customers": [{"id": "c1", "name": "Ali"}],
//!   "orders": [{"id": "o1", "customerId": "c1", "orderNumber": "20240101-001"}]
//! }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use tailor_backup::backup::{export_to, FileSink, Restorer};
//!
//! let mut sink = FileSink::in_dir(paths.backup_dir());
//! export_to(&storage, &mut sink, true)?;
//!
//! let summary = Restorer::new().restore_file(path, &storage)?;
//! println!("{} customers restored", summary.customers_restored);
//! ```

pub mod export;
pub mod integrity;
mod manager;
pub mod restore;
pub mod sanitize;
pub mod snapshot;
pub mod validate;

pub use export::{
    default_file_name, export_snapshot, export_to, snapshot_to_bytes, ExportedSnapshot, FileSink,
    ShareSink, SnapshotSink,
};
pub use integrity::{check_integrity, Orphan, OrphanList};
pub use manager::{BackupInfo, BackupManager};
pub use restore::{
    apply, CheckReport, PreparedRestore, RestoreError, RestoreProgress, RestoreStage,
    RestoreSummary, Restorer,
};
pub use sanitize::{sanitize, sanitize_at, SanitizedRecords};
pub use snapshot::{CustomerRecord, OrderRecord, Snapshot, FORMAT_VERSION};
pub use validate::{validate, Violation, ViolationList, MAX_REPORTED_VIOLATIONS};
