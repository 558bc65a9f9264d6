//! Destructive restore
//!
//! A restore runs in fixed stages: Load, Parse, Validate, CheckIntegrity,
//! Sanitize, Wipe, Reinsert. Everything up to and including Sanitize is pure
//! and happens before the first store call, so any input error leaves the
//! store untouched. Wipe and Reinsert are not atomic; a store failure there is
//! reported together with how far the restore got.

use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::settings::{Settings, MAX_IMPORT_BYTES};
use crate::error::TailorError;
use crate::storage::RecordStore;

use super::integrity::{check_integrity, OrphanList};
use super::sanitize::{sanitize, SanitizedRecords};
use super::validate::{validate, ViolationList};

/// File extension a snapshot file must carry
pub const SNAPSHOT_EXTENSION: &str = "json";

/// Why a restore did not complete
#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("Backup is {size} bytes, larger than the {limit} byte limit")]
    SizeExceeded { size: u64, limit: u64 },

    #[error("Not a backup file: {file_name} (expected a .json file)")]
    WrongFileType { file_name: String },

    #[error("Backup could not be read: {0}")]
    MalformedInput(String),

    #[error("Backup does not match the snapshot format: {0}")]
    SchemaViolation(ViolationList),

    #[error("Backup is inconsistent: {0}")]
    OrphanReference(OrphanList),

    #[error("Record store failed during {}: {cause} ({})", .progress.stage, .progress)]
    StoreError {
        #[source]
        cause: TailorError,
        progress: RestoreProgress,
    },
}

impl RestoreError {
    /// True when the failure was detected before any store call
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::StoreError { .. })
    }
}

/// Restore pipeline stages, in execution order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum RestoreStage {
    #[default]
    Load,
    Parse,
    Validate,
    CheckIntegrity,
    Sanitize,
    Wipe,
    Reinsert,
    Done,
}

impl fmt::Display for RestoreStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Parse => "parse",
            Self::Validate => "validate",
            Self::CheckIntegrity => "integrity check",
            Self::Sanitize => "sanitize",
            Self::Wipe => "wipe",
            Self::Reinsert => "reinsert",
            Self::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// How far the destructive stages got
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreProgress {
    pub stage: RestoreStage,
    pub orders_deleted: usize,
    pub customers_deleted: usize,
    pub customers_created: usize,
    pub orders_created: usize,
}

impl RestoreProgress {
    /// True if the store has been modified
    pub fn store_modified(&self) -> bool {
        self.orders_deleted
            + self.customers_deleted
            + self.customers_created
            + self.orders_created
            > 0
    }
}

impl fmt::Display for RestoreProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "deleted {} orders and {} customers, created {} customers and {} orders",
            self.orders_deleted, self.customers_deleted, self.customers_created, self.orders_created
        )
    }
}

/// Result of a completed restore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreSummary {
    pub customers_restored: usize,
    pub orders_restored: usize,
}

/// What a snapshot would restore, as found by a dry run
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub format_version: String,
    pub created_at: DateTime<Utc>,
    pub customer_count: usize,
    pub order_count: usize,
}

/// A snapshot that passed every non-destructive stage
#[derive(Debug, Clone)]
pub struct PreparedRestore {
    pub report: CheckReport,
    pub records: SanitizedRecords,
}

/// Runs restores against a record store
#[derive(Debug, Clone)]
pub struct Restorer {
    max_bytes: u64,
}

impl Default for Restorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Restorer {
    /// Restorer with the default 10 MiB input limit
    pub fn new() -> Self {
        Self {
            max_bytes: MAX_IMPORT_BYTES,
        }
    }

    /// Restorer with a lower input limit; values above the hard cap are clamped
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self {
            max_bytes: max_bytes.min(MAX_IMPORT_BYTES),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_max_bytes(settings.import_limit())
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Load a snapshot file, enforcing the extension and size gates
    ///
    /// The extension is checked before the file is touched; the size is
    /// checked from metadata and again while reading.
    pub fn load_file(&self, path: &Path) -> Result<Vec<u8>, RestoreError> {
        let file_name = display_name(path);
        check_extension(&file_name)?;

        let size = fs::metadata(path)
            .map_err(|e| RestoreError::MalformedInput(format!("{}: {}", file_name, e)))?
            .len();
        self.check_size(size)?;

        let file = File::open(path)
            .map_err(|e| RestoreError::MalformedInput(format!("{}: {}", file_name, e)))?;
        let mut bytes = Vec::new();
        file.take(self.max_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| RestoreError::MalformedInput(format!("{}: {}", file_name, e)))?;
        self.check_size(bytes.len() as u64)?;

        debug!(file = %file_name, bytes = bytes.len(), "snapshot loaded");
        Ok(bytes)
    }

    /// Run every non-destructive stage on in-memory input
    pub fn prepare_bytes(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<PreparedRestore, RestoreError> {
        check_extension(file_name)?;
        self.check_size(bytes.len() as u64)?;
        prepare(bytes)
    }

    /// Run every non-destructive stage on a snapshot file
    pub fn prepare_file(&self, path: &Path) -> Result<PreparedRestore, RestoreError> {
        let bytes = self.load_file(path)?;
        prepare(&bytes)
    }

    /// Dry run: report what a restore of `path` would do
    pub fn check_file(&self, path: &Path) -> Result<CheckReport, RestoreError> {
        self.prepare_file(path).map(|prepared| prepared.report)
    }

    /// Dry run on in-memory input
    pub fn check_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<CheckReport, RestoreError> {
        self.prepare_bytes(file_name, bytes)
            .map(|prepared| prepared.report)
    }

    /// Replace the store's contents with the snapshot in `path`
    pub fn restore_file<S: RecordStore + ?Sized>(
        &self,
        path: &Path,
        store: &S,
    ) -> Result<RestoreSummary, RestoreError> {
        let prepared = self.prepare_file(path).map_err(log_rejection)?;
        apply(store, prepared.records)
    }

    /// Replace the store's contents with an in-memory snapshot
    pub fn restore_bytes<S: RecordStore + ?Sized>(
        &self,
        file_name: &str,
        bytes: &[u8],
        store: &S,
    ) -> Result<RestoreSummary, RestoreError> {
        let prepared = self.prepare_bytes(file_name, bytes).map_err(log_rejection)?;
        apply(store, prepared.records)
    }

    fn check_size(&self, size: u64) -> Result<(), RestoreError> {
        if size > self.max_bytes {
            return Err(RestoreError::SizeExceeded {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn check_extension(file_name: &str) -> Result<(), RestoreError> {
    let matches = Path::new(file_name)
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case(SNAPSHOT_EXTENSION));
    if matches {
        Ok(())
    } else {
        Err(RestoreError::WrongFileType {
            file_name: file_name.to_string(),
        })
    }
}

fn log_rejection(err: RestoreError) -> RestoreError {
    warn!(reason = %err, "restore rejected, store untouched");
    err
}

/// Parse, Validate, CheckIntegrity, Sanitize
fn prepare(bytes: &[u8]) -> Result<PreparedRestore, RestoreError> {
    let raw: Value = serde_json::from_slice(bytes)
        .map_err(|e| RestoreError::MalformedInput(e.to_string()))?;
    debug!(stage = %RestoreStage::Parse, "snapshot parsed");

    let snapshot = validate(&raw).map_err(RestoreError::SchemaViolation)?;
    debug!(stage = %RestoreStage::Validate, "snapshot validated");

    let snapshot = check_integrity(snapshot).map_err(RestoreError::OrphanReference)?;
    debug!(stage = %RestoreStage::CheckIntegrity, "references resolved");

    let report = CheckReport {
        format_version: snapshot.format_version.clone(),
        created_at: snapshot.created_at,
        customer_count: snapshot.customers.len(),
        order_count: snapshot.orders.len(),
    };
    let records = sanitize(snapshot);
    debug!(stage = %RestoreStage::Sanitize, "records sanitized");

    Ok(PreparedRestore { report, records })
}

/// Wipe the store, then insert the prepared records
///
/// Orders are deleted before customers and customers are created before
/// orders. Store calls are issued one at a time.
pub fn apply<S: RecordStore + ?Sized>(
    store: &S,
    records: SanitizedRecords,
) -> Result<RestoreSummary, RestoreError> {
    let mut progress = RestoreProgress::default();

    match run_destructive(store, records, &mut progress) {
        Ok(summary) => {
            info!(
                customers = summary.customers_restored,
                orders = summary.orders_restored,
                "restore complete"
            );
            Ok(summary)
        }
        Err(cause) => {
            error!(
                stage = %progress.stage,
                orders_deleted = progress.orders_deleted,
                customers_deleted = progress.customers_deleted,
                customers_created = progress.customers_created,
                orders_created = progress.orders_created,
                error = %cause,
                "restore failed part way, store may be partially restored"
            );
            Err(RestoreError::StoreError { cause, progress })
        }
    }
}

fn run_destructive<S: RecordStore + ?Sized>(
    store: &S,
    records: SanitizedRecords,
    progress: &mut RestoreProgress,
) -> Result<RestoreSummary, TailorError> {
    progress.stage = RestoreStage::Wipe;
    for order in store.list_orders()? {
        store.delete_order(&order.id)?;
        progress.orders_deleted += 1;
    }
    for customer in store.list_customers()? {
        store.delete_customer(&customer.id)?;
        progress.customers_deleted += 1;
    }
    info!(
        orders = progress.orders_deleted,
        customers = progress.customers_deleted,
        "existing records removed"
    );

    progress.stage = RestoreStage::Reinsert;
    for customer in &records.customers {
        store.create_customer(customer)?;
        progress.customers_created += 1;
    }
    for order in &records.orders {
        store.create_order(order)?;
        progress.orders_created += 1;
    }

    progress.stage = RestoreStage::Done;
    Ok(RestoreSummary {
        customers_restored: progress.customers_created,
        orders_restored: progress.orders_created,
    })
}
