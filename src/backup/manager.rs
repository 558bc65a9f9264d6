//! Saved snapshot management
//!
//! Snapshots saved into the backup directory are named
//! `tailor-backup-YYYYMMDD-HHMMSS.json`; the export time is read back from
//! the file name when listing. A second snapshot taken within the same second
//! gets a `-N` suffix (`tailor-backup-YYYYMMDD-HHMMSS-1.json`) instead of
//! replacing the first.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::config::paths::TailorPaths;
use crate::error::{TailorError, TailorResult};
use crate::storage::RecordStore;

use super::export::{export_to, FileSink};

const FILE_PREFIX: &str = "tailor-backup-";
const FILE_SUFFIX: &str = ".json";
const STAMP_LEN: usize = "YYYYMMDD-HHMMSS".len();

/// Metadata about a saved snapshot
#[derive(Debug, Clone)]
pub struct BackupInfo {
    /// Snapshot filename
    pub filename: String,
    /// Full path to the snapshot
    pub path: PathBuf,
    /// Export time taken from the filename
    pub created_at: DateTime<Utc>,
    /// Same-second suffix, 0 when absent
    pub sequence: u32,
    /// Size in bytes
    pub size_bytes: u64,
}

/// Saves and lists snapshots in the backup directory
pub struct BackupManager {
    backup_dir: PathBuf,
}

impl BackupManager {
    pub fn new(paths: &TailorPaths) -> Self {
        Self {
            backup_dir: paths.backup_dir(),
        }
    }

    /// Export the store into the backup directory
    ///
    /// Returns the path of the written snapshot.
    pub fn create_backup<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        pretty: bool,
    ) -> TailorResult<PathBuf> {
        let mut sink = FileSink::in_dir(&self.backup_dir);
        let export = export_to(store, &mut sink, pretty)?;
        Ok(sink
            .written()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.backup_dir.join(&export.file_name)))
    }

    /// List saved snapshots, newest first
    pub fn list_backups(&self) -> TailorResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backup_dir).map_err(|e| {
            TailorError::Io(format!("Failed to read backup directory: {}", e))
        })? {
            let entry = entry
                .map_err(|e| TailorError::Io(format!("Failed to read directory entry: {}", e)))?;

            if let Some(info) = parse_backup_info(&entry.path()) {
                backups.push(info);
            }
        }

        backups.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });

        Ok(backups)
    }

    /// Get the most recent snapshot
    pub fn get_latest_backup(&self) -> TailorResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }
}

fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().into_owned();
    let stem = filename.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    let (created_at, sequence) = parse_backup_stem(stem)?;
    let metadata = fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        sequence,
        size_bytes: metadata.len(),
    })
}

/// Parse `YYYYMMDD-HHMMSS` with an optional `-N` suffix
fn parse_backup_stem(stem: &str) -> Option<(DateTime<Utc>, u32)> {
    let stamp = stem.get(..STAMP_LEN)?;
    let sequence = match &stem[STAMP_LEN..] {
        "" => 0,
        rest => {
            let digits = rest.strip_prefix('-')?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok()?
        }
    };
    Some((parse_backup_timestamp(stamp)?, sequence))
}

/// Parse `YYYYMMDD-HHMMSS`
fn parse_backup_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(stamp, "%Y%m%d-%H%M%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}
