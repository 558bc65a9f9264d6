//! Backup CLI commands
//!
//! Implements CLI commands for exporting, checking, and restoring snapshots.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use crate::backup::{
    export_to, BackupManager, CheckReport, FileSink, RestoreError, Restorer, ShareSink,
};
use crate::config::settings::Settings;
use crate::error::TailorError;
use crate::storage::Storage;

/// Backup subcommands
#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Export all customers and orders to a snapshot file
    Export {
        /// Output file (defaults to a dated file in the backup directory)
        output: Option<PathBuf>,

        /// Write single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Print a short summary of the current data for sharing
    Share,

    /// Check a snapshot file without changing anything
    Check {
        /// Snapshot file, or a file name in the backup directory
        file: String,
    },

    /// Replace ALL current data with the contents of a snapshot
    Restore {
        /// Snapshot file, a file name in the backup directory, or 'latest'
        file: String,

        /// Actually perform the restore
        #[arg(short, long)]
        force: bool,
    },

    /// List saved snapshots in the backup directory
    List,
}

/// Handle a backup command
pub fn handle_backup_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BackupCommands,
) -> Result<()> {
    let manager = BackupManager::new(storage.paths());

    match cmd {
        BackupCommands::Export { output, compact } => {
            let pretty = settings.pretty_export && !compact;
            let mut sink = match output {
                Some(path) => FileSink::to_path(path),
                None => FileSink::in_dir(manager.backup_dir()),
            };
            let export = export_to(storage, &mut sink, pretty)?;
            let written = sink
                .written()
                .map(|p| p.display().to_string())
                .unwrap_or(export.file_name);

            println!(
                "Exported {} customers and {} orders to: {}",
                export.customer_count, export.order_count, written
            );
        }

        BackupCommands::Share => {
            let mut sink = ShareSink::new(io::stdout().lock());
            export_to(storage, &mut sink, false)?;
        }

        BackupCommands::Check { file } => {
            let path = resolve_backup_path(&manager, &file)?;
            let restorer = Restorer::from_settings(settings);
            let report = restorer
                .check_file(&path)
                .map_err(|err| rejected(&path, err))?;

            print_report(&path, &report);
            println!("Status: OK, ready to restore");
        }

        BackupCommands::Restore { file, force } => {
            let path = resolve_backup_path(&manager, &file)?;
            let restorer = Restorer::from_settings(settings);
            let prepared = restorer
                .prepare_file(&path)
                .map_err(|err| rejected(&path, err))?;

            print_report(&path, &prepared.report);
            println!();

            if !force {
                println!("WARNING: This will delete ALL current customers and orders!");
                println!("To proceed, run again with --force flag:");
                println!("  tailor backup restore {} --force", file);
                return Ok(());
            }

            if settings.safety_backup_before_restore {
                println!("Saving current data before restore...");
                let safety = manager
                    .create_backup(storage, settings.pretty_export)
                    .context("Could not save current data; restore not started")?;
                info!(path = %safety.display(), "safety snapshot saved");
                println!("Safety backup saved: {}", safety.display());
                println!();
            }

            println!("Restoring from backup...");
            let summary = crate::backup::apply(storage, prepared.records).map_err(|err| {
                if let RestoreError::StoreError { progress, .. } = &err {
                    eprintln!("Restore stopped during {}: {}", progress.stage, progress);
                    if progress.store_modified() {
                        eprintln!("Current data may be incomplete.");
                    }
                }
                anyhow::Error::new(err)
            })?;

            println!(
                "Restored {} customers and {} orders",
                summary.customers_restored, summary.orders_restored
            );
        }

        BackupCommands::List => {
            let backups = manager.list_backups()?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: tailor backup export");
                return Ok(());
            }

            println!("Available Backups");
            println!("=================");
            println!();

            for (i, backup) in backups.iter().enumerate() {
                let age = chrono::Utc::now().signed_duration_since(backup.created_at);
                println!(
                    "  {}. {} ({} ago, {})",
                    i + 1,
                    backup.filename,
                    format_duration(age),
                    format_size(backup.size_bytes),
                );
            }

            println!();
            println!("Total: {} backup(s)", backups.len());
        }
    }

    Ok(())
}

fn print_report(path: &Path, report: &CheckReport) {
    println!("Backup Information");
    println!("==================");
    println!("File: {}", path.display());
    println!(
        "Created: {}",
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Format version: {}", report.format_version);
    println!("Customers: {}", report.customer_count);
    println!("Orders: {}", report.order_count);
}

/// Print the full details of a rejected snapshot, then pass the error on
fn rejected(path: &Path, err: RestoreError) -> anyhow::Error {
    match &err {
        RestoreError::SchemaViolation(violations) => {
            eprintln!("Problems found in {}:", path.display());
            for violation in violations.violations() {
                eprintln!("  - {}", violation);
            }
            if violations.is_truncated() {
                eprintln!(
                    "  ... {} more not shown",
                    violations.total() - violations.violations().len()
                );
            }
        }
        RestoreError::OrphanReference(orphans) => {
            eprintln!("Orders referencing missing customers in {}:", path.display());
            for orphan in orphans.orphans() {
                eprintln!("  - order {} -> customer {}", orphan.order_id, orphan.customer_id);
            }
        }
        _ => {}
    }
    anyhow::Error::new(err)
}

/// Resolve a backup argument to a path
///
/// Unresolvable names are returned unchanged so the restorer reports them.
fn resolve_backup_path(manager: &BackupManager, backup: &str) -> Result<PathBuf> {
    if backup.eq_ignore_ascii_case("latest") {
        return manager
            .get_latest_backup()?
            .map(|b| b.path)
            .ok_or_else(|| {
                TailorError::NotFound {
                    entity_type: "Backup",
                    identifier: "latest".to_string(),
                }
                .into()
            });
    }

    let path = PathBuf::from(backup);
    if path.exists() {
        return Ok(path);
    }

    let in_backup_dir = manager.backup_dir().join(backup);
    if in_backup_dir.exists() {
        return Ok(in_backup_dir);
    }

    Ok(path)
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
