use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tailor_backup::cli::{handle_backup_command, BackupCommands};
use tailor_backup::config::{paths::TailorPaths, settings::Settings};
use tailor_backup::logging::{init_logging, LogConfig, LogFormat};
use tailor_backup::storage::Storage;

#[derive(Parser)]
#[command(
    name = "tailor",
    version,
    about = "Backup and restore for tailoring shop customer and order records",
    long_about = "Exports every customer and order to a versioned JSON snapshot, and \
                  restores a snapshot by replacing ALL current records after validating \
                  it completely."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot export, check, and restore
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(
        &LogConfig::from_verbosity(cli.verbose)
            .with_format(cli.log_format)
            .with_ansi(std::io::stderr().is_terminal()),
    );

    let paths = TailorPaths::new().context("Could not determine the data directory")?;
    let settings = Settings::load_or_create(&paths).context("Could not load settings")?;

    match cli.command {
        Some(Commands::Backup(cmd)) => {
            let mut storage = Storage::new(paths).context("Could not open the data directory")?;
            storage.load_all().context("Could not load records")?;
            handle_backup_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Config) => {
            if !paths.settings_file().exists() {
                settings
                    .save(&paths)
                    .context("Could not write the settings file")?;
                println!("Created default settings file");
                println!();
            }
            println!("Tailor Backup Configuration");
            println!("===========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Import size limit:   {} bytes", settings.import_limit());
            println!("  Pretty export:       {}", settings.pretty_export);
            println!(
                "  Safety backup:       {}",
                settings.safety_backup_before_restore
            );
        }
        None => {
            println!("tailor - backup and restore for customer and order records");
            println!();
            println!("Run 'tailor --help' for usage information.");
        }
    }

    Ok(())
}
