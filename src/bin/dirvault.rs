//! # dirvault CLI
//!
//! Back up a directory into timestamped `tar.gz` archives, skipping runs
//! where nothing changed since the most recent archive and keeping the
//! backup directory under a size budget.
//!
//! ## Usage
//! ```bash
//! # Back up ~/data into ~/backups with the default 500 MB budget
//! dirvault ~/data ~/backups
//!
//! # Custom budget and extra ignored entry names
//! dirvault ~/data ~/backups 100 --ignore node_modules --ignore target
//! ```
//!
//! ## Exit codes
//! - `0` — a new backup was created (or usage was printed because the
//!   required paths were missing)
//! - `3` — no changes detected, no backup created
//! - `1` — the run failed
//! - `2` — invalid arguments (e.g. a non-integer size)

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use dirvault::utils::format_bytes;
use dirvault::{BackupOutcome, IgnoreSet, VaultBuilder, DEFAULT_MAX_SIZE_MB};
use humantime::format_duration;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

/// Exit code for the no-change skip outcome
const EXIT_UNCHANGED: u8 = 3;

/// dirvault - change-detection-gated directory backups with retention
#[derive(Parser)]
#[command(name = "dirvault")]
#[command(version)]
#[command(about = "Back up a directory into timestamped archives, skipping unchanged runs")]
struct Cli {
    /// Directory to back up
    #[arg(value_name = "SOURCE_DIR")]
    source_dir: Option<PathBuf>,

    /// Directory to store backups
    #[arg(value_name = "BACKUP_DIR")]
    backup_dir: Option<PathBuf>,

    /// Maximum size of the backup directory in MB
    #[arg(value_name = "MAX_SIZE_MB", default_value_t = DEFAULT_MAX_SIZE_MB)]
    max_size_mb: u64,

    /// Additional entry names to exclude from change detection (repeatable)
    #[arg(short, long, value_name = "NAME")]
    ignore: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dirvault=debug")),
            )
            .init();
    }

    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    let (Some(source_dir), Some(backup_dir)) = (cli.source_dir.clone(), cli.backup_dir.clone())
    else {
        // Invoked without the required paths: print usage and exit cleanly,
        // touching nothing.
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };

    match run(source_dir, backup_dir, &cli) {
        Ok((outcome, elapsed)) => report(&outcome, elapsed),
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(
    source_dir: PathBuf,
    backup_dir: PathBuf,
    cli: &Cli,
) -> anyhow::Result<(BackupOutcome, Duration)> {
    let max_bytes = cli
        .max_size_mb
        .checked_mul(1024 * 1024)
        .context("maximum size in MB is too large")?;

    println!(
        "Backups are stored in {} with a maximum size of {} ({} MB).",
        backup_dir.display().to_string().cyan(),
        format_bytes(max_bytes).cyan(),
        cli.max_size_mb
    );

    let mut ignore = IgnoreSet::standard();
    ignore.extend(cli.ignore.iter().cloned());

    let vault = VaultBuilder::new()
        .max_bytes(max_bytes)
        .ignore(ignore)
        .build(source_dir, backup_dir);

    let start = Instant::now();
    let outcome = vault.run()?;
    Ok((outcome, start.elapsed()))
}

fn report(outcome: &BackupOutcome, elapsed: Duration) -> ExitCode {
    match outcome {
        BackupOutcome::Created {
            archive_path,
            archive_size,
            evicted,
        } => {
            for path in evicted {
                println!(
                    "{} Evicted old backup {}",
                    "✗".yellow().bold(),
                    path.display().to_string().cyan()
                );
            }
            println!(
                "{} Backup saved to {}",
                "✓".green().bold(),
                archive_path.display().to_string().cyan()
            );
            println!("  Size: {}", format_bytes(*archive_size).cyan());
            println!(
                "  Time: {}",
                format_duration(Duration::from_millis(elapsed.as_millis() as u64))
                    .to_string()
                    .cyan()
            );
            ExitCode::SUCCESS
        }
        BackupOutcome::Unchanged { latest_archive } => {
            println!(
                "{} No changes detected since {}, skipping backup",
                "○".blue().bold(),
                latest_archive.display().to_string().cyan()
            );
            ExitCode::from(EXIT_UNCHANGED)
        }
    }
}
