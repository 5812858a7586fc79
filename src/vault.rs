//! Backup orchestration
//!
//! This module provides the [`Vault`] struct, the main entry point for
//! running backups. A run sequences the narrow collaborators of this crate:
//! source validation, latest-archive lookup, extraction and comparison
//! (change detection), retention enforcement, and archive creation.
//!
//! ## Overview
//!
//! One call to [`Vault::run`] performs one backup attempt:
//!
//! 1. Validate that the source directory exists — fail fast, no writes.
//! 2. Create the backup directory if absent.
//! 3. Sweep stale comparison directories left behind by a killed prior run.
//! 4. Locate the most recent archive for this source. If one exists, extract
//!    it into a namespaced temporary directory and compare it against the
//!    live source tree; if nothing differs, return
//!    [`BackupOutcome::Unchanged`] without writing or evicting anything.
//! 5. Enforce the retention budget by evicting the oldest archives.
//! 6. Write the new timestamped archive and return
//!    [`BackupOutcome::Created`].
//!
//! The extracted comparison tree never survives the run: it lives in a
//! [`tempfile::TempDir`] whose cleanup runs on every path, including errors.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use dirvault::{Vault, VaultBuilder};
//! use std::path::PathBuf;
//!
//! # fn main() -> dirvault::Result<()> {
//! // Default configuration: 500 MB budget, standard ignore set
//! let vault = Vault::new(
//!     PathBuf::from("/home/user/data"),
//!     PathBuf::from("/home/user/backups"),
//! );
//! let outcome = vault.run()?;
//! println!("created: {}", outcome.created());
//!
//! // Custom configuration via the builder
//! let vault = VaultBuilder::new()
//!     .max_size_mb(100)
//!     .add_ignored("node_modules")
//!     .build(
//!         PathBuf::from("/home/user/data"),
//!         PathBuf::from("/home/user/backups"),
//!     );
//! # Ok(())
//! # }
//! ```

use crate::archive::{self, ARCHIVE_EXTENSION};
use crate::compare::{trees_equal, IgnoreSet};
use crate::error::{Result, VaultError};
use crate::retention;
use crate::types::{BackupOutcome, DEFAULT_MAX_SIZE_MB};
use crate::utils::timestamp_slug;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Prefix of the temporary directories archives are extracted into for
/// comparison. Namespaced so they can never be mistaken for archives, and so
/// stale ones from a killed run are recognizable at the next start.
const COMPARE_PREFIX: &str = ".dirvault-cmp-";

/// A configured backup target: one source directory, one backup directory,
/// a retention budget and an ignore set.
///
/// `Vault` holds configuration only; all filesystem work happens inside
/// [`Vault::run`]. Runs are synchronous and single-threaded, and concurrent
/// runs against the same backup directory are not supported.
#[derive(Debug, Clone)]
pub struct Vault {
    /// Directory to back up
    source_dir: PathBuf,
    /// Directory archives are stored in
    backup_dir: PathBuf,
    /// Retention budget for the backup directory, in bytes
    max_bytes: u64,
    /// Entry names excluded from change detection
    ignore: IgnoreSet,
}

impl Vault {
    /// Create a vault with the default budget and standard ignore set
    pub fn new(source_dir: PathBuf, backup_dir: PathBuf) -> Self {
        VaultBuilder::new().build(source_dir, backup_dir)
    }

    /// The configured retention budget in bytes
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// The directory archives are stored in
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Perform one backup run.
    ///
    /// Returns [`BackupOutcome::Unchanged`] when the source tree is
    /// content-identical to the most recent archive (nothing is written and
    /// no eviction takes place), otherwise [`BackupOutcome::Created`] with
    /// the new archive's path, size and the list of evicted old archives.
    ///
    /// The retention budget is enforced before the new archive is written
    /// and counts only pre-existing archives, so the backup directory may
    /// transiently exceed the budget by up to one archive's size until the
    /// next run.
    ///
    /// # Errors
    ///
    /// - [`VaultError::SourceNotFound`] if the source directory is absent;
    ///   nothing has been written at that point.
    /// - Any I/O, extraction or archive-creation failure aborts the run
    ///   immediately. The comparison tree is still cleaned up, and a failed
    ///   archive write leaves no file at the final archive path.
    pub fn run(&self) -> Result<BackupOutcome> {
        if !self.source_dir.is_dir() {
            return Err(VaultError::SourceNotFound(self.source_dir.clone()));
        }
        let name = self.source_name()?;
        info!(
            "backing up {:?} into {:?} (budget {} bytes)",
            self.source_dir, self.backup_dir, self.max_bytes
        );

        fs::create_dir_all(&self.backup_dir)?;
        self.sweep_stale_compare_dirs()?;

        if let Some(latest) = self.latest_archive(&name)? {
            debug!("comparing source against {:?}", latest);
            if self.matches_archive(&latest, &name)? {
                info!("no changes detected since {:?}", latest);
                return Ok(BackupOutcome::Unchanged {
                    latest_archive: latest,
                });
            }
        } else {
            debug!("no prior archive for {:?}, proceeding to first backup", name);
        }

        let evicted = retention::enforce_budget(&self.backup_dir, self.max_bytes)?;

        let archive_path = self.backup_dir.join(format!(
            "{}_{}.{}",
            name,
            timestamp_slug(Local::now()),
            ARCHIVE_EXTENSION
        ));
        archive::create_archive(&archive_path, &self.source_dir, &name)?;
        let archive_size = fs::metadata(&archive_path)?.len();

        Ok(BackupOutcome::Created {
            archive_path,
            archive_size,
            evicted,
        })
    }

    /// Extract `latest` next to the backups and compare it against the
    /// source tree. The extracted tree is removed on every path out of this
    /// function, success or failure.
    fn matches_archive(&self, latest: &Path, name: &str) -> Result<bool> {
        let compare_dir = tempfile::Builder::new()
            .prefix(COMPARE_PREFIX)
            .tempdir_in(&self.backup_dir)?;

        let result = self.compare_extracted(latest, compare_dir.path(), name);
        let cleanup = compare_dir.close();
        let unchanged = result?;
        cleanup?;
        Ok(unchanged)
    }

    fn compare_extracted(&self, latest: &Path, compare_dir: &Path, name: &str) -> Result<bool> {
        archive::extract_archive(latest, compare_dir)?;

        let extracted_root = compare_dir.join(name);
        if !extracted_root.is_dir() {
            // An archive matching the naming pattern but not bundling the
            // expected top-level directory cannot represent this source.
            warn!(
                "archive {:?} does not contain a {:?} directory, treating as changed",
                latest, name
            );
            return Ok(false);
        }

        trees_equal(&self.source_dir, &extracted_root, &self.ignore)
    }

    /// Most recently modified archive for this source, if any.
    ///
    /// Only direct regular files named `<name>_*.tar.gz` are considered, so
    /// unrelated files, foreign archives and leftover directories are never
    /// picked up. Ties on modification time break by filename.
    fn latest_archive(&self, name: &str) -> Result<Option<PathBuf>> {
        let prefix = format!("{}_", name);
        let suffix = format!(".{}", ARCHIVE_EXTENSION);
        let mut latest: Option<(SystemTime, PathBuf)> = None;

        for entry in fs::read_dir(&self.backup_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if !file_name.starts_with(&prefix) || !file_name.ends_with(&suffix) {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            let candidate = (modified, entry.path());
            latest = match latest {
                Some(current) if current >= candidate => Some(current),
                _ => Some(candidate),
            };
        }

        Ok(latest.map(|(_, path)| path))
    }

    /// Remove comparison directories left behind by a run that was killed
    /// between extraction and cleanup.
    fn sweep_stale_compare_dirs(&self) -> Result<()> {
        for entry in fs::read_dir(&self.backup_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let is_stale = entry
                .file_name()
                .to_str()
                .is_some_and(|n| n.starts_with(COMPARE_PREFIX));
            if is_stale {
                warn!("removing stale comparison directory {:?}", entry.path());
                fs::remove_dir_all(entry.path())?;
            }
        }
        Ok(())
    }

    /// Folder name the archives are named after and the tree is bundled
    /// under: the final component of the source path.
    fn source_name(&self) -> Result<String> {
        let canonical;
        let dir = match self.source_dir.file_name() {
            Some(_) => self.source_dir.as_path(),
            // Paths like "." or "sub/.." carry no final component; resolve
            // them before taking the name.
            None => {
                canonical = self.source_dir.canonicalize()?;
                canonical.as_path()
            }
        };
        dir.file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                VaultError::config(format!(
                    "cannot derive a folder name from source path {:?}",
                    self.source_dir
                ))
            })
    }
}

/// Builder for [`Vault`] instances with custom configuration
///
/// # Examples
///
/// ```rust
/// use dirvault::VaultBuilder;
/// use std::path::PathBuf;
///
/// let vault = VaultBuilder::new()
///     .max_size_mb(100)
///     .add_ignored("target")
///     .build(PathBuf::from("./data"), PathBuf::from("./backups"));
/// assert_eq!(vault.max_bytes(), 100 * 1024 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct VaultBuilder {
    max_bytes: u64,
    ignore: IgnoreSet,
}

impl VaultBuilder {
    /// Create a builder with the default budget and standard ignore set
    pub fn new() -> Self {
        VaultBuilder {
            max_bytes: DEFAULT_MAX_SIZE_MB * 1024 * 1024,
            ignore: IgnoreSet::standard(),
        }
    }

    /// Set the retention budget in bytes
    pub fn max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }

    /// Set the retention budget in megabytes
    pub fn max_size_mb(self, mb: u64) -> Self {
        self.max_bytes(mb * 1024 * 1024)
    }

    /// Replace the ignore set entirely
    pub fn ignore(mut self, ignore: IgnoreSet) -> Self {
        self.ignore = ignore;
        self
    }

    /// Add a single name to the ignore set
    pub fn add_ignored(mut self, name: impl Into<std::ffi::OsString>) -> Self {
        self.ignore.insert(name);
        self
    }

    /// Build the vault for a source and backup directory pair
    pub fn build(self, source_dir: PathBuf, backup_dir: PathBuf) -> Vault {
        Vault {
            source_dir,
            backup_dir,
            max_bytes: self.max_bytes,
            ignore: self.ignore,
        }
    }
}

impl Default for VaultBuilder {
    fn default() -> Self {
        VaultBuilder::new()
    }
}
