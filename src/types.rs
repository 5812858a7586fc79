//! Shared types for backup runs

use std::path::PathBuf;

/// Default retention budget for the backup directory, in megabytes
pub const DEFAULT_MAX_SIZE_MB: u64 = 500;

/// Outcome of a single backup run
///
/// A run either produces a new archive or detects that nothing changed since
/// the most recent one. Callers must be able to tell the two apart from each
/// other and from failures; the CLI maps them to distinct exit codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// A new archive was written
    Created {
        /// Path of the archive inside the backup directory
        archive_path: PathBuf,
        /// Size of the new archive in bytes
        archive_size: u64,
        /// Old archives deleted by retention enforcement, in deletion order
        evicted: Vec<PathBuf>,
    },
    /// The source tree matches the most recent archive; nothing was written
    /// and no eviction took place
    Unchanged {
        /// The archive the source was compared against
        latest_archive: PathBuf,
    },
}

impl BackupOutcome {
    /// Whether this run wrote a new archive
    pub fn created(&self) -> bool {
        matches!(self, BackupOutcome::Created { .. })
    }
}
