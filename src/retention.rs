//! Retention budget enforcement for the backup directory
//!
//! Keeps the backup directory's total size under a configured byte budget by
//! deleting the oldest archives first. Selection and deletion operate only on
//! direct regular-file entries of the directory — subdirectories are never
//! recursed into or removed — which bounds this routine strictly to flat
//! archive collections.
//!
//! Size measurement ([`folder_size`]) and oldest-file selection
//! ([`oldest_file`]) are separate operations composed by a small driving loop
//! in [`enforce_budget`], so each can be exercised on its own.

use crate::error::Result;
use crate::size::folder_size;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// Find the direct file entry of `dir` with the oldest modification time.
///
/// Only regular files directly inside `dir` are candidates. Returns `None`
/// when the directory holds no files. Ties on modification time break by
/// path name ascending, so selection is deterministic within a run.
pub fn oldest_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut oldest: Option<(SystemTime, PathBuf)> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        let path = entry.path();
        let candidate = (modified, path);
        oldest = match oldest {
            Some(current) if current <= candidate => Some(current),
            _ => Some(candidate),
        };
    }

    Ok(oldest.map(|(_, path)| path))
}

/// Delete the oldest files directly inside `dir` until its total size is at
/// most `max_bytes`, returning the evicted paths in deletion order.
///
/// The size check is recursive ([`folder_size`]) while eviction candidates
/// are top-level files only. The loop terminates either when the size drops
/// to the budget or when no candidate files remain; the latter leaves the
/// directory over budget and is not an error. The directory itself is never
/// removed.
pub fn enforce_budget(dir: &Path, max_bytes: u64) -> Result<Vec<PathBuf>> {
    let mut evicted = Vec::new();

    while folder_size(dir)? > max_bytes {
        let Some(victim) = oldest_file(dir)? else {
            debug!(
                "retention: {:?} still over {} bytes but holds no files",
                dir, max_bytes
            );
            break;
        };
        fs::remove_file(&victim)?;
        info!("evicted old backup {:?}", victim);
        evicted.push(victim);
    }

    Ok(evicted)
}
