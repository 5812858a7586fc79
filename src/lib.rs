//! # dirvault - Change-detection-gated directory backups
//!
//! A small library (and CLI) that archives a source directory into
//! timestamped, gzip-compressed tar bundles inside a backup directory, while
//! keeping that directory under a configurable size budget by evicting the
//! oldest bundles first.
//!
//! ## Overview
//!
//! A backup run does three things, in order:
//!
//! - **Change detection**: the most recent archive for the source is
//!   extracted into a temporary directory and deep-compared against the live
//!   source tree, byte for byte. If nothing differs, no new archive is
//!   created and nothing is evicted.
//! - **Retention**: the total size of the backup directory is brought back
//!   under the budget by deleting the oldest archives, one at a time, before
//!   the new archive is written.
//! - **Archiving**: the source tree is bundled into
//!   `<folder>_<DD.MM.YYYY_HH-MM>.tar.gz` inside the backup directory. The
//!   timestamp has minute resolution; a second backup of the same source in
//!   the same minute overwrites the first.
//!
//! Each archive is a full snapshot — there is no deduplication or
//! incremental storage across bundles, no encryption, and no scheduler; a
//! run is a single synchronous pass driven by the caller.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dirvault::{BackupOutcome, Vault};
//! use std::path::PathBuf;
//!
//! # fn main() -> dirvault::Result<()> {
//! let vault = Vault::new(
//!     PathBuf::from("/home/user/data"),     // Directory to back up
//!     PathBuf::from("/home/user/backups"),  // Where archives live
//! );
//!
//! match vault.run()? {
//!     BackupOutcome::Created { archive_path, evicted, .. } => {
//!         println!("backup saved to {:?}", archive_path);
//!         println!("{} old archives evicted", evicted.len());
//!     }
//!     BackupOutcome::Unchanged { latest_archive } => {
//!         println!("no changes since {:?}", latest_archive);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Use [`VaultBuilder`] to set the retention budget and the ignore set —
//! entry names (editor and tooling directories, typically) that change
//! detection skips at every depth of both trees:
//!
//! ```rust,no_run
//! use dirvault::VaultBuilder;
//! use std::path::PathBuf;
//!
//! let vault = VaultBuilder::new()
//!     .max_size_mb(100)
//!     .add_ignored("node_modules")
//!     .build(
//!         PathBuf::from("./project"),
//!         PathBuf::from("./backups"),
//!     );
//! ```
//!
//! ## Module Organization
//!
//! - [`vault`]: the [`Vault`] orchestrator — sequencing of a backup run
//! - [`compare`]: recursive tree comparison and the [`IgnoreSet`] type
//! - [`retention`]: size-budget enforcement over the backup directory
//! - [`size`]: recursive directory size accounting
//! - [`archive`]: gzip'd tar bundle creation and extraction
//! - [`types`]: run outcomes and shared constants
//! - [`error`]: error types and the crate [`Result`] alias

// Public API modules
pub mod archive;
pub mod compare;
pub mod error;
pub mod retention;
pub mod size;
pub mod types;
pub mod utils;
pub mod vault;

// Re-export main types for convenience
pub use compare::{trees_equal, IgnoreSet};
pub use error::{Result, VaultError};
pub use retention::enforce_budget;
pub use size::folder_size;
pub use types::{BackupOutcome, DEFAULT_MAX_SIZE_MB};
pub use vault::{Vault, VaultBuilder};

#[cfg(test)]
mod tests;
