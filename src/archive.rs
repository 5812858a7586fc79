//! Archive creation and extraction
//!
//! The backup bundle format is a gzip-compressed tar stream holding one full
//! snapshot of the source tree under a single top-level directory name. The
//! rest of the crate depends on exactly two operations: [`create_archive`]
//! and [`extract_archive`], and on the container round-tripping names,
//! contents and directory structure faithfully.
//!
//! Creation is atomic with respect to the final path: bytes are written to a
//! temporary file in the destination directory and persisted to the archive
//! name only after both the tar stream and the gzip encoder have finished.
//! A failed write leaves nothing at the final path.

use crate::error::{Result, VaultError};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::path::Path;
use tar::{Archive, Builder};
use tracing::{debug, info};

/// File extension of backup bundles
pub const ARCHIVE_EXTENSION: &str = "tar.gz";

/// Prefix of in-progress archive temp files inside the backup directory
const TEMP_PREFIX: &str = ".dirvault-tmp-";

/// Bundle `source_dir` into a gzip'd tar archive at `archive_path`.
///
/// The tree is stored under `internal_name` inside the archive, so extraction
/// recreates `<dest>/<internal_name>/...`. An existing file at `archive_path`
/// is replaced; creating two archives with the same name within one minute
/// therefore overwrites the earlier one.
pub fn create_archive(archive_path: &Path, source_dir: &Path, internal_name: &str) -> Result<()> {
    let dest_dir = archive_path
        .parent()
        .ok_or_else(|| VaultError::archive(format!("{:?} has no parent directory", archive_path)))?;

    let temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dest_dir)?;
    debug!("writing archive stream to {:?}", temp.path());

    let encoder = GzEncoder::new(temp.as_file(), Compression::default());
    let mut builder = Builder::new(encoder);
    builder
        .append_dir_all(internal_name, source_dir)
        .map_err(|e| VaultError::archive(format!("failed to bundle {:?}: {}", source_dir, e)))?;
    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .map_err(|e| VaultError::archive(format!("failed to finish archive stream: {}", e)))?;

    temp.persist(archive_path)
        .map_err(|e| VaultError::archive(format!("failed to persist {:?}: {}", archive_path, e)))?;

    info!("created archive {:?}", archive_path);
    Ok(())
}

/// Unpack the archive at `archive_path` into `dest_dir`.
///
/// Recreates the bundled tree, including its internal top-level directory,
/// under `dest_dir`.
pub fn extract_archive(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive
        .unpack(dest_dir)
        .map_err(|e| VaultError::extraction(format!("failed to unpack {:?}: {}", archive_path, e)))?;
    debug!("extracted {:?} into {:?}", archive_path, dest_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{trees_equal, IgnoreSet};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_archive_round_trips_tree() {
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("top.txt"), "hello").unwrap();
        fs::create_dir_all(source.path().join("a/b")).unwrap();
        fs::write(source.path().join("a/b/deep.bin"), vec![3u8; 5000]).unwrap();
        fs::create_dir(source.path().join("empty")).unwrap();

        let backups = TempDir::new().unwrap();
        let archive_path = backups.path().join("data_01.01.2024_00-00.tar.gz");
        create_archive(&archive_path, source.path(), "data").unwrap();
        assert!(archive_path.is_file());

        let restored = TempDir::new().unwrap();
        extract_archive(&archive_path, restored.path()).unwrap();

        let inner = restored.path().join("data");
        assert!(inner.is_dir());
        assert!(trees_equal(source.path(), &inner, &IgnoreSet::empty()).unwrap());
    }

    #[test]
    fn test_create_overwrites_same_name() {
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("f.txt"), "v1").unwrap();

        let backups = TempDir::new().unwrap();
        let archive_path = backups.path().join("data_01.01.2024_00-00.tar.gz");
        create_archive(&archive_path, source.path(), "data").unwrap();

        fs::write(source.path().join("f.txt"), "v2").unwrap();
        create_archive(&archive_path, source.path(), "data").unwrap();

        let restored = TempDir::new().unwrap();
        extract_archive(&archive_path, restored.path()).unwrap();
        let content = fs::read_to_string(restored.path().join("data/f.txt")).unwrap();
        assert_eq!(content, "v2");
    }

    #[test]
    fn test_failed_create_leaves_no_archive() {
        let backups = TempDir::new().unwrap();
        let archive_path = backups.path().join("data_01.01.2024_00-00.tar.gz");
        let missing_source = backups.path().join("no-such-source");

        assert!(create_archive(&archive_path, &missing_source, "data").is_err());
        assert!(!archive_path.exists());
        // The temp stream file must not linger either
        let leftovers: Vec<_> = fs::read_dir(backups.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_extract_corrupt_archive_is_error() {
        let backups = TempDir::new().unwrap();
        let bogus = backups.path().join("data_01.01.2024_00-00.tar.gz");
        fs::write(&bogus, b"this is not a gzip stream").unwrap();

        let dest = TempDir::new().unwrap();
        assert!(extract_archive(&bogus, dest.path()).is_err());
    }

    #[test]
    fn test_extract_missing_archive_is_error() {
        let backups = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        assert!(extract_archive(&backups.path().join("gone.tar.gz"), dest.path()).is_err());
    }
}
