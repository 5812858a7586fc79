//! Directory size accounting
//!
//! Computes the total byte size of a directory tree by walking every file
//! transitively under a root and summing individual file sizes. Directories
//! contribute traversal only, never bytes. There are no exclusions here: the
//! ignore set used by the comparator does not apply to size accounting.

use crate::error::Result;
use std::path::Path;
use tracing::trace;
use walkdir::WalkDir;

/// Total size in bytes of all files under `path`, recursively.
///
/// Symbolic links are not followed; a link contributes the size of the link
/// entry itself, not its target. Any error during the walk (the root missing,
/// an entry unreadable mid-traversal) propagates immediately — no partial
/// best-effort sum is ever returned.
///
/// # Example
///
/// ```rust,no_run
/// use dirvault::size::folder_size;
/// use std::path::Path;
///
/// # fn main() -> dirvault::Result<()> {
/// let bytes = folder_size(Path::new("/var/backups"))?;
/// println!("{} bytes", bytes);
/// # Ok(())
/// # }
/// ```
pub fn folder_size(path: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in WalkDir::new(path).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        total += entry.metadata()?.len();
    }
    trace!("folder_size({:?}) = {}", path, total);
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_directory_is_zero() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(folder_size(tmp.path()).unwrap(), 0);
    }

    #[test]
    fn test_sums_nested_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.bin"), vec![0u8; 100]).unwrap();
        let sub = tmp.path().join("sub/deeper");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("b.bin"), vec![0u8; 250]).unwrap();

        assert_eq!(folder_size(tmp.path()).unwrap(), 350);
    }

    #[test]
    fn test_directories_not_counted() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("only/dirs/here")).unwrap();
        assert_eq!(folder_size(tmp.path()).unwrap(), 0);
    }

    #[test]
    fn test_missing_path_is_error() {
        let tmp = TempDir::new().unwrap();
        let gone = tmp.path().join("does-not-exist");
        assert!(folder_size(&gone).is_err());
    }
}
