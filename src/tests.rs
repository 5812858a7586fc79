//! Integration tests for dirvault
//!
//! End-to-end backup runs over real temporary directories, covering the
//! change-detection gate, retention eviction and cleanup invariants.

#[cfg(test)]
mod integration_tests {
    use crate::*;
    use filetime::{set_file_mtime, FileTime};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn make_source(files: &[(&str, &str)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("data");
        fs::create_dir(&root).unwrap();
        for (path, content) in files {
            let full = root.join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        tmp
    }

    fn archives_in(dir: &Path) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.is_file() && p.to_str().is_some_and(|s| s.ends_with(".tar.gz"))
            })
            .collect();
        found.sort();
        found
    }

    fn compare_dirs_in(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.is_dir()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(".dirvault-cmp-"))
            })
            .collect()
    }

    #[test]
    fn test_first_backup_creates_exactly_one_archive() {
        let source = make_source(&[("a.txt", "one"), ("sub/b.txt", "two")]);
        let backups = TempDir::new().unwrap();

        let vault = Vault::new(source.path().join("data"), backups.path().to_path_buf());
        let outcome = vault.run().unwrap();

        let BackupOutcome::Created { archive_path, archive_size, evicted } = outcome else {
            panic!("first backup must create an archive");
        };
        assert!(archive_path.is_file());
        assert_eq!(archive_size, fs::metadata(&archive_path).unwrap().len());
        assert!(evicted.is_empty());
        assert_eq!(archives_in(backups.path()).len(), 1);
        assert!(compare_dirs_in(backups.path()).is_empty());
    }

    #[test]
    fn test_unchanged_source_skips_second_backup() {
        let source = make_source(&[("a.txt", "one"), ("sub/b.txt", "two")]);
        let backups = TempDir::new().unwrap();
        let vault = Vault::new(source.path().join("data"), backups.path().to_path_buf());

        let first = vault.run().unwrap();
        assert!(first.created());

        let second = vault.run().unwrap();
        let BackupOutcome::Unchanged { latest_archive } = second else {
            panic!("unchanged source must be skipped");
        };
        assert!(latest_archive.is_file());
        assert_eq!(archives_in(backups.path()).len(), 1);
        assert!(compare_dirs_in(backups.path()).is_empty());
    }

    #[test]
    fn test_changed_source_creates_new_archive() {
        let source = make_source(&[("a.txt", "one")]);
        let source_root = source.path().join("data");
        let backups = TempDir::new().unwrap();
        let vault = Vault::new(source_root.clone(), backups.path().to_path_buf());

        vault.run().unwrap();

        // Age the first archive out of the current minute so the second run
        // gets its own filename.
        let first = archives_in(backups.path()).pop().unwrap();
        let aged = backups.path().join("data_01.01.2020_00-00.tar.gz");
        fs::rename(&first, &aged).unwrap();
        set_file_mtime(&aged, FileTime::from_unix_time(1_577_836_800, 0)).unwrap();

        fs::write(source_root.join("a.txt"), "one, edited").unwrap();
        let outcome = vault.run().unwrap();

        assert!(outcome.created());
        assert_eq!(archives_in(backups.path()).len(), 2);
        assert!(compare_dirs_in(backups.path()).is_empty());
    }

    #[test]
    fn test_change_in_ignored_directory_is_skipped() {
        let source = make_source(&[("a.txt", "one")]);
        let source_root = source.path().join("data");
        let backups = TempDir::new().unwrap();
        let vault = Vault::new(source_root.clone(), backups.path().to_path_buf());

        vault.run().unwrap();

        // Mutations confined to an ignored name never trigger a backup
        let git = source_root.join(".git");
        fs::create_dir(&git).unwrap();
        fs::write(git.join("HEAD"), "ref: refs/heads/main").unwrap();

        let outcome = vault.run().unwrap();
        assert!(!outcome.created());
        assert_eq!(archives_in(backups.path()).len(), 1);
    }

    #[test]
    fn test_eviction_runs_before_new_archive_is_written() {
        let source = make_source(&[("a.txt", "payload")]);
        let backups = TempDir::new().unwrap();

        // Pre-existing unrelated files: oldest first by mtime
        let f1 = backups.path().join("f1.bin");
        let f2 = backups.path().join("f2.bin");
        let f3 = backups.path().join("f3.bin");
        fs::write(&f1, vec![0u8; 2000]).unwrap();
        fs::write(&f2, vec![0u8; 2500]).unwrap();
        fs::write(&f3, vec![0u8; 1500]).unwrap();
        set_file_mtime(&f1, FileTime::from_unix_time(1_000_000, 0)).unwrap();
        set_file_mtime(&f2, FileTime::from_unix_time(2_000_000, 0)).unwrap();
        set_file_mtime(&f3, FileTime::from_unix_time(3_000_000, 0)).unwrap();

        // Budget of 5000 bytes: 6000 on disk, evicting f1 reaches 4000
        let vault = VaultBuilder::new()
            .max_bytes(5000)
            .build(source.path().join("data"), backups.path().to_path_buf());
        let outcome = vault.run().unwrap();

        let BackupOutcome::Created { evicted, .. } = outcome else {
            panic!("expected a new archive");
        };
        assert_eq!(evicted, vec![f1]);
        assert!(f2.exists());
        assert!(f3.exists());
        assert_eq!(archives_in(backups.path()).len(), 1);
    }

    #[test]
    fn test_corrupt_latest_archive_aborts_cleanly() {
        let source = make_source(&[("a.txt", "one")]);
        let backups = TempDir::new().unwrap();
        fs::write(
            backups.path().join("data_01.01.2024_00-00.tar.gz"),
            b"not a gzip stream",
        )
        .unwrap();

        let vault = Vault::new(source.path().join("data"), backups.path().to_path_buf());
        let err = vault.run().unwrap_err();

        assert!(matches!(err, VaultError::Extraction(_)));
        // The run aborted before creating anything, and the comparison tree
        // did not survive the failure path.
        assert_eq!(archives_in(backups.path()).len(), 1);
        assert!(compare_dirs_in(backups.path()).is_empty());
    }

    #[test]
    fn test_stale_compare_dir_swept_on_next_run() {
        let source = make_source(&[("a.txt", "one")]);
        let backups = TempDir::new().unwrap();
        let stale = backups.path().join(".dirvault-cmp-killed");
        fs::create_dir(&stale).unwrap();
        fs::write(stale.join("orphan.txt"), "left behind").unwrap();

        let vault = Vault::new(source.path().join("data"), backups.path().to_path_buf());
        let outcome = vault.run().unwrap();

        assert!(outcome.created());
        assert!(!stale.exists());
    }
}
