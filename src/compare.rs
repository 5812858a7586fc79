//! Recursive directory tree comparison
//!
//! Decides whether two directory trees are content-identical, excluding any
//! entry whose name appears in an [`IgnoreSet`]. This is the change-detection
//! half of the backup workflow: the most recent archive is extracted next to
//! the backups and compared against the live source tree, and an equal result
//! means no new archive needs to be written.
//!
//! The comparison is lazy: trees are walked level by level over live path
//! handles, never materialized in memory, and the first difference found
//! short-circuits everything below it. File contents are compared byte for
//! byte in fixed-size chunks — never by size or timestamp alone.

use crate::error::Result;
use std::collections::{BTreeSet, HashSet};
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Entry names excluded from comparison at every depth.
///
/// An entry matching the set is invisible to change detection wherever it
/// appears in either tree: its content may differ, or it may exist on only
/// one side, without affecting the result. The set is always passed
/// explicitly — there is no hidden global — so callers and tests can vary it.
///
/// # Examples
///
/// ```rust
/// use dirvault::compare::IgnoreSet;
///
/// // The standard set covers common editor/tooling directories
/// let ignore = IgnoreSet::default();
/// assert!(ignore.contains(".git".as_ref()));
///
/// // Or build one from scratch
/// let ignore: IgnoreSet = ["target", "node_modules"].into_iter().collect();
/// assert!(ignore.contains("target".as_ref()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSet {
    names: HashSet<OsString>,
}

impl IgnoreSet {
    /// An ignore set matching nothing
    pub fn empty() -> Self {
        IgnoreSet {
            names: HashSet::new(),
        }
    }

    /// The standard set of editor and tooling entry names
    pub fn standard() -> Self {
        [".git", ".hg", ".svn", ".idea", ".vscode", "__pycache__", ".DS_Store"]
            .into_iter()
            .collect()
    }

    /// Whether `name` is excluded from comparison
    pub fn contains(&self, name: &OsStr) -> bool {
        self.names.contains(name)
    }

    /// Add an entry name to the set
    pub fn insert(&mut self, name: impl Into<OsString>) {
        self.names.insert(name.into());
    }

    /// Number of names in the set
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the set matches nothing
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        IgnoreSet::standard()
    }
}

impl<S: Into<OsString>> FromIterator<S> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        IgnoreSet {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<OsString>> Extend<S> for IgnoreSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names.extend(iter.into_iter().map(Into::into));
    }
}

/// Compare two directory trees for structural and content equality.
///
/// At each level the non-ignored entry name sets of both sides must match
/// exactly; a name present on only one side makes the trees unequal without
/// descending further. Names present on both sides are then checked: regular
/// files byte for byte, subdirectories recursively. A name that is a file on
/// one side and a directory on the other is inequality. The first difference
/// found determines the result and stops all remaining checks.
///
/// Two empty directories are equal. Differences confined entirely to ignored
/// entries never flip the result.
///
/// # Errors
///
/// Propagates any I/O failure while listing or reading either tree; an
/// unreadable entry aborts the comparison rather than being skipped.
pub fn trees_equal(a: &Path, b: &Path, ignore: &IgnoreSet) -> Result<bool> {
    let names_a = visible_names(a, ignore)?;
    let names_b = visible_names(b, ignore)?;

    if names_a != names_b {
        debug!("trees differ in entries: {:?} vs {:?}", a, b);
        return Ok(false);
    }

    for name in &names_a {
        let lhs = a.join(name);
        let rhs = b.join(name);
        let lhs_is_dir = lhs.is_dir();

        if lhs_is_dir != rhs.is_dir() {
            debug!("entry kind differs for {:?}", name);
            return Ok(false);
        }

        let equal = if lhs_is_dir {
            trees_equal(&lhs, &rhs, ignore)?
        } else {
            file_contents_equal(&lhs, &rhs)?
        };
        if !equal {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Direct entry names of `dir`, minus ignored ones, in sorted order
fn visible_names(dir: &Path, ignore: &IgnoreSet) -> Result<BTreeSet<OsString>> {
    let mut names = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        if !ignore.contains(&name) {
            names.insert(name);
        }
    }
    Ok(names)
}

/// Byte-for-byte file comparison using fixed-size chunks
fn file_contents_equal(a: &Path, b: &Path) -> Result<bool> {
    let mut file_a = File::open(a)?;
    let mut file_b = File::open(b)?;
    let mut buf_a = [0u8; 8192];
    let mut buf_b = [0u8; 8192];

    loop {
        let n_a = read_full(&mut file_a, &mut buf_a)?;
        let n_b = read_full(&mut file_b, &mut buf_b)?;
        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            debug!("file contents differ: {:?} vs {:?}", a, b);
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Read until `buf` is full or EOF, returning the number of bytes read
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
