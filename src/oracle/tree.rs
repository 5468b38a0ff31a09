use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};
use tracing::debug;
use walkdir::WalkDir;

use crate::ext::PathDisplayExt;

/// Read-only view of the regular files below a root directory.
///
/// Paths are stored relative to `root`, so trees rooted at different
/// locations can be compared structurally. Directories are not entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryTree {
    root: PathBuf,
    files: BTreeSet<PathBuf>,
}

/// Paths present in only one of two trees.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileSetDifference {
    /// In the expected tree, absent from the actual one
    pub missing: Vec<PathBuf>,
    /// In the actual tree, absent from the expected one
    pub extra: Vec<PathBuf>,
}

impl FileSetDifference {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

impl DirectoryTree {
    pub fn scan(root: impl Into<PathBuf>) -> Result<Self, TreeScanError> {
        let root = root.into();
        let files = list_relative_files(&root)?;
        Ok(Self { root, files })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &BTreeSet<PathBuf> {
        &self.files
    }

    /// Splits the symmetric difference of two trees, treating `self` as the
    /// actual tree and `expected` as the golden master.
    pub fn difference(&self, expected: &DirectoryTree) -> FileSetDifference {
        FileSetDifference {
            missing: expected.files.difference(&self.files).cloned().collect(),
            extra: self.files.difference(&expected.files).cloned().collect(),
        }
    }
}

/// Recursively lists every regular file below `root`, relative to `root`.
///
/// Symbolic links are not followed and not listed. The caller is expected to
/// have checked that `root` exists.
pub fn list_relative_files(root: &Path) -> Result<BTreeSet<PathBuf>, TreeScanError> {
    let mut files = BTreeSet::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.context(WalkSnafu {
            root: root.to_path_buf(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| TreeScanError::OutsideRoot {
                root: root.to_path_buf(),
                path: entry.path().to_path_buf(),
            })?;
        files.insert(relative.to_path_buf());
    }

    debug!(
        "Found {} files under {}",
        files.len(),
        root.best_effort_display()
    );
    Ok(files)
}

#[derive(Debug, Snafu)]
pub enum TreeScanError {
    #[snafu(display("Failed to walk directory {}", root.best_effort_display()))]
    WalkError {
        root: PathBuf,
        source: walkdir::Error,
    },
    #[snafu(display(
        "Walked path {} is not below {}",
        path.best_effort_display(),
        root.best_effort_display()
    ))]
    OutsideRoot { root: PathBuf, path: PathBuf },
}
