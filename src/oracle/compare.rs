use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use compio::fs;
use derive_more::Display;
use similar::TextDiff;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::ext::PathDisplayExt;
use crate::oracle::{DirectoryTree, FileClass, TreeScanError, classify};

/// Lines of unchanged context around each hunk of a text diff.
const DIFF_CONTEXT_LINES: usize = 3;

/// `Ok(())` when both sides are equal, otherwise the reason they are not.
pub type ComparisonResult = Result<(), Mismatch>;

/// Which of the two trees a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TreeSide {
    #[display("actual")]
    Actual,
    #[display("expected")]
    Expected,
}

/// Verifies that `actual_root` is an exact replica of the golden master at
/// `expected_root`. `label` names the scenario in every diagnostic.
pub async fn compare_trees(actual_root: &Path, expected_root: &Path, label: &str) -> ComparisonResult {
    ensure_directory(actual_root, TreeSide::Actual, label)?;
    ensure_directory(expected_root, TreeSide::Expected, label)?;

    let actual = DirectoryTree::scan(actual_root).context(ScanFailureSnafu { label })?;
    let expected = DirectoryTree::scan(expected_root).context(ScanFailureSnafu { label })?;

    let difference = actual.difference(&expected);
    if !difference.is_empty() {
        return FileSetMismatchSnafu {
            label,
            missing: difference.missing,
            extra: difference.extra,
        }
        .fail();
    }

    // BTreeSet iteration keeps the diagnostics reproducible
    for relative in actual.files() {
        compare_file(
            &actual_root.join(relative),
            &expected_root.join(relative),
            relative,
            label,
        )
        .await?;
    }

    info!(
        "Scenario '{}': {} files match the golden master",
        label,
        actual.files().len()
    );
    Ok(())
}

/// Compares a single file pair according to its [`FileClass`].
pub async fn compare_file(
    actual_path: &Path,
    expected_path: &Path,
    relative: &Path,
    label: &str,
) -> ComparisonResult {
    ensure!(
        actual_path.is_file(),
        MissingFileSnafu {
            label,
            side: TreeSide::Actual,
            relative,
        }
    );
    ensure!(
        expected_path.is_file(),
        MissingFileSnafu {
            label,
            side: TreeSide::Expected,
            relative,
        }
    );

    let class = classify(relative);
    debug!("Comparing {} as {}", relative.slash_display(), class);

    let actual = read_side(actual_path, relative, TreeSide::Actual, label).await?;
    let expected = read_side(expected_path, relative, TreeSide::Expected, label).await?;

    match class {
        FileClass::Text => compare_text(actual, expected, relative, label),
        FileClass::Binary => compare_binary(&actual, &expected, relative, label),
    }
}

fn ensure_directory(root: &Path, side: TreeSide, label: &str) -> ComparisonResult {
    ensure!(
        root.is_dir(),
        MissingDirectorySnafu {
            label,
            side,
            path: root,
        }
    );
    Ok(())
}

async fn read_side(path: &Path, relative: &Path, side: TreeSide, label: &str) -> Result<Vec<u8>, Mismatch> {
    fs::read(path).await.context(ReadFailureSnafu {
        label,
        side,
        relative,
    })
}

fn compare_text(actual: Vec<u8>, expected: Vec<u8>, relative: &Path, label: &str) -> ComparisonResult {
    let actual = String::from_utf8(actual).context(DecodeFailureSnafu {
        label,
        side: TreeSide::Actual,
        relative,
    })?;
    let expected = String::from_utf8(expected).context(DecodeFailureSnafu {
        label,
        side: TreeSide::Expected,
        relative,
    })?;

    // Literal equality, no line ending or whitespace normalization
    if actual == expected {
        return Ok(());
    }

    ContentMismatchSnafu {
        label,
        relative,
        diff: unified_diff(&expected, &actual, relative),
    }
    .fail()
}

fn compare_binary(actual: &[u8], expected: &[u8], relative: &Path, label: &str) -> ComparisonResult {
    if actual == expected {
        return Ok(());
    }

    BinaryMismatchSnafu {
        label,
        relative,
        actual_len: actual.len(),
        expected_len: expected.len(),
        first_difference: first_difference(actual, expected),
    }
    .fail()
}

/// Renders expected (old) against actual (new) in unified diff format.
pub fn unified_diff(expected: &str, actual: &str, relative: &Path) -> String {
    let relative = relative.slash_display();
    TextDiff::from_lines(expected, actual)
        .unified_diff()
        .context_radius(DIFF_CONTEXT_LINES)
        .header(&format!("expected/{relative}"), &format!("actual/{relative}"))
        .to_string()
}

/// Offset of the first differing byte. A strict prefix differs at its own length.
fn first_difference(actual: &[u8], expected: &[u8]) -> usize {
    actual
        .iter()
        .zip(expected)
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| actual.len().min(expected.len()))
}

fn format_paths(paths: &[PathBuf]) -> String {
    let joined = paths
        .iter()
        .map(|path| path.slash_display())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

/// Why an actual tree is not a replica of its golden master.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Mismatch {
    #[snafu(display(
        "The {side} output directory {} does not exist (config: {label})",
        path.best_effort_display()
    ))]
    MissingDirectory {
        label: String,
        side: TreeSide,
        path: PathBuf,
    },
    #[snafu(display(
        "File lists differ for {label}.\nMissing from actual: {}\nExtra in actual: {}",
        format_paths(missing),
        format_paths(extra)
    ))]
    FileSetMismatch {
        label: String,
        missing: Vec<PathBuf>,
        extra: Vec<PathBuf>,
    },
    #[snafu(display(
        "The {side} file {} does not exist (config: {label})",
        relative.slash_display()
    ))]
    MissingFile {
        label: String,
        side: TreeSide,
        relative: PathBuf,
    },
    #[snafu(display(
        "File content differs: {} (config: {label})\nDiff:\n{diff}",
        relative.slash_display()
    ))]
    ContentMismatch {
        label: String,
        relative: PathBuf,
        diff: String,
    },
    #[snafu(display(
        "Binary file content differs: {} (config: {label})\nActual size: {actual_len} bytes\nExpected size: {expected_len} bytes\nFirst difference at byte {first_difference}",
        relative.slash_display()
    ))]
    BinaryMismatch {
        label: String,
        relative: PathBuf,
        actual_len: usize,
        expected_len: usize,
        first_difference: usize,
    },
    #[snafu(display(
        "The {side} file {} is not valid UTF-8 text (config: {label})",
        relative.slash_display()
    ))]
    DecodeFailure {
        label: String,
        side: TreeSide,
        relative: PathBuf,
        source: FromUtf8Error,
    },
    #[snafu(display(
        "Failed to read {side} file {} (config: {label})",
        relative.slash_display()
    ))]
    ReadFailure {
        label: String,
        side: TreeSide,
        relative: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to list files (config: {label})"))]
    ScanFailure {
        label: String,
        source: TreeScanError,
    },
}

impl Mismatch {
    /// The scenario this mismatch is attributed to.
    pub fn label(&self) -> &str {
        match self {
            Mismatch::MissingDirectory { label, .. }
            | Mismatch::FileSetMismatch { label, .. }
            | Mismatch::MissingFile { label, .. }
            | Mismatch::ContentMismatch { label, .. }
            | Mismatch::BinaryMismatch { label, .. }
            | Mismatch::DecodeFailure { label, .. }
            | Mismatch::ReadFailure { label, .. }
            | Mismatch::ScanFailure { label, .. } => label,
        }
    }
}
