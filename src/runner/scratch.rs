use std::fs;
use std::path::{Path, PathBuf};

use snafu::prelude::*;
use tempfile::TempDir;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::ext::PathDisplayExt;

const SCRATCH_PREFIX: &str = "publishmd-oracle-";
const INPUT_DIR: &str = "input";
const OUTPUT_DIR: &str = "actual_output";

/// Private working area for one scenario, removed when dropped.
///
/// `input()` exists once constructed. `output()` is only a path; creating it
/// is up to the processor.
#[derive(Debug)]
pub struct ScratchSpace {
    temp_dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl ScratchSpace {
    /// Scratch space whose input is a fresh copy of `corpus`.
    pub fn with_corpus(corpus: &Path) -> Result<Self, ScratchError> {
        ensure!(
            corpus.is_dir(),
            MissingCorpusSnafu {
                path: corpus.to_path_buf()
            }
        );

        let scratch = Self::create()?;
        let copied = copy_tree(corpus, &scratch.input)?;
        debug!(
            "Copied {} files from {} into {}",
            copied,
            corpus.best_effort_display(),
            scratch.input.best_effort_display()
        );
        Ok(scratch)
    }

    /// Scratch space with an empty input directory.
    pub fn empty() -> Result<Self, ScratchError> {
        let scratch = Self::create()?;
        fs::create_dir_all(&scratch.input).context(CopySnafu {
            path: scratch.input.clone(),
        })?;
        Ok(scratch)
    }

    fn create() -> Result<Self, ScratchError> {
        let temp_dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .context(CreateSnafu)?;
        let input = temp_dir.path().join(INPUT_DIR);
        let output = temp_dir.path().join(OUTPUT_DIR);
        Ok(Self {
            temp_dir,
            input,
            output,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

/// Recreates the directory structure of `source` under `destination` and
/// copies every regular file. Symbolic links are followed, so a linked file
/// lands in the copy with its target's content. Returns the number of files
/// copied.
fn copy_tree(source: &Path, destination: &Path) -> Result<usize, ScratchError> {
    let mut copied = 0;

    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.context(WalkSnafu)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| ScratchError::OutsideCorpus {
                corpus: source.to_path_buf(),
                path: entry.path().to_path_buf(),
            })?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).context(CopySnafu { path: target })?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target).context(CopySnafu { path: target })?;
            copied += 1;
        } else {
            warn!("Skipping {}: not a regular file", entry.path().best_effort_display());
        }
    }

    Ok(copied)
}

#[derive(Debug, Snafu)]
pub enum ScratchError {
    #[snafu(display("Failed to create a scratch directory"))]
    CreateError { source: std::io::Error },
    #[snafu(display("Input corpus {} does not exist", path.best_effort_display()))]
    MissingCorpus { path: PathBuf },
    #[snafu(display("Failed to walk the input corpus"))]
    WalkError { source: walkdir::Error },
    #[snafu(display(
        "Walked path {} is not below the corpus {}",
        path.best_effort_display(),
        corpus.best_effort_display()
    ))]
    OutsideCorpus { corpus: PathBuf, path: PathBuf },
    #[snafu(display("Failed to populate {}", path.best_effort_display()))]
    CopyError {
        path: PathBuf,
        source: std::io::Error,
    },
}
