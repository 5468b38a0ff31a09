use std::path::{Path, PathBuf};

use snafu::Snafu;

use crate::ext::PathDisplayExt;

/// The publishing engine under test, treated as a black box.
#[allow(async_fn_in_trait)]
pub trait Processor {
    /// Reads every file under `input` and writes the transformed tree to
    /// `output`, as configured by the file at `config`.
    async fn process(&self, config: &Path, input: &Path, output: &Path) -> Result<(), ProcessorError>;
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProcessorError {
    #[snafu(display("Failed to spawn processor command '{}'", command))]
    SpawnError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to wait for processor command '{}'", command))]
    WaitError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Processor command '{}' failed with exit code {}", command, status))]
    UnsuccessfulExecution { command: String, status: i32 },
    #[snafu(display("Processor failed on {}", path.best_effort_display()))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
}
