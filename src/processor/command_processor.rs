use std::path::Path;
use std::process::Stdio;

use colored::Colorize;
use compio::io::compat::AsyncStream;
use compio::process::{ChildStderr, ChildStdout, Command};
use futures::io::{AsyncBufRead, BufReader};
use futures::{AsyncBufReadExt, StreamExt};
use snafu::prelude::*;
use tracing::{debug, info};

use super::processor::{SpawnSnafu, UnsuccessfulExecutionSnafu, WaitSnafu};
use super::{Processor, ProcessorError};

const CONFIG_PLACEHOLDER: &str = "{config}";
const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Runs the processor as an external shell command.
///
/// The template may reference `{config}`, `{input}` and `{output}`; each is
/// replaced by the shell-quoted path before the command is spawned.
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    template: String,
}

#[derive(Debug, Clone, Copy)]
enum OutputStream {
    Stdout,
    Stderr,
}

impl CommandProcessor {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn render(&self, config: &Path, input: &Path, output: &Path) -> String {
        self.template
            .replace(CONFIG_PLACEHOLDER, &shell_quote(config))
            .replace(INPUT_PLACEHOLDER, &shell_quote(input))
            .replace(OUTPUT_PLACEHOLDER, &shell_quote(output))
    }

    /// Returns the shell and its arguments for running `command`.
    fn full_command(command: &str) -> (&'static str, Vec<&str>) {
        #[cfg(target_family = "windows")]
        {
            ("cmd", vec!["/C", command])
        }
        #[cfg(target_family = "unix")]
        {
            ("sh", vec!["-c", command])
        }
    }

    /// Creates the command with piped output; conversions from `Stdio` cannot fail.
    fn create_command(command: &str) -> Command {
        let (shell, args) = Self::full_command(command);
        let mut cmd = Command::new(shell);
        cmd.args(args);
        let _ = cmd.stdin(Stdio::null());
        let _ = cmd.stdout(Stdio::piped());
        let _ = cmd.stderr(Stdio::piped());
        cmd
    }
}

impl Processor for CommandProcessor {
    async fn process(&self, config: &Path, input: &Path, output: &Path) -> Result<(), ProcessorError> {
        let command = self.render(config, input, output);
        let prefix = config
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "processor".to_string());
        debug!("Running processor command: {}", command);

        let mut handle = Self::create_command(&command)
            .spawn()
            .context(SpawnSnafu {
                command: command.clone(),
            })?;

        let stdout = handle.stdout.take();
        let stderr = handle.stderr.take();
        let (status, (), ()) = futures::join!(
            handle.wait(),
            relay_stdout(stdout, &prefix),
            relay_stderr(stderr, &prefix)
        );
        let status = status.context(WaitSnafu {
            command: command.clone(),
        })?;

        ensure!(
            status.success(),
            UnsuccessfulExecutionSnafu {
                command,
                status: status.code().unwrap_or(-1),
            }
        );
        info!("Processor for '{}' completed successfully", prefix);
        Ok(())
    }
}

#[cfg(target_family = "unix")]
fn shell_quote(path: &Path) -> String {
    let raw = path.to_string_lossy();
    format!("'{}'", raw.replace('\'', r"'\''"))
}

#[cfg(target_family = "windows")]
fn shell_quote(path: &Path) -> String {
    format!("\"{}\"", path.to_string_lossy())
}

async fn relay_stdout(stdout: Option<ChildStdout>, prefix: &str) {
    if let Some(stdout) = stdout {
        let reader = BufReader::new(AsyncStream::new(stdout));
        relay_lines(reader, prefix, OutputStream::Stdout).await;
    }
}

async fn relay_stderr(stderr: Option<ChildStderr>, prefix: &str) {
    if let Some(stderr) = stderr {
        let reader = BufReader::new(AsyncStream::new(stderr));
        relay_lines(reader, prefix, OutputStream::Stderr).await;
    }
}

async fn relay_lines<R: AsyncBufRead + Unpin>(reader: R, prefix: &str, stream: OutputStream) {
    let mut lines = reader.lines();

    while let Some(line_result) = lines.next().await {
        match line_result {
            Ok(line) => {
                if !line.trim().is_empty() {
                    print_from_processor(prefix, stream, line.trim_end());
                }
            }
            Err(e) => {
                debug!("Error reading {:?} of processor '{}': {}", stream, prefix, e);
            }
        }
    }
}

fn print_from_processor(prefix: &str, stream: OutputStream, line: &str) {
    let tag = format!("[{prefix}]");
    match stream {
        OutputStream::Stdout => println!("{} {}", tag.cyan(), line),
        OutputStream::Stderr => eprintln!("{} {}", tag.yellow(), line),
    }
}
