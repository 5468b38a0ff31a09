use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::scenarios::SCENARIO_FILE_NAME;

/// Golden-master verification for publishmd output trees.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run every declared scenario and compare it with its golden master
    Verify {
        /// Directory the scenario file is resolved against
        #[clap(long, short, default_value = ".")]
        root: PathBuf,

        /// The scenario table
        #[clap(long, short, default_value = SCENARIO_FILE_NAME)]
        scenarios: PathBuf,

        /// Also run the processor on an empty input
        #[clap(long)]
        check_empty_input: bool,
    },
    /// Compare a single output tree with a golden master
    Compare {
        actual: PathBuf,
        expected: PathBuf,

        /// Name used in diagnostics
        #[clap(long, default_value = "unknown")]
        label: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<tracing::Level> {
        match self {
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Silent => None,
        }
    }
}
