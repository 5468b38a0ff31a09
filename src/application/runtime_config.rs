use std::path::PathBuf;

use crate::cli::{Cli, Command};

#[derive(Debug, Clone)]
pub enum RuntimeConfig {
    Verify {
        root: PathBuf,
        scenario_file: PathBuf,
        check_empty_input: bool,
    },
    Compare {
        actual: PathBuf,
        expected: PathBuf,
        label: String,
    },
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        match cli.command {
            Command::Verify {
                root,
                scenarios,
                check_empty_input,
            } => Self::Verify {
                root,
                scenario_file: scenarios,
                check_empty_input,
            },
            Command::Compare {
                actual,
                expected,
                label,
            } => Self::Compare {
                actual,
                expected,
                label,
            },
        }
    }
}
