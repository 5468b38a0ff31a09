use std::path::Path;

use colored::Colorize;
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::oracle::{Mismatch, compare_trees};
use crate::processor::CommandProcessor;
use crate::runner::{EMPTY_INPUT_LABEL, ScenarioOutcome, ScenarioRunner};
use crate::scenarios::{ScenarioRegistry, ScenarioRegistryError};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        match app_config.into() {
            RuntimeConfig::Verify {
                root,
                scenario_file,
                check_empty_input,
            } => Self::verify(&root, &scenario_file, check_empty_input).await,
            RuntimeConfig::Compare {
                actual,
                expected,
                label,
            } => Self::compare(&actual, &expected, &label).await,
        }
    }

    async fn verify(root: &Path, scenario_file: &Path, check_empty_input: bool) -> Result<(), ApplicationError> {
        let registry = ScenarioRegistry::read(root, scenario_file)
            .await
            .context(ScenarioTableSnafu)?;
        debug!("Loaded scenarios: {:?}", registry);

        let runner = ScenarioRunner::new(
            CommandProcessor::new(registry.processor_command()),
            registry.corpus(),
        );
        let mut report = runner.run_all(registry.scenarios()).await;

        if check_empty_input && let Some(first) = registry.scenarios().first() {
            info!("Checking empty input with config of '{}'", first.label());
            let result = runner
                .check_empty_input(first.config(), registry.primary_extension())
                .await;
            report.push(ScenarioOutcome::new(EMPTY_INPUT_LABEL, result));
        }

        println!("{report}");
        ensure!(
            report.is_success(),
            VerificationFailedSnafu {
                failed: report.failed(),
                total: report.outcomes().len(),
            }
        );
        Ok(())
    }

    async fn compare(actual: &Path, expected: &Path, label: &str) -> Result<(), ApplicationError> {
        compare_trees(actual, expected, label)
            .await
            .context(ComparisonSnafu)?;
        println!("{} {}", "PASS".green().bold(), label);
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading the scenario table"))]
    ScenarioTableError { source: ScenarioRegistryError },
    #[snafu(display("Output tree does not match the golden master"))]
    ComparisonError { source: Mismatch },
    #[snafu(display("{} of {} scenarios failed", failed, total))]
    VerificationFailed { failed: usize, total: usize },
}
