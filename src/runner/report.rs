use std::error::Error;
use std::fmt;

use colored::{ColoredString, Colorize};

use crate::runner::ScenarioError;

/// Verdict for a single scenario.
#[derive(Debug)]
pub struct ScenarioOutcome {
    label: String,
    result: Result<(), ScenarioError>,
}

impl ScenarioOutcome {
    pub fn new(label: impl Into<String>, result: Result<(), ScenarioError>) -> Self {
        Self {
            label: label.into(),
            result,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn result(&self) -> &Result<(), ScenarioError> {
        &self.result
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a batch of scenarios, in the order they ran.
#[derive(Debug, Default)]
pub struct VerificationReport {
    outcomes: Vec<ScenarioOutcome>,
}

impl VerificationReport {
    pub fn push(&mut self, outcome: ScenarioOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[ScenarioOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    pub fn passed(&self) -> usize {
        self.outcomes.len() - self.failed()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(()) => writeln!(f, "{} {}", "PASS".green().bold(), outcome.label)?,
                Err(error) => {
                    writeln!(f, "{} {}", "FAIL".red().bold(), outcome.label)?;
                    for line in error.to_string().lines() {
                        writeln!(f, "    {}", colorize_diagnostic_line(line))?;
                    }
                    for cause in causes(error) {
                        writeln!(f, "    {} {}", "Caused by:".yellow(), cause)?;
                    }
                }
            }
        }

        let summary = format!(
            "{} scenarios: {} passed, {} failed",
            self.outcomes.len(),
            self.passed(),
            self.failed()
        );
        if self.is_success() {
            write!(f, "{}", summary.green())
        } else {
            write!(f, "{}", summary.red())
        }
    }
}

/// Messages of the source chain below `error`. A cause whose text already
/// appears in the message above it is left out.
fn causes(error: &ScenarioError) -> Vec<String> {
    let mut previous = error.to_string();
    let mut messages = Vec::new();

    for cause in std::iter::successors(error.source(), |&cause| cause.source()) {
        let message = cause.to_string();
        if !previous.contains(&message) {
            messages.push(message.clone());
        }
        previous = message;
    }

    messages
}

fn colorize_diagnostic_line(line: &str) -> ColoredString {
    if line.starts_with("+++") || line.starts_with("---") {
        line.bold()
    } else if line.starts_with('+') {
        line.green()
    } else if line.starts_with('-') {
        line.red()
    } else if line.starts_with("@@") {
        line.cyan()
    } else {
        line.normal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{Mismatch, TreeSide};
    use crate::processor::ProcessorError;
    use std::io;
    use std::path::PathBuf;

    fn content_mismatch(label: &str) -> ScenarioError {
        ScenarioError::Comparison {
            source: Mismatch::ContentMismatch {
                label: label.to_string(),
                relative: PathBuf::from("a.qmd"),
                diff: "--- expected/a.qmd\n+++ actual/a.qmd\n@@ -1 +1 @@\n-old\n+new\n".to_string(),
            },
        }
    }

    #[test]
    fn rendering_includes_the_root_cause() {
        let mut report = VerificationReport::default();
        report.push(ScenarioOutcome::new(
            "config1",
            Err(ScenarioError::Comparison {
                source: Mismatch::ReadFailure {
                    label: "config1".to_string(),
                    side: TreeSide::Actual,
                    relative: PathBuf::from("a.qmd"),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "access to a.qmd denied"),
                },
            }),
        ));

        let rendered = report.to_string();

        assert!(rendered.contains("Failed to read actual file a.qmd (config: config1)"));
        assert!(rendered.contains("Caused by:"));
        assert!(rendered.contains("access to a.qmd denied"));
    }

    #[test]
    fn rendering_walks_nested_processor_causes() {
        let mut report = VerificationReport::default();
        report.push(ScenarioOutcome::new(
            "config2",
            Err(ScenarioError::ProcessorFailure {
                label: "config2".to_string(),
                source: ProcessorError::SpawnError {
                    command: "publishmd".to_string(),
                    source: io::Error::new(io::ErrorKind::NotFound, "publishmd: not found"),
                },
            }),
        ));

        let rendered = report.to_string();

        assert!(rendered.contains("Processor failed for scenario 'config2'"));
        assert!(rendered.contains("Failed to spawn processor command 'publishmd'"));
        assert!(rendered.contains("publishmd: not found"));
    }

    #[test]
    fn causes_already_in_the_message_are_not_repeated() {
        let error = content_mismatch("config1");

        assert!(causes(&error).is_empty());
    }

    #[test]
    fn counts_passes_and_failures() {
        let mut report = VerificationReport::default();
        report.push(ScenarioOutcome::new("config1", Ok(())));
        report.push(ScenarioOutcome::new("config2", Err(content_mismatch("config2"))));
        report.push(ScenarioOutcome::new("config3", Ok(())));

        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        let failed: Vec<_> = report.failures().map(ScenarioOutcome::label).collect();
        assert_eq!(failed, vec!["config2"]);
    }

    #[test]
    fn empty_report_is_successful() {
        let report = VerificationReport::default();

        assert!(report.is_success());
        assert_eq!(report.passed(), 0);
    }

    #[test]
    fn rendering_includes_labels_and_diagnostics() {
        let mut report = VerificationReport::default();
        report.push(ScenarioOutcome::new("config1", Ok(())));
        report.push(ScenarioOutcome::new("config2", Err(content_mismatch("config2"))));

        let rendered = report.to_string();

        assert!(rendered.contains("PASS"));
        assert!(rendered.contains("FAIL"));
        assert!(rendered.contains("config1"));
        assert!(rendered.contains("File content differs: a.qmd (config: config2)"));
        assert!(rendered.contains("-old"));
        assert!(rendered.contains("+new"));
        assert!(rendered.contains("2 scenarios: 1 passed, 1 failed"));
    }
}
