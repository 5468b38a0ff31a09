use std::path::{Path, PathBuf};

use snafu::prelude::*;
use tracing::{info, warn};

use crate::ext::PathDisplayExt;
use crate::oracle::{Mismatch, TreeScanError, compare_trees, list_relative_files};
use crate::processor::{Processor, ProcessorError};
use crate::runner::{ScenarioOutcome, ScratchError, ScratchSpace, VerificationReport};
use crate::scenarios::Scenario;

/// Label under which the empty-input check is reported.
pub const EMPTY_INPUT_LABEL: &str = "empty-input";

/// Drives the processor over the shared corpus once per scenario and checks
/// each result against its golden master.
pub struct ScenarioRunner<P> {
    processor: P,
    corpus: PathBuf,
}

impl<P: Processor> ScenarioRunner<P> {
    pub fn new(processor: P, corpus: impl Into<PathBuf>) -> Self {
        Self {
            processor,
            corpus: corpus.into(),
        }
    }

    /// Runs every scenario in order. A failing scenario never prevents the
    /// following ones from running.
    pub async fn run_all(&self, scenarios: &[Scenario]) -> VerificationReport {
        let mut report = VerificationReport::default();

        for scenario in scenarios {
            info!("Running scenario '{}'", scenario.label());
            let result = self.run_scenario(scenario).await;
            if let Err(error) = &result {
                warn!("Scenario '{}' failed: {}", scenario.label(), error);
            }
            report.push(ScenarioOutcome::new(scenario.label(), result));
        }

        report
    }

    /// Copies the corpus into a private scratch space, processes it with the
    /// scenario's config and compares the output with the golden master.
    pub async fn run_scenario(&self, scenario: &Scenario) -> Result<(), ScenarioError> {
        let label = scenario.label();
        let scratch = ScratchSpace::with_corpus(&self.corpus).context(ScratchFailureSnafu { label })?;

        self.processor
            .process(scenario.config(), scratch.input(), scratch.output())
            .await
            .context(ProcessorFailureSnafu { label })?;

        compare_trees(scratch.output(), scenario.expected(), label).await?;
        Ok(())
    }

    /// Processes an empty input tree. The output directory must be created
    /// and must hold no files with `primary_extension`.
    pub async fn check_empty_input(&self, config: &Path, primary_extension: &str) -> Result<(), ScenarioError> {
        let label = EMPTY_INPUT_LABEL;
        let scratch = ScratchSpace::empty().context(ScratchFailureSnafu { label })?;

        self.processor
            .process(config, scratch.input(), scratch.output())
            .await
            .context(ProcessorFailureSnafu { label })?;

        ensure!(
            scratch.output().is_dir(),
            OutputMissingSnafu {
                label,
                path: scratch.output(),
            }
        );

        let primary_outputs = list_relative_files(scratch.output())
            .context(ScanFailureSnafu { label })?
            .into_iter()
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext == primary_extension)
            })
            .collect::<Vec<_>>();

        ensure!(
            primary_outputs.is_empty(),
            UnexpectedOutputsSnafu {
                label,
                extension: primary_extension,
                files: primary_outputs,
            }
        );
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ScenarioError {
    #[snafu(display("Could not prepare scenario '{label}'"))]
    ScratchFailure { label: String, source: ScratchError },
    #[snafu(display("Processor failed for scenario '{label}'"))]
    ProcessorFailure {
        label: String,
        source: ProcessorError,
    },
    #[snafu(transparent)]
    Comparison { source: Mismatch },
    #[snafu(display(
        "Output directory {} was not created (config: {label})",
        path.best_effort_display()
    ))]
    OutputMissing { label: String, path: PathBuf },
    #[snafu(display(
        "Empty input produced {} .{extension} files (config: {label}): {}",
        files.len(),
        files.iter().map(|f| f.slash_display()).collect::<Vec<_>>().join(", ")
    ))]
    UnexpectedOutputs {
        label: String,
        extension: String,
        files: Vec<PathBuf>,
    },
    #[snafu(display("Failed to list output files (config: {label})"))]
    ScanFailure {
        label: String,
        source: TreeScanError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use walkdir::WalkDir;

    /// Turns every `.md` into a `.qmd` with a config banner, copies the rest.
    struct RenamingProcessor;

    impl Processor for RenamingProcessor {
        async fn process(&self, config: &Path, input: &Path, output: &Path) -> Result<(), ProcessorError> {
            let banner = config
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            fs::create_dir_all(output).map_err(io_error(output))?;
            for entry in WalkDir::new(input) {
                let entry = entry.map_err(|e| ProcessorError::IoError {
                    path: input.to_path_buf(),
                    source: e.into(),
                })?;
                let relative = entry.path().strip_prefix(input).expect("entry below input");
                let target = output.join(relative);
                if entry.file_type().is_dir() {
                    fs::create_dir_all(&target).map_err(io_error(&target))?;
                } else if relative.extension().is_some_and(|ext| ext == "md") {
                    let body = fs::read_to_string(entry.path()).map_err(io_error(entry.path()))?;
                    let target = target.with_extension("qmd");
                    fs::write(&target, format!("<!-- {banner} -->\n{body}"))
                        .map_err(io_error(&target))?;
                } else {
                    fs::copy(entry.path(), &target).map_err(io_error(&target))?;
                }
            }
            Ok(())
        }
    }

    fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ProcessorError + use<> {
        let path = path.to_path_buf();
        move |source| ProcessorError::IoError { path, source }
    }

    struct FailingProcessor;

    impl Processor for FailingProcessor {
        async fn process(&self, _config: &Path, input: &Path, _output: &Path) -> Result<(), ProcessorError> {
            Err(ProcessorError::IoError {
                path: input.to_path_buf(),
                source: std::io::Error::other("engine crashed"),
            })
        }
    }

    /// Always emits an index page, even for an empty input.
    struct IndexingProcessor;

    impl Processor for IndexingProcessor {
        async fn process(&self, _config: &Path, _input: &Path, output: &Path) -> Result<(), ProcessorError> {
            fs::create_dir_all(output).expect("Failed to create output");
            fs::write(output.join("index.qmd"), "# Index\n").expect("Failed to write index");
            Ok(())
        }
    }

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        /// Corpus `{a.md, img.png}` with golden masters for `config1` and `config2`.
        fn new() -> Self {
            let dir = TempDir::new().expect("Failed to create temp directory");
            let root = dir.path();
            for sub in ["example", "config1-output", "config2-output"] {
                fs::create_dir_all(root.join(sub)).expect("Failed to create dirs");
            }
            fs::write(root.join("example/a.md"), "# A\n").expect("Failed to write");
            fs::write(root.join("example/img.png"), b"\x89PNG\x00").expect("Failed to write");
            for config in ["config1", "config2"] {
                fs::write(root.join(format!("{config}.yaml")), "{}\n").expect("Failed to write");
                let golden = root.join(format!("{config}-output"));
                fs::write(golden.join("a.qmd"), format!("<!-- {config} -->\n# A\n"))
                    .expect("Failed to write");
                fs::write(golden.join("img.png"), b"\x89PNG\x00").expect("Failed to write");
            }
            Self { dir }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn scenario(&self, name: &str) -> Scenario {
            Scenario::new(
                name,
                self.root().join(format!("{name}.yaml")),
                self.root().join(format!("{name}-output")),
            )
        }

        fn runner<P: Processor>(&self, processor: P) -> ScenarioRunner<P> {
            ScenarioRunner::new(processor, self.root().join("example"))
        }
    }

    #[compio::test]
    async fn matching_scenarios_pass() {
        let fixture = Fixture::new();
        let scenarios = [fixture.scenario("config1"), fixture.scenario("config2")];

        let report = fixture.runner(RenamingProcessor).run_all(&scenarios).await;

        assert!(report.is_success());
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 0);
    }

    #[compio::test]
    async fn failing_scenario_does_not_stop_the_batch() {
        let fixture = Fixture::new();
        fs::write(fixture.root().join("config1-output/a.qmd"), "<!-- config1 -->\n# B\n")
            .expect("Failed to write");
        let scenarios = [fixture.scenario("config1"), fixture.scenario("config2")];

        let report = fixture.runner(RenamingProcessor).run_all(&scenarios).await;

        assert_eq!(report.outcomes().len(), 2);
        assert_eq!(report.failed(), 1);
        let failure = &report.outcomes()[0];
        assert_eq!(failure.label(), "config1");
        assert!(matches!(
            failure.result(),
            Err(ScenarioError::Comparison {
                source: Mismatch::ContentMismatch { .. }
            })
        ));
        assert!(report.outcomes()[1].is_success());
    }

    #[compio::test]
    async fn missing_golden_master_fails_the_scenario() {
        let fixture = Fixture::new();
        let scenario = fixture.scenario("config3");

        let result = fixture.runner(RenamingProcessor).run_scenario(&scenario).await;

        let error = result.expect_err("Expected a failure");
        assert!(matches!(
            error,
            ScenarioError::Comparison {
                source: Mismatch::MissingDirectory { .. }
            }
        ));
        assert!(error.to_string().contains("config3"));
    }

    #[compio::test]
    async fn processor_failure_is_attributed_to_the_scenario() {
        let fixture = Fixture::new();

        let result = fixture
            .runner(FailingProcessor)
            .run_scenario(&fixture.scenario("config2"))
            .await;

        let error = result.expect_err("Expected a failure");
        assert!(matches!(error, ScenarioError::ProcessorFailure { .. }));
        assert!(error.to_string().contains("'config2'"));
    }

    #[compio::test]
    async fn corpus_is_not_modified_by_scenarios() {
        let fixture = Fixture::new();
        let before = list_relative_files(&fixture.root().join("example")).expect("Failed to list");

        fixture
            .runner(RenamingProcessor)
            .run_all(&[fixture.scenario("config1")])
            .await;

        let after = list_relative_files(&fixture.root().join("example")).expect("Failed to list");
        assert_eq!(before, after);
    }

    #[compio::test]
    async fn empty_input_yields_no_primary_outputs() {
        let fixture = Fixture::new();

        let result = fixture
            .runner(RenamingProcessor)
            .check_empty_input(&fixture.root().join("config1.yaml"), "qmd")
            .await;

        assert!(result.is_ok());
    }

    #[compio::test]
    async fn empty_input_check_rejects_primary_outputs() {
        let fixture = Fixture::new();

        let result = fixture
            .runner(IndexingProcessor)
            .check_empty_input(&fixture.root().join("config1.yaml"), "qmd")
            .await;

        match result {
            Err(ScenarioError::UnexpectedOutputs { files, .. }) => {
                assert_eq!(files, vec![PathBuf::from("index.qmd")]);
            }
            other => panic!("Expected UnexpectedOutputs, got {other:?}"),
        }
    }

    #[compio::test]
    async fn empty_input_check_requires_output_directory() {
        struct SilentProcessor;

        impl Processor for SilentProcessor {
            async fn process(&self, _: &Path, _: &Path, _: &Path) -> Result<(), ProcessorError> {
                Ok(())
            }
        }

        let fixture = Fixture::new();

        let result = fixture
            .runner(SilentProcessor)
            .check_empty_input(&fixture.root().join("config1.yaml"), "qmd")
            .await;

        assert!(matches!(result, Err(ScenarioError::OutputMissing { .. })));
    }
}
