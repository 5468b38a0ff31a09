use std::borrow::Cow;
use std::path::{Path, PathBuf};

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::ext::PathDisplayExt;
use crate::scenarios::Scenario;

pub const SCENARIO_FILE_NAME: &str = "scenarios.yaml";
const DEFAULT_PRIMARY_EXTENSION: &str = "qmd";

pub(crate) fn yaml_key(name: &str) -> Yaml<'_> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

/// Explicit table of scenarios together with the shared corpus and the
/// processor that produces each actual tree.
#[derive(Debug, Clone)]
pub struct ScenarioRegistry {
    corpus: PathBuf,
    processor_command: String,
    primary_extension: String,
    scenarios: Vec<Scenario>,
}

impl ScenarioRegistry {
    pub async fn read(root: &Path, scenario_file: &Path) -> Result<Self, ScenarioRegistryError> {
        Self::from_path(root.join(scenario_file)).await
    }

    /// Loads the table at `path`. Relative paths inside it resolve against
    /// the directory containing the file.
    pub async fn from_path(path: PathBuf) -> Result<Self, ScenarioRegistryError> {
        debug!("Opening scenario file: {}", path.best_effort_display());
        let bytes = fs::read(&path).await.context(ReadSnafu {
            file_path: path.best_effort_display(),
        })?;
        debug!("Successfully read scenario file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(DecodeSnafu {
            file_path: path.best_effort_display(),
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&contents, base)
    }

    pub fn parse(contents: &str, base: &Path) -> Result<Self, ScenarioRegistryError> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let document = documents
            .first()
            .ok_or(ScenarioRegistryError::MalformedConfig)?;
        let top_level = document
            .as_mapping()
            .ok_or(ScenarioRegistryError::TopLevelNotMap)?;

        let corpus = top_level
            .get(&yaml_key("corpus"))
            .and_then(|v| v.as_str())
            .ok_or(ScenarioRegistryError::MissingCorpus)?;

        let processor_command = top_level
            .get(&yaml_key("processor"))
            .ok_or(ScenarioRegistryError::MissingProcessorCommand)?
            .as_mapping()
            .ok_or(ScenarioRegistryError::ProcessorNotMap)?
            .get(&yaml_key("command"))
            .and_then(|v| v.as_str())
            .ok_or(ScenarioRegistryError::MissingProcessorCommand)?;

        let primary_extension = top_level
            .get(&yaml_key("primaryExtension"))
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_PRIMARY_EXTENSION)
            .trim_start_matches('.');

        let scenarios = Self::parse_scenarios_from_yaml(top_level, base)?;
        ensure!(!scenarios.is_empty(), NoScenariosSnafu);

        Ok(Self {
            corpus: base.join(corpus),
            processor_command: processor_command.to_string(),
            primary_extension: primary_extension.to_string(),
            scenarios,
        })
    }

    /// Every declared entry must become a scenario. A malformed entry fails
    /// the whole table.
    fn parse_scenarios_from_yaml(
        top_level: &LinkedHashMap<Yaml, Yaml>,
        base: &Path,
    ) -> Result<Vec<Scenario>, ScenarioRegistryError> {
        let empty = LinkedHashMap::new();
        top_level
            .get(&yaml_key("scenarios"))
            .unwrap_or(&Yaml::Mapping(LinkedHashMap::new()))
            .as_mapping()
            .ok_or(ScenarioRegistryError::ScenariosNotMap)?
            .iter()
            .map(|(key, value)| -> Result<Scenario, ScenarioRegistryError> {
                let name = key.as_str().context(InvalidScenarioSnafu {
                    name: format!("{key:?}"),
                })?;
                let scenario_data = match value {
                    Yaml::Mapping(scenario_data) => scenario_data,
                    Yaml::Value(Scalar::Null) => &empty,
                    _ => return InvalidScenarioSnafu { name }.fail(),
                };
                Scenario::from_scenario_yaml(name, scenario_data, base).context(InvalidScenarioSnafu { name })
            })
            .collect()
    }

    pub fn corpus(&self) -> &Path {
        &self.corpus
    }

    pub fn processor_command(&self) -> &str {
        &self.processor_command
    }

    pub fn primary_extension(&self) -> &str {
        &self.primary_extension
    }

    /// Scenarios in declaration order.
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }
}

#[derive(Debug, Snafu)]
pub enum ScenarioRegistryError {
    #[snafu(display("Failed to read the scenario file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("The scenario file {} is not valid UTF-8", file_path))]
    DecodeError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the scenario file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted scenario file"))]
    MalformedConfig,
    #[snafu(display("Top level of the scenario file should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Scenarios section should be a map"))]
    ScenariosNotMap,
    #[snafu(display("Processor section should be a map"))]
    ProcessorNotMap,
    #[snafu(display("The scenario file does not name an input corpus"))]
    MissingCorpus,
    #[snafu(display("The scenario file does not define processor.command"))]
    MissingProcessorCommand,
    #[snafu(display(
        "Scenario '{}' must map to a table whose config and expected entries are strings",
        name
    ))]
    InvalidScenario { name: String },
    #[snafu(display("No scenarios declared"))]
    NoScenarios,
}
