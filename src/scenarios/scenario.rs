use std::path::{Path, PathBuf};

use hashlink::LinkedHashMap;
use saphyr::Yaml;
use tracing::debug;

use crate::scenarios::scenario_registry::yaml_key;

/// One (configuration, golden master) pairing exercised as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    label: String,
    config: PathBuf,
    expected: PathBuf,
}

impl Scenario {
    pub fn new(label: impl Into<String>, config: impl Into<PathBuf>, expected: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            config: config.into(),
            expected: expected.into(),
        }
    }

    /// Builds a scenario from its table entry. `config` defaults to
    /// `<name>.yaml` and `expected` to `<name>-output`, both relative to `base`.
    pub fn from_scenario_yaml(
        name: &str,
        scenario_data: &LinkedHashMap<Yaml, Yaml>,
        base: &Path,
    ) -> Option<Self> {
        let config = match scenario_data.get(&yaml_key("config")) {
            Some(value) => value.as_str()?.to_string(),
            None => format!("{name}.yaml"),
        };
        let expected = match scenario_data.get(&yaml_key("expected")) {
            Some(value) => value.as_str()?.to_string(),
            None => format!("{name}-output"),
        };
        debug!("Scenario '{}': config {}, expected {}", name, config, expected);

        Some(Self::new(name, base.join(config), base.join(expected)))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn config(&self) -> &Path {
        &self.config
    }

    pub fn expected(&self) -> &Path {
        &self.expected
    }
}
