mod scenario;
mod scenario_registry;

pub use scenario::Scenario;
pub use scenario_registry::{SCENARIO_FILE_NAME, ScenarioRegistry, ScenarioRegistryError};
