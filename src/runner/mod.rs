//! Scenario execution: scratch spaces, the processor run and the oracle
//! verdict for each (configuration, golden master) pair.

mod report;
mod scenario_runner;
mod scratch;

pub use report::{ScenarioOutcome, VerificationReport};
pub use scenario_runner::{EMPTY_INPUT_LABEL, ScenarioError, ScenarioRunner};
pub use scratch::{ScratchError, ScratchSpace};
