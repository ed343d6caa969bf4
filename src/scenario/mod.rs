//! YAML-defined console test scenarios

pub mod config;
pub mod runner;

pub use config::Scenario;
pub use runner::{run_scenario, ScenarioOutcome};
