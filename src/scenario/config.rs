//! Scenario configuration types
//!
//! Defines the data structures for deserializing YAML scenarios.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::harness::{CommandStep, Indicator};

/// A complete console test scenario loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct Scenario {
    /// Name of the scenario
    pub name: String,
    /// Optional description of what the scenario exercises
    pub description: Option<String>,
    /// How to start the emulator
    pub emulator: EmulatorTarget,
    /// Warm-up wait before the first command, in seconds
    #[serde(default = "default_boot_delay")]
    pub boot_delay_secs: f64,
    /// Hard bound on draining, in seconds
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_secs: f64,
    /// Grace period before a forced kill, in seconds
    #[serde(default = "default_grace_period")]
    pub grace_period_secs: f64,
    /// The ordered command script
    pub steps: Vec<ScenarioStep>,
    /// Indicator phrases to look for in the captured output
    #[serde(default)]
    pub indicators: Vec<IndicatorEntry>,
}

fn default_boot_delay() -> f64 {
    6.0
}
fn default_drain_timeout() -> f64 {
    5.0
}
fn default_grace_period() -> f64 {
    2.0
}

/// The emulator process to run for this scenario
#[derive(Deserialize, Debug)]
pub struct EmulatorTarget {
    /// Program to run (bare names are resolved via PATH)
    pub program: String,
    /// Arguments to pass to the program
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory for the emulator, relative paths resolved against
    /// the scenario file
    pub working_dir: Option<PathBuf>,
}

/// One scripted command
#[derive(Deserialize, Debug)]
pub struct ScenarioStep {
    /// Command text to send
    pub send: String,
    /// Delay after sending, in seconds (may be fractional)
    #[serde(default)]
    pub delay_secs: f64,
}

impl ScenarioStep {
    pub fn to_command_step(&self) -> CommandStep {
        CommandStep::new(self.send.clone(), Duration::from_secs_f64(self.delay_secs))
    }
}

/// One named indicator phrase
#[derive(Deserialize, Debug)]
pub struct IndicatorEntry {
    pub name: String,
    pub phrase: String,
}

impl IndicatorEntry {
    pub fn to_indicator(&self) -> Indicator {
        Indicator::new(self.name.clone(), self.phrase.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_scenario() {
        let scenario: Scenario = serde_yaml::from_str(
            r#"
name: animation smoke test
description: drive the guest animation controls and check for a clean stop
emulator:
  program: make
  args: [qemu]
  working_dir: /src/guest
boot_delay_secs: 6
drain_timeout_secs: 5
steps:
  - send: animctl start
    delay_secs: 2
  - send: animctl view
    delay_secs: 3
  - send: animctl stop
    delay_secs: 2
  - send: exit
    delay_secs: 1
indicators:
  - name: stopped
    phrase: "Stopped."
  - name: exited
    phrase: exit
"#,
        )
        .unwrap();

        assert_eq!(scenario.name, "animation smoke test");
        assert_eq!(scenario.emulator.program, "make");
        assert_eq!(scenario.steps.len(), 4);
        assert_eq!(scenario.indicators.len(), 2);

        let step = scenario.steps[1].to_command_step();
        assert_eq!(step.text, "animctl view");
        assert_eq!(step.delay, Duration::from_secs(3));
    }

    #[test]
    fn test_parse_minimal_scenario_uses_defaults() {
        let scenario: Scenario = serde_yaml::from_str(
            r#"
name: bare
emulator:
  program: qemu-system-riscv64
steps:
  - send: exit
"#,
        )
        .unwrap();

        assert_eq!(scenario.boot_delay_secs, 6.0);
        assert_eq!(scenario.drain_timeout_secs, 5.0);
        assert_eq!(scenario.grace_period_secs, 2.0);
        assert_eq!(scenario.steps[0].delay_secs, 0.0);
        assert!(scenario.indicators.is_empty());
    }
}
