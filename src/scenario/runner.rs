//! Scenario runner
//!
//! Loads a YAML scenario, runs one console session for it, and reports each
//! indicator as its own informational line. Indicator absence never fails
//! the run; scenarios are exploratory by design.

use std::path::Path;
use std::time::Duration;

use colored::Colorize;

use crate::common::config::EmulatorConfig;
use crate::common::{Error, Result};
use crate::harness::{self, SessionPlan};

use super::config::Scenario;

/// What a scenario run produced
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub name: String,
    /// Indicators found in the captured output
    pub detected: usize,
    /// Indicators checked
    pub total: usize,
    pub timed_out: bool,
}

/// Run a scenario from a YAML file
pub async fn run_scenario(path: &Path, verbose: bool) -> Result<ScenarioOutcome> {
    let content =
        std::fs::read_to_string(path).map_err(|e| Error::file_read(path.display(), e))?;
    let scenario: Scenario =
        serde_yaml::from_str(&content).map_err(|e| Error::ScenarioParse(e.to_string()))?;

    println!(
        "\n{} {}",
        "Running Scenario:".blue().bold(),
        scenario.name.white().bold()
    );

    if let Some(desc) = &scenario.description {
        println!("  {}", desc.dimmed());
    }

    // Resolve the working directory relative to the scenario file
    let scenario_dir = path.parent().unwrap_or(Path::new("."));
    let working_dir = scenario.emulator.working_dir.as_ref().map(|dir| {
        if dir.is_relative() {
            scenario_dir.join(dir)
        } else {
            dir.clone()
        }
    });

    let emulator = EmulatorConfig {
        program: scenario.emulator.program.clone(),
        args: scenario.emulator.args.clone(),
        working_dir,
    };

    let mut plan = SessionPlan::new(emulator.resolve_program()?);
    plan.args = emulator.args;
    plan.working_dir = emulator.working_dir;
    plan.boot_delay = Duration::from_secs_f64(scenario.boot_delay_secs);
    plan.drain_timeout = Duration::from_secs_f64(scenario.drain_timeout_secs);
    plan.grace_period = Duration::from_secs_f64(scenario.grace_period_secs);
    plan.steps = scenario.steps.iter().map(|s| s.to_command_step()).collect();
    plan.indicators = scenario
        .indicators
        .iter()
        .map(|i| i.to_indicator())
        .collect();

    if verbose {
        println!("  Emulator: {}", plan.program.display().to_string().dimmed());
        for step in &plan.steps {
            println!(
                "  {} {} ({}s)",
                ">>".dimmed(),
                step.text.dimmed(),
                step.delay.as_secs_f64()
            );
        }
    }

    println!("\n{}", "Session:".cyan());
    let report = harness::run(&plan).await?;

    if !report.tail.is_empty() {
        println!("\n{}", "Console output (trailing excerpt):".cyan());
        println!("{}", report.tail);
    }

    println!("\n{}", "Indicators:".cyan());
    for result in report.verdict.iter() {
        if result.present {
            println!(
                "  {} '{}' detected ({})",
                "✓".green(),
                result.name,
                result.phrase.dimmed()
            );
        } else {
            println!(
                "  {} '{}' not detected ({})",
                "–".yellow(),
                result.name,
                result.phrase.dimmed()
            );
        }
    }
    if report.verdict.is_empty() {
        println!("  {}", "(none configured)".dimmed());
    }

    if report.timed_out {
        println!(
            "\n{}",
            "Draining timed out; output above is partial".yellow()
        );
    }
    if let Some(e) = &report.io_error {
        println!("\n{} {}", "Console stream error:".yellow(), e);
    }

    Ok(ScenarioOutcome {
        name: scenario.name,
        detected: report.verdict.detected(),
        total: report.verdict.len(),
        timed_out: report.timed_out,
    })
}
