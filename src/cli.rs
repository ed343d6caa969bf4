//! CLI command handling
//!
//! Builds a session plan from the config file and flags, runs it, and
//! formats the report.

use std::time::Duration;

use crate::commands::Commands;
use crate::common::config::{Config, EmulatorConfig};
use crate::common::{Error, Result};
use crate::harness::{self, script, Indicator, SessionPlan, SessionReport};
use crate::scenario;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            program,
            working_dir,
            boot_delay,
            drain_timeout,
            grace_period,
            steps,
            indicators,
            args,
        } => {
            let config = Config::load()?;

            let emulator = EmulatorConfig {
                program: program.unwrap_or(config.emulator.program),
                args: if args.is_empty() {
                    config.emulator.args
                } else {
                    args
                },
                working_dir: working_dir.or(config.emulator.working_dir),
            };

            let mut plan = SessionPlan::new(emulator.resolve_program()?);
            plan.args = emulator.args;
            plan.working_dir = emulator.working_dir;
            plan.boot_delay =
                Duration::from_secs(boot_delay.unwrap_or(config.timeouts.boot_delay_secs));
            plan.drain_timeout =
                Duration::from_secs(drain_timeout.unwrap_or(config.timeouts.drain_timeout_secs));
            plan.grace_period =
                Duration::from_secs(grace_period.unwrap_or(config.timeouts.grace_period_secs));
            plan.tail_chars = config.output.tail_chars;

            if !steps.is_empty() {
                plan.steps = steps
                    .iter()
                    .map(|s| script::parse_step(s))
                    .collect::<Result<Vec<_>>>()?;
            }
            if !indicators.is_empty() {
                plan.indicators = indicators
                    .iter()
                    .map(|s| parse_indicator(s))
                    .collect::<Result<Vec<_>>>()?;
            }

            let report = harness::run(&plan).await?;
            print_report(&report);

            // Indicator results are advisory; the run itself completed.
            Ok(())
        }

        Commands::Scenario { path, verbose } => {
            let outcome = scenario::run_scenario(&path, verbose).await?;
            tracing::info!(
                scenario = %outcome.name,
                detected = outcome.detected,
                total = outcome.total,
                "scenario finished"
            );
            Ok(())
        }
    }
}

/// Parse an indicator string in `NAME=PHRASE` form
pub fn parse_indicator(s: &str) -> Result<Indicator> {
    match s.split_once('=') {
        Some((name, phrase)) if !name.is_empty() && !phrase.is_empty() => {
            Ok(Indicator::new(name, phrase))
        }
        _ => Err(Error::Config(format!(
            "Invalid indicator '{}', expected NAME=PHRASE",
            s
        ))),
    }
}

/// Print the human-readable session report
fn print_report(report: &SessionReport) {
    println!("--- console output (trailing excerpt) ---");
    println!("{}", report.tail);
    println!("-----------------------------------------");

    for result in report.verdict.iter() {
        if result.present {
            println!("✓ indicator '{}' detected (\"{}\")", result.name, result.phrase);
        } else {
            println!("  indicator '{}' not detected", result.name);
        }
    }

    if report.timed_out {
        println!("note: draining timed out; output above is partial");
    }
    if let Some(e) = &report.io_error {
        println!("note: console stream error during the session: {}", e);
    }
    if let Some(status) = report.exit_status {
        println!("emulator exit status: {}", status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_indicator() {
        let indicator = parse_indicator("stopped=Stopped.").unwrap();
        assert_eq!(indicator.name, "stopped");
        assert_eq!(indicator.phrase, "Stopped.");
    }

    #[test]
    fn test_parse_indicator_rejects_malformed() {
        assert!(parse_indicator("stopped").is_err());
        assert!(parse_indicator("=Stopped.").is_err());
        assert!(parse_indicator("stopped=").is_err());
    }
}
