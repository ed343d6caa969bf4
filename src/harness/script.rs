//! Scripted console commands
//!
//! A script is a fixed ordered sequence of commands, each paired with the
//! delay to observe after sending it. The sequence is supplied at session
//! start and never mutated during execution.

use std::time::Duration;

use crate::common::{Error, Result};

/// One scripted console command and its post-send pacing delay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStep {
    /// Command text, sent as a single newline-terminated line
    pub text: String,
    /// How long to wait after sending before the next step
    pub delay: Duration,
}

impl CommandStep {
    pub fn new(text: impl Into<String>, delay: Duration) -> Self {
        Self {
            text: text.into(),
            delay,
        }
    }
}

/// The built-in smoke script: exercise the guest's animation control
/// command and leave the shell
pub fn default_script() -> Vec<CommandStep> {
    vec![
        CommandStep::new("animctl start", Duration::from_secs(2)),
        CommandStep::new("animctl view", Duration::from_secs(3)),
        CommandStep::new("animctl stop", Duration::from_secs(2)),
        CommandStep::new("exit", Duration::from_secs(1)),
    ]
}

/// Parse a step string in `TEXT@SECS` form
///
/// The delay suffix is optional; a bare `TEXT` gets a zero delay. Seconds
/// may be fractional (`view@0.5`).
pub fn parse_step(s: &str) -> Result<CommandStep> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::Config("Empty command step".to_string()));
    }

    match s.rsplit_once('@') {
        Some((text, secs)) if !text.is_empty() => {
            let secs: f64 = secs
                .parse()
                .map_err(|_| Error::Config(format!("Invalid step delay '{}' in '{}'", secs, s)))?;
            if !secs.is_finite() || secs < 0.0 {
                return Err(Error::Config(format!("Invalid step delay '{}' in '{}'", secs, s)));
            }
            Ok(CommandStep::new(text, Duration::from_secs_f64(secs)))
        }
        _ => Ok(CommandStep::new(s, Duration::ZERO)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_step_with_delay() {
        let step = parse_step("animctl start@2").unwrap();
        assert_eq!(step.text, "animctl start");
        assert_eq!(step.delay, Duration::from_secs(2));
    }

    #[test]
    fn test_parse_step_fractional_delay() {
        let step = parse_step("view@0.5").unwrap();
        assert_eq!(step.delay, Duration::from_millis(500));
    }

    #[test]
    fn test_parse_step_without_delay() {
        let step = parse_step("exit").unwrap();
        assert_eq!(step.text, "exit");
        assert_eq!(step.delay, Duration::ZERO);
    }

    #[test]
    fn test_parse_step_rejects_bad_delay() {
        assert!(parse_step("stop@soon").is_err());
        assert!(parse_step("stop@-1").is_err());
        assert!(parse_step("").is_err());
    }

    #[test]
    fn test_default_script_order() {
        let script = default_script();
        let texts: Vec<&str> = script.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["animctl start", "animctl view", "animctl stop", "exit"]
        );
    }
}
