//! Configuration file handling

use serde::Deserialize;
use std::path::PathBuf;

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Emulator invocation
    #[serde(default)]
    pub emulator: EmulatorConfig,

    /// Timing settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Captured-output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// How to start the emulator that hosts the guest console
#[derive(Debug, Deserialize, Clone)]
pub struct EmulatorConfig {
    /// Program to run (bare names are resolved via PATH)
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments to pass to the program
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Working directory for the emulator process
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            working_dir: None,
        }
    }
}

fn default_program() -> String {
    "make".to_string()
}

fn default_args() -> Vec<String> {
    vec!["qemu".to_string()]
}

/// Timing settings in seconds
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Timeouts {
    /// Fixed warm-up wait after launch, before the first command is sent.
    /// The guest console offers no machine-checkable ready signal.
    #[serde(default = "default_boot_delay")]
    pub boot_delay_secs: u64,

    /// Hard bound on draining remaining output after the last command
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_secs: u64,

    /// How long to wait for graceful termination before killing
    #[serde(default = "default_grace_period")]
    pub grace_period_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            boot_delay_secs: default_boot_delay(),
            drain_timeout_secs: default_drain_timeout(),
            grace_period_secs: default_grace_period(),
        }
    }
}

fn default_boot_delay() -> u64 {
    6
}
fn default_drain_timeout() -> u64 {
    5
}
fn default_grace_period() -> u64 {
    2
}

/// Captured-output configuration
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct OutputConfig {
    /// Size of the trailing excerpt reported after a run, in characters
    #[serde(default = "default_tail_chars")]
    pub tail_chars: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            tail_chars: default_tail_chars(),
        }
    }
}

fn default_tail_chars() -> usize {
    1000
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| Error::file_read(path.display(), e))?;
                return toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()));
            }
        }
        Ok(Self::default())
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}

impl EmulatorConfig {
    /// Resolve the configured program to a concrete path
    ///
    /// Bare names are looked up in PATH; anything containing a path
    /// separator is used as-is.
    pub fn resolve_program(&self) -> Result<PathBuf> {
        let candidate = PathBuf::from(&self.program);
        if candidate.components().count() > 1 {
            return Ok(candidate);
        }
        which::which(&self.program)
            .map_err(|_| Error::EmulatorNotFound(self.program.clone()))
    }
}
