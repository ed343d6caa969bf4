//! Error types for the guest console harness
//!
//! Launch failures are fatal to a run; stream and timeout errors are
//! contained so a session always reaches teardown with its partial output.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Launch Errors ===
    #[error("Failed to launch emulator '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Emulator '{0}' not found in PATH")]
    EmulatorNotFound(String),

    // === Console Stream Errors ===
    #[error("Console stream error: {0}")]
    Stream(#[source] io::Error),

    // === Termination Errors ===
    #[error("Emulator survived graceful and forced termination: {0}")]
    Termination(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid scenario file: {0}")]
    ScenarioParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a launch error for a failed spawn
    pub fn launch(program: impl Into<String>, source: io::Error) -> Self {
        Self::Launch {
            program: program.into(),
            source,
        }
    }

    /// Create a file read error
    pub fn file_read(path: impl std::fmt::Display, error: impl std::fmt::Display) -> Self {
        Self::FileRead {
            path: path.to_string(),
            error: error.to_string(),
        }
    }
}
