//! Guest console test harness
//!
//! This library boots a guest operating system under an emulator, drives its
//! interactive console with a scripted, timed command sequence, and scans the
//! captured output for indicator phrases.

pub mod cli;
pub mod commands;
pub mod common;
pub mod harness;
pub mod scenario;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use harness::{CommandStep, Indicator, Session, SessionPlan, SessionReport, SessionState};
