//! The process-interaction harness
//!
//! Owns the emulator child process for the duration of one session: launch,
//! fixed boot wait, timed command injection, bounded output draining, and
//! guaranteed teardown.

pub mod capture;
pub mod evaluator;
pub mod script;
pub mod session;

pub use capture::CapturedOutput;
pub use evaluator::{evaluate, Indicator, IndicatorResult, Verdict};
pub use script::CommandStep;
pub use session::{run, Session, SessionPlan, SessionReport, SessionState};
