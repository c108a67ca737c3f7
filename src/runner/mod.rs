//! # Supervised subprocess execution.
//!
//! - [`Runner`] spawns and supervises one child per run.
//! - [`RunnerConfig`] carries grace period, cancel key, and redaction rules.
//! - [`ProcessReport`] is the structured, redacted result of a run.
//! - [`Redactor`] rewrites machine-local paths into stable tokens.

mod config;
mod drain;
mod redact;
mod runner;
mod session;

pub use config::{RedactRule, RunnerConfig};
pub use redact::{PROJECT_TOKEN, Redactor, TOOLCHAIN_TOKEN};
pub use runner::Runner;
pub use session::{ProcessReport, RunOutcome, SessionState, StreamChunk, StreamTag};
