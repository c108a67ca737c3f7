//! # pacerun
//!
//! **Pacerun** is a resilient execution core for tools that drive a
//! rate-limited remote service and run the artifacts it produces as local
//! subprocesses.
//!
//! It provides two cooperating engines plus the policies, events, and
//! configuration they share:
//!
//! - a [`Scheduler`] that admits remote calls through a trailing rate
//!   window and absorbs retryable failures with exponential backoff, and
//! - a [`Runner`] that supervises one child process per run with concurrent
//!   stream capture, user cancellation, and redacted reporting.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   caller                          caller
//!     │ submit(name, call)            │ run(argv, cwd)
//!     ▼                               ▼
//! ┌─────────────────────────┐   ┌─────────────────────────────┐
//! │  Scheduler              │   │  Runner                     │
//! │  - RateWindow (trailing │   │  - spawn (streams piped)    │
//! │    window admission)    │   │  - 2 drainer tasks          │
//! │  - BackoffPolicy        │   │  - CancelSignal + console   │
//! │    (retry delays)       │   │  - terminate ─► kill        │
//! └───────────┬─────────────┘   └──────────────┬──────────────┘
//!             │ Events:                        │ Events:
//!             │ - AdmissionWait                │ - ProcessSpawned
//!             │ - CallAccepted/Failed          │ - CancelRequested
//!             │ - CallRetryScheduled           │ - KillEscalated
//!             │ - CallAbandoned                │ - ProcessExited/Terminated
//!             ▼                                ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │                  Bus (broadcast channel)                  │
//! └────────────────────────────┬──────────────────────────────┘
//!                              ▼
//!                       SubscriberSet ──► LogWriter, user subscribers
//! ```
//!
//! ### Submission lifecycle
//! ```text
//! Scheduler::submit(name, call)
//!
//! loop {
//!   ├─► admit: wait until the trailing window has a free slot
//!   │     (publishes AdmissionWait with the computed delay)
//!   ├─► attempt += 1, invoke call()
//!   │       │
//!   │       ├─ Ok  ──► charge the window, publish CallAccepted, return
//!   │       │
//!   │       └─ Err ──► publish CallFailed
//!   │                  ├─ Fatal            ─► CallAbandoned, return Err
//!   │                  ├─ budget spent     ─► CallAbandoned, return Err
//!   │                  └─ retryable:
//!   │                       ├─ delay = backoff.next(attempt - 1)
//!   │                       ├─ publish CallRetryScheduled{ delay }
//!   │                       └─ sleep(delay), continue
//! }
//! ```
//!
//! ## Features
//! | Area             | Description                                                   | Key types / traits                       |
//! |------------------|---------------------------------------------------------------|------------------------------------------|
//! | **Scheduling**   | Trailing-window admission with retry/backoff absorption.      | [`Scheduler`], [`SchedulerConfig`]       |
//! | **Execution**    | Supervised subprocess runs with cancellation and redaction.   | [`Runner`], [`RunnerConfig`], [`ProcessReport`] |
//! | **Policies**     | Backoff growth, jitter strategies, admission strictness.      | [`BackoffPolicy`], [`JitterPolicy`], [`AdmissionPolicy`] |
//! | **Events**       | Broadcast lifecycle events for logging and metrics.           | [`Bus`], [`Event`], [`Subscribe`]        |
//! | **Errors**       | Classified call failures and terminal scheduler outcomes.     | [`CallError`], [`SchedulerError`]        |
//! | **Configuration**| One TOML file covering both engines, every field defaulted.   | [`Config`]                               |
//!
//! ## Example
//! ```rust
//! use std::path::Path;
//!
//! use pacerun::{Bus, CallError, Config, Runner, Scheduler};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!     let bus = Bus::default();
//!
//!     // Pace remote calls through the trailing window.
//!     let scheduler = Scheduler::new(cfg.scheduler.clone(), bus.clone());
//!     let reply: String = scheduler
//!         .submit("greeting", || async { Ok::<_, CallError>("hi".to_string()) })
//!         .await?;
//!     assert_eq!(reply, "hi");
//!
//!     // Run the produced artifact under supervision.
//!     let runner = Runner::new(cfg.runner.clone(), bus);
//!     let report = runner
//!         .run(&["echo".into(), "done".into()], Path::new("."))
//!         .await;
//!     assert_eq!(report.exit_code(), Some(0));
//!     Ok(())
//! }
//! ```
mod cancel;
mod config;
mod error;
mod events;
mod policies;
mod runner;
mod scheduler;
mod subscribers;

// ---- Public re-exports ----

pub use cancel::{CancelSignal, ConsoleInput, InputWatch, KeyBinding, NullInput, TerminalInput};
pub use config::Config;
pub use error::{CallError, ConfigError, SchedulerError};
pub use events::{Bus, Event, EventKind};
pub use policies::{AdmissionPolicy, BackoffPolicy, JitterPolicy};
pub use runner::{
    PROJECT_TOKEN, ProcessReport, RedactRule, Redactor, RunOutcome, Runner, RunnerConfig,
    SessionState, StreamChunk, StreamTag, TOOLCHAIN_TOKEN,
};
pub use scheduler::{Scheduler, SchedulerConfig};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
