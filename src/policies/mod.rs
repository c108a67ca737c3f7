//! Retry and admission policies.
//!
//! This module groups the knobs that control **how long** to wait between
//! retry attempts and **when** a submission is charged against the
//! rate-limit window.
//!
//! ## Contents
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization strategy to avoid synchronized retries
//! - [`AdmissionPolicy`] charge-on-success vs reserve-then-commit
//!
//! ## Quick wiring
//! ```text
//! SchedulerConfig { backoff: BackoffPolicy, admission: AdmissionPolicy }
//!      └─► Scheduler::submit uses:
//!           - admission to decide when the window is charged
//!           - backoff.next(attempt) to schedule the next attempt
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=60s, factor=2.0, max=1h, jitter=None
//!   (the classic doubling schedule).
//! - `AdmissionPolicy::CommitOnSuccess` (failed attempts are never charged).

mod admission;
mod backoff;
mod jitter;

pub use admission::AdmissionPolicy;
pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
