//! Rate-limited scheduling of outbound remote calls.
//!
//! This module contains the sliding-window primitive and the scheduler that
//! wraps remote calls with admission control and retry/backoff.
//!
//! Internal modules:
//! - [`window`]: accepted-call records, lazy pruning, slot-wait computation;
//! - [`config`]: the scheduler knobs (capacity, window, retries, backoff);
//! - [`scheduler`]: the `submit` loop (admission, classification, retries).

mod config;
mod scheduler;
mod window;

pub use config::SchedulerConfig;
pub use scheduler::Scheduler;
