//! # Scheduler configuration.
//!
//! [`SchedulerConfig`] carries the rate-window and retry knobs. Stock
//! defaults: 145 calls per 60-second window, 20 attempts, 60-second base
//! delay doubling per retry.
//!
//! ## Sentinel values
//! - `capacity = 0` → treated as 1 (a zero-capacity window would never admit)
//! - `max_retries = 0` → treated as 1 (the first attempt always runs)

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::policies::{AdmissionPolicy, BackoffPolicy, JitterPolicy};

/// Configuration for the rate-limited scheduler.
///
/// Constructed once at startup and read-only thereafter; the scheduler
/// clones what it needs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum accepted calls per trailing window.
    pub capacity: usize,

    /// Length of the trailing window, in seconds.
    pub window_secs: u64,

    /// Total attempt budget per logical call (first attempt included).
    pub max_retries: u32,

    /// Backoff delay before the first retry, in seconds.
    pub base_delay_secs: u64,

    /// Multiplicative backoff growth per retry.
    pub backoff_factor: f64,

    /// Cap on any single backoff delay, in seconds.
    pub max_delay_secs: u64,

    /// Randomization applied to backoff delays.
    pub jitter: JitterPolicy,

    /// When submissions are charged against the window.
    pub admission: AdmissionPolicy,
}

impl Default for SchedulerConfig {
    /// Stock defaults:
    /// `capacity = 145`, `window = 60s`, `max_retries = 20`,
    /// `base_delay = 60s`, `factor = 2.0`, `max_delay = 1h`,
    /// no jitter, charge-on-success admission.
    fn default() -> Self {
        Self {
            capacity: 145,
            window_secs: 60,
            max_retries: 20,
            base_delay_secs: 60,
            backoff_factor: 2.0,
            max_delay_secs: 3600,
            jitter: JitterPolicy::None,
            admission: AdmissionPolicy::CommitOnSuccess,
        }
    }
}

impl SchedulerConfig {
    /// The trailing window as a [`Duration`].
    #[inline]
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Builds the backoff policy for retry scheduling.
    #[inline]
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_secs(self.base_delay_secs),
            max: Duration::from_secs(self.max_delay_secs),
            factor: self.backoff_factor,
            jitter: self.jitter,
        }
    }

    /// Attempt budget clamped to a minimum of 1.
    #[inline]
    pub fn retry_budget(&self) -> u32 {
        self.max_retries.max(1)
    }
}
