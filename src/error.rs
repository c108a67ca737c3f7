//! Error types used by the scheduler and the configuration layer.
//!
//! This module defines three error enums:
//!
//! - [`CallError`] — a classified failure of one remote-call attempt.
//! - [`SchedulerError`] — terminal outcomes of [`Scheduler::submit`](crate::Scheduler::submit).
//! - [`ConfigError`] — configuration loading failures.
//!
//! Classification happens once, at the integration boundary: the caller's
//! request adapter maps whatever its client library raises into exactly one
//! [`CallError`] variant. The scheduler never inspects error text; it only
//! looks at the tag, so retryable and fatal paths cannot be conflated.
//!
//! All types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics and [`CallError::is_retryable`] for retry decisions.

use std::time::Duration;
use thiserror::Error;

/// # Classified failure of a single remote-call attempt.
///
/// Exactly one variant applies to any failure:
/// - [`CallError::RateLimited`] — the remote service signalled it is overloaded.
/// - [`CallError::Transient`] — a network/service hiccup that may clear on retry.
/// - [`CallError::Fatal`] — requires external operator intervention (invalid
///   credentials, exhausted billing); retrying without remediation cannot succeed.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CallError {
    /// The remote service rejected the call because it is overloaded.
    #[error("rate limited by remote service: {error}")]
    RateLimited {
        /// The underlying error message.
        error: String,
    },

    /// A transient network or service failure; safe to retry.
    #[error("transient call failure: {error}")]
    Transient {
        /// The underlying error message.
        error: String,
    },

    /// Non-recoverable failure; never retried automatically.
    #[error("fatal call failure (no retry): {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },
}

impl CallError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pacerun::CallError;
    ///
    /// let err = CallError::RateLimited { error: "overloaded".into() };
    /// assert_eq!(err.as_label(), "call_rate_limited");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CallError::RateLimited { .. } => "call_rate_limited",
            CallError::Transient { .. } => "call_transient",
            CallError::Fatal { .. } => "call_fatal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CallError::RateLimited { error } => format!("rate limited: {error}"),
            CallError::Transient { error } => format!("transient: {error}"),
            CallError::Fatal { error } => format!("fatal: {error}"),
        }
    }

    /// Indicates whether the error type is safe to retry.
    ///
    /// Returns `true` for [`CallError::RateLimited`] and [`CallError::Transient`],
    /// `false` for [`CallError::Fatal`].
    ///
    /// # Example
    /// ```
    /// use pacerun::CallError;
    ///
    /// let retryable = CallError::Transient { error: "boom".into() };
    /// assert!(retryable.is_retryable());
    ///
    /// let fatal = CallError::Fatal { error: "billing".into() };
    /// assert!(!fatal.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CallError::RateLimited { .. } | CallError::Transient { .. }
        )
    }
}

/// # Terminal outcomes of a scheduled submission.
///
/// Retryable [`CallError`]s are absorbed by the scheduler up to its retry
/// budget; only these two terminal shapes surface to the caller. Both are
/// returned, never panicked, so downstream logic can distinguish "budget
/// spent" from "broken until an operator intervenes".
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// The retry budget was spent without a successful call.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Total attempts made (including the first).
        attempts: u32,
        /// The classified error from the final attempt.
        last: CallError,
    },

    /// The call failed fatally; external remediation is required before resubmitting.
    #[error("fatal call failure: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::RetriesExhausted { .. } => "scheduler_retries_exhausted",
            SchedulerError::Fatal { .. } => "scheduler_fatal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SchedulerError::RetriesExhausted { attempts, last } => {
                format!(
                    "retries exhausted after {attempts} attempts; last: {}",
                    last.as_message()
                )
            }
            SchedulerError::Fatal { error } => format!("fatal: {error}"),
        }
    }
}

/// # Errors produced while loading configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("reading config {path}: {source}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`Config`](crate::Config).
    #[error("parsing config {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// The underlying deserialization error.
        #[source]
        source: toml::de::Error,
    },
}

/// Formats a duration for event/log output without sub-millisecond noise.
pub(crate) fn fmt_delay(d: Duration) -> String {
    if d.as_secs() >= 1 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        format!("{}ms", d.as_millis())
    }
}
