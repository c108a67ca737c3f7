//! # Runtime events emitted by the scheduler and the subprocess runner.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Scheduler events**: admission waits, accepted calls, retries, abandonment
//! - **Runner events**: spawn, exit, cancellation, kill escalation
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! logical call/command name, attempt numbers, backoff delays and exit codes.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use pacerun::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::CallRetryScheduled)
//!     .with_name("generate-plan")
//!     .with_reason("rate limited: 429")
//!     .with_attempt(2)
//!     .with_delay(Duration::from_secs(120));
//!
//! assert_eq!(ev.kind, EventKind::CallRetryScheduled);
//! assert_eq!(ev.name.as_deref(), Some("generate-plan"));
//! assert_eq!(ev.delay_ms, Some(120_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Scheduler events ===
    /// The rate-limit window is full; the submission is waiting for a slot.
    ///
    /// Sets:
    /// - `name`: logical call name
    /// - `delay_ms`: expected wait before the next admission check
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    AdmissionWait,

    /// A remote call completed successfully and was charged to the window.
    ///
    /// Sets:
    /// - `name`: logical call name
    /// - `attempt`: attempt number (1-based)
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CallAccepted,

    /// A remote-call attempt failed with a classified error.
    ///
    /// Sets:
    /// - `name`: logical call name
    /// - `attempt`: attempt number
    /// - `reason`: classified failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CallFailed,

    /// A retry was scheduled after a retryable failure.
    ///
    /// Sets:
    /// - `name`: logical call name
    /// - `attempt`: attempt number that failed
    /// - `delay_ms`: backoff delay before the next attempt
    /// - `reason`: failure message driving the retry
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CallRetryScheduled,

    /// The submission ended without success (fatal error or retries exhausted).
    ///
    /// Sets:
    /// - `name`: logical call name
    /// - `attempt`: last attempt number
    /// - `reason`: terminal error message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CallAbandoned,

    // === Runner events ===
    /// A child process was spawned and is being supervised.
    ///
    /// Sets:
    /// - `name`: command name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ProcessSpawned,

    /// The child process could not be started.
    ///
    /// Sets:
    /// - `name`: command name
    /// - `reason`: spawn error text
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ProcessSpawnFailed,

    /// The child process exited on its own.
    ///
    /// Sets:
    /// - `name`: command name
    /// - `exit_code`: recorded exit code (`-1` if killed by signal)
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ProcessExited,

    /// User-initiated cancellation was observed for a running process.
    ///
    /// Sets:
    /// - `name`: command name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CancelRequested,

    /// The child did not stop within the grace period; forcing a kill.
    ///
    /// Sets:
    /// - `name`: command name
    /// - `delay_ms`: grace period that elapsed
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    KillEscalated,

    /// The child process is confirmed stopped after a cancellation.
    ///
    /// Sets:
    /// - `name`: command name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ProcessTerminated,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Logical call or command name, if applicable.
    pub name: Option<Arc<str>>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Delay in milliseconds (admission wait, backoff, grace), compact.
    pub delay_ms: Option<u32>,
    /// Child process exit code, if applicable.
    pub exit_code: Option<i32>,
    /// Human-readable reason (errors, cancellation details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            name: None,
            attempt: None,
            delay_ms: None,
            exit_code: None,
            reason: None,
        }
    }

    /// Attaches a logical call or command name.
    #[inline]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a child exit code.
    #[inline]
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
