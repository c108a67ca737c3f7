//! # Backoff policy for retrying remote calls.
//!
//! [`BackoffPolicy`] controls how retry delays grow after repeated failures.
//! The delay for attempt `n` (0-indexed) is `first × factor^n`, clamped to
//! [`BackoffPolicy::max`], then jitter is applied. Because the base delay is
//! derived purely from the attempt number, jitter output never feeds back
//! into later delays.
//!
//! With `first = base delay` and `factor = 2.0` this is the classic
//! doubling schedule: base, 2×base, 4×base, ... up to the cap.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use pacerun::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_secs(60),
//!     max: Duration::from_secs(3600),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_secs(60));
//! assert_eq!(backoff.next(1), Duration::from_secs(120));
//! assert_eq!(backoff.next(2), Duration::from_secs(240));
//! // 60s × 2^10 far exceeds the cap
//! assert_eq!(backoff.next(10), Duration::from_secs(3600));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff policy.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay before the first retry (attempt 0).
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter applied to the clamped base delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns the stock remote-call schedule:
    /// `first = 60s`, `factor = 2.0`, `max = 1h`, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(60),
            max: Duration::from_secs(3600),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay for the given attempt number (0-indexed).
    ///
    /// The base delay is `first × factor^attempt`, clamped to [`BackoffPolicy::max`];
    /// overflow and non-finite intermediates clamp to the cap as well. Jitter is
    /// applied last and never feeds back into subsequent attempts.
    pub fn next(&self, attempt: u32) -> Duration {
        let exp = attempt.min(i32::MAX as u32) as i32;
        let raw_secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let max_secs = self.max.as_secs_f64();
        let base = if !raw_secs.is_finite() || raw_secs < 0.0 || raw_secs > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(raw_secs)
        };

        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(first_secs: u64, max_secs: u64, factor: f64) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_secs(first_secs),
            max: Duration::from_secs(max_secs),
            factor,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn doubling_schedule_matches_base_times_two_pow_attempt() {
        let policy = plain(60, 100_000, 2.0);
        for attempt in 0..8u32 {
            assert_eq!(
                policy.next(attempt),
                Duration::from_secs(60 * 2u64.pow(attempt)),
                "attempt {attempt}"
            );
        }
    }

    #[test]
    fn strictly_increasing_until_cap() {
        let policy = plain(1, 3600, 2.0);
        let mut prev = Duration::ZERO;
        for attempt in 0..12u32 {
            let d = policy.next(attempt);
            assert!(d > prev, "attempt {attempt}: {d:?} not > {prev:?}");
            prev = d;
        }
    }

    #[test]
    fn clamped_to_max() {
        let policy = plain(60, 3600, 2.0);
        assert_eq!(policy.next(20), Duration::from_secs(3600));
    }

    #[test]
    fn first_exceeding_max_clamps() {
        let policy = plain(10, 5, 2.0);
        assert_eq!(policy.next(0), Duration::from_secs(5));
    }

    #[test]
    fn huge_attempt_does_not_overflow() {
        let policy = plain(60, 3600, 2.0);
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(3600));
    }

    #[test]
    fn full_jitter_stays_within_base() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Full,
            ..plain(2, 3600, 2.0)
        };
        for attempt in 0..10u32 {
            let base = Duration::from_secs(2 * 2u64.pow(attempt)).min(Duration::from_secs(3600));
            assert!(policy.next(attempt) <= base, "attempt {attempt}");
        }
    }

    #[test]
    fn equal_jitter_keeps_at_least_half() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Equal,
            ..plain(2, 3600, 1.0)
        };
        for _ in 0..50 {
            let d = policy.next(0);
            assert!(d >= Duration::from_secs(1) && d <= Duration::from_secs(2));
        }
    }
}
