//! # Sliding-window bookkeeping for accepted calls.
//!
//! [`RateWindow`] owns the ordered sequence of accepted-call timestamps plus
//! a count of outstanding reservations (used by
//! [`AdmissionPolicy::ReserveThenCommit`](crate::AdmissionPolicy)).
//! It answers one question: "may a call proceed now, or how long until the
//! oldest record ages out?".
//!
//! ## Invariants
//! - Records are stored in commit order, so the front is always the oldest.
//! - Records aged `>= window` are evicted lazily before each admission check;
//!   after `prune`, at most `capacity` records fall inside the trailing window.
//! - `reserved` only grows via [`reserve`](RateWindow::reserve) and shrinks
//!   via [`release`](RateWindow::release)/[`commit`](RateWindow::commit).
//!
//! All methods take `now` explicitly; the caller injects the clock, which
//! keeps the bookkeeping deterministic under test.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Minimum admission wait, so a boundary-aged record cannot cause a hot spin.
const MIN_WAIT: Duration = Duration::from_millis(1);

/// Sliding window of accepted-call records and in-flight reservations.
#[derive(Debug)]
pub(crate) struct RateWindow {
    capacity: usize,
    window: Duration,
    records: VecDeque<Instant>,
    reserved: usize,
}

impl RateWindow {
    /// Creates an empty window. `capacity` is clamped to a minimum of 1.
    pub(crate) fn new(capacity: usize, window: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            window,
            records: VecDeque::new(),
            reserved: 0,
        }
    }

    /// Evicts records that have aged out of the trailing window.
    pub(crate) fn prune(&mut self, now: Instant) {
        while let Some(front) = self.records.front() {
            if now.duration_since(*front) >= self.window {
                self.records.pop_front();
            } else {
                break;
            }
        }
    }

    /// Committed records plus outstanding reservations.
    pub(crate) fn occupancy(&self) -> usize {
        self.records.len() + self.reserved
    }

    /// True when a new call may be admitted.
    pub(crate) fn has_capacity(&self) -> bool {
        self.occupancy() < self.capacity
    }

    /// Takes a reservation for an in-flight attempt.
    pub(crate) fn reserve(&mut self) {
        self.reserved += 1;
    }

    /// Returns a reservation after a failed attempt.
    pub(crate) fn release(&mut self) {
        self.reserved = self.reserved.saturating_sub(1);
    }

    /// Charges one accepted call to the window.
    ///
    /// When `reserved` is true the call held a reservation, which is
    /// converted into the committed record.
    pub(crate) fn commit(&mut self, now: Instant, reserved: bool) {
        if reserved {
            self.reserved = self.reserved.saturating_sub(1);
        }
        self.records.push_back(now);
    }

    /// Time until the oldest committed record ages out of the window.
    ///
    /// Returns `None` when there is no committed record to wait on (the
    /// occupancy is all reservations); the caller must then wait for a
    /// reservation to be released instead of sleeping a computed interval.
    pub(crate) fn time_until_slot(&self, now: Instant) -> Option<Duration> {
        let oldest = self.records.front()?;
        let age = now.duration_since(*oldest);
        Some(self.window.saturating_sub(age).max(MIN_WAIT))
    }
}
