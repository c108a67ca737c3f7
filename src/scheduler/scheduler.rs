//! # Rate-limited scheduler for outbound remote calls.
//!
//! [`Scheduler::submit`] wraps an arbitrary remote call: it waits for the
//! sliding window to have room, runs the attempt, retries classified
//! retryable failures with exponential backoff, and surfaces fatal failures
//! untouched. Only a *successful* call is charged to the window; failed
//! attempts, retried or not, never consume quota.
//!
//! ## Flow
//! ```text
//! submit(name, call)
//!   loop {
//!     ├─► admit(): prune window; room? proceed (reserve if strict)
//!     │            full?  publish AdmissionWait, sleep until oldest record
//!     │                   ages out (or a reservation frees), re-check
//!     ├─► call().await
//!     │     ├─ Ok   ──► commit record ──► publish CallAccepted ──► return Ok
//!     │     └─ Err  ──► release reservation ──► publish CallFailed
//!     │            ├─ Fatal            ──► publish CallAbandoned ──► Err(Fatal)
//!     │            ├─ budget spent     ──► publish CallAbandoned ──► Err(RetriesExhausted)
//!     │            └─ retryable        ──► publish CallRetryScheduled
//!     │                                    sleep backoff.next(attempt), continue
//!   }
//! ```
//!
//! ## Rules
//! - The window-check-and-charge sequence is a critical section; the mutex
//!   is never held across an await.
//! - A single admission sleep is never trusted: other submitters may race
//!   in during the wait, so the check always repeats.
//! - The attempt counter is per logical call, reset for every `submit`.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{self, Instant};

use crate::error::{CallError, SchedulerError};
use crate::events::{Bus, Event, EventKind};
use crate::policies::BackoffPolicy;
use crate::scheduler::config::SchedulerConfig;
use crate::scheduler::window::RateWindow;

/// Fallback admission wait when the occupancy is all reservations and there
/// is no committed record to age out.
const RESERVATION_POLL: Duration = Duration::from_millis(50);

/// Throttles outbound calls under a sliding time window with retry/backoff.
///
/// `submit` may be invoked concurrently from many tasks; admission checks
/// are serialized through an internal lock so racing submitters cannot
/// jointly overshoot the window (hard-guaranteed under
/// [`AdmissionPolicy::ReserveThenCommit`](crate::AdmissionPolicy)).
pub struct Scheduler {
    cfg: SchedulerConfig,
    backoff: BackoffPolicy,
    window: Mutex<RateWindow>,
    slot_freed: Notify,
    bus: Bus,
}

impl Scheduler {
    /// Creates a scheduler with the given configuration, publishing events to `bus`.
    pub fn new(cfg: SchedulerConfig, bus: Bus) -> Self {
        let window = RateWindow::new(cfg.capacity, cfg.window());
        let backoff = cfg.backoff();
        Self {
            cfg,
            backoff,
            window: Mutex::new(window),
            slot_freed: Notify::new(),
            bus,
        }
    }

    /// Submits one logical remote call.
    ///
    /// `call` builds a **fresh attempt future** per invocation, so each retry
    /// starts from clean state; share context explicitly via the closure's
    /// captures if needed.
    ///
    /// ### Outcomes
    /// - `Ok(response)` — the call succeeded; one record was charged to the window.
    /// - `Err(SchedulerError::RetriesExhausted)` — the attempt budget
    ///   ([`SchedulerConfig::max_retries`]) was spent on retryable failures.
    /// - `Err(SchedulerError::Fatal)` — the call failed in a way that needs
    ///   external remediation; returned immediately, never retried.
    ///
    /// ### Waiting
    /// Suspends while the window is full and between retry attempts
    /// (`base_delay × factor^attempt`, capped). These are the only waits;
    /// no overall deadline is imposed.
    pub async fn submit<T, F, Fut>(&self, name: &str, call: F) -> Result<T, SchedulerError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let reserves = self.cfg.admission.reserves();
        let budget = self.cfg.retry_budget();
        let mut attempt: u32 = 0;

        loop {
            self.admit(name).await;

            match call().await {
                Ok(response) => {
                    self.charge(reserves);
                    self.bus.publish(
                        Event::new(EventKind::CallAccepted)
                            .with_name(name)
                            .with_attempt(attempt + 1),
                    );
                    return Ok(response);
                }
                Err(err) => {
                    if reserves {
                        self.free_reservation();
                    }
                    self.bus.publish(
                        Event::new(EventKind::CallFailed)
                            .with_name(name)
                            .with_attempt(attempt + 1)
                            .with_reason(err.to_string()),
                    );

                    if !err.is_retryable() {
                        self.bus.publish(
                            Event::new(EventKind::CallAbandoned)
                                .with_name(name)
                                .with_attempt(attempt + 1)
                                .with_reason(err.to_string()),
                        );
                        return Err(SchedulerError::Fatal {
                            error: err.to_string(),
                        });
                    }

                    if attempt + 1 >= budget {
                        self.bus.publish(
                            Event::new(EventKind::CallAbandoned)
                                .with_name(name)
                                .with_attempt(attempt + 1)
                                .with_reason(err.to_string()),
                        );
                        return Err(SchedulerError::RetriesExhausted {
                            attempts: attempt + 1,
                            last: err,
                        });
                    }

                    let delay = self.backoff.next(attempt);
                    self.bus.publish(
                        Event::new(EventKind::CallRetryScheduled)
                            .with_name(name)
                            .with_attempt(attempt + 1)
                            .with_delay(delay)
                            .with_reason(err.to_string()),
                    );
                    time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Waits until the window has room, then (in strict mode) reserves a slot.
    ///
    /// The admission check repeats after every wait: another submitter may
    /// have taken the slot that was about to free up.
    async fn admit(&self, name: &str) {
        loop {
            let wait = {
                let mut w = self.lock_window();
                let now = Instant::now();
                w.prune(now);
                if w.has_capacity() {
                    if self.cfg.admission.reserves() {
                        w.reserve();
                    }
                    return;
                }
                w.time_until_slot(now)
            };

            let wait = wait.unwrap_or(RESERVATION_POLL);
            self.bus.publish(
                Event::new(EventKind::AdmissionWait)
                    .with_name(name)
                    .with_delay(wait),
            );

            let sleep = time::sleep(wait);
            tokio::pin!(sleep);
            tokio::select! {
                _ = &mut sleep => {}
                _ = self.slot_freed.notified() => {}
            }
        }
    }

    /// Charges a successful call to the window.
    fn charge(&self, reserved: bool) {
        let mut w = self.lock_window();
        w.commit(Instant::now(), reserved);
    }

    /// Returns a reservation after a failed attempt and wakes waiters.
    fn free_reservation(&self) {
        {
            let mut w = self.lock_window();
            w.release();
        }
        self.slot_freed.notify_waiters();
    }

    fn lock_window(&self) -> std::sync::MutexGuard<'_, RateWindow> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::AdmissionPolicy;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn cfg(capacity: usize, window_secs: u64) -> SchedulerConfig {
        SchedulerConfig {
            capacity,
            window_secs,
            max_retries: 5,
            base_delay_secs: 1,
            ..Default::default()
        }
    }

    fn window_bound_holds(stamps: &[Instant], window: Duration, capacity: usize) -> bool {
        stamps.iter().all(|start| {
            stamps
                .iter()
                .filter(|t| **t >= *start && t.duration_since(*start) < window)
                .count()
                <= capacity
        })
    }

    #[tokio::test(start_paused = true)]
    async fn window_bound_over_150_submissions() {
        let sched = Scheduler::new(cfg(145, 60), Bus::default());
        let start = Instant::now();
        let mut stamps = Vec::new();

        for i in 0..150u32 {
            let res: Result<u32, _> = sched.submit("bulk", || async move { Ok(i) }).await;
            assert!(res.is_ok());
            stamps.push(Instant::now());
        }

        // Call #146 cannot proceed before the first record ages out.
        assert!(Instant::now().duration_since(start) >= Duration::from_secs(60));
        assert!(window_bound_holds(&stamps, Duration::from_secs(60), 145));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_submitters_never_overshoot_with_reservations() {
        let mut c = cfg(3, 60);
        c.admission = AdmissionPolicy::ReserveThenCommit;
        let sched = Arc::new(Scheduler::new(c, Bus::default()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let sched = Arc::clone(&sched);
            handles.push(tokio::spawn(async move {
                sched.submit("fanout", || async { Ok(Instant::now()) }).await
            }));
        }

        let mut stamps = Vec::new();
        for h in handles {
            stamps.push(h.await.unwrap().unwrap());
        }
        assert_eq!(stamps.len(), 8);
        assert!(window_bound_holds(&stamps, Duration::from_secs(60), 3));
    }

    #[tokio::test(start_paused = true)]
    async fn retryable_failures_exhaust_budget() {
        let mut c = cfg(10, 60);
        c.max_retries = 3;
        let sched = Scheduler::new(c, Bus::default());

        let calls = AtomicU32::new(0);
        let res: Result<(), _> = sched
            .submit("flaky", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(CallError::Transient {
                        error: "connection reset".into(),
                    })
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match res {
            Err(SchedulerError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(last.is_retryable());
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_returns_immediately_without_charge() {
        let sched = Scheduler::new(cfg(1, 60), Bus::default());
        let start = Instant::now();

        let res: Result<(), _> = sched
            .submit("doomed", || async {
                Err(CallError::Fatal {
                    error: "credit balance too low".into(),
                })
            })
            .await;
        assert!(matches!(res, Err(SchedulerError::Fatal { .. })));

        // The fatal attempt must not have consumed the single window slot,
        // so a follow-up call is admitted without waiting.
        let res: Result<(), _> = sched.submit("next", || async { Ok(()) }).await;
        assert!(res.is_ok());
        assert_eq!(Instant::now().duration_since(start), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_attempts_do_not_consume_quota() {
        let mut c = cfg(1, 60);
        c.max_retries = 4;
        let sched = Scheduler::new(c, Bus::default());

        let calls = AtomicU32::new(0);
        let res: Result<(), _> = sched
            .submit("eventually", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(CallError::RateLimited {
                            error: "overloaded".into(),
                        })
                    } else {
                        Ok(())
                    }
                }
            })
            .await;
        assert!(res.is_ok());

        // Exactly one committed record despite three attempts.
        let sched_window = sched.lock_window();
        assert_eq!(sched_window.occupancy(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_delay_doubles_between_retries() {
        let mut c = cfg(10, 60);
        c.max_retries = 3;
        c.base_delay_secs = 1;
        let sched = Scheduler::new(c, Bus::default());
        let start = Instant::now();

        let _res: Result<(), _> = sched
            .submit("timing", || async {
                Err(CallError::Transient { error: "x".into() })
            })
            .await;

        // Two retry sleeps: 1s + 2s.
        assert_eq!(
            Instant::now().duration_since(start),
            Duration::from_secs(3)
        );
    }
}
