//! # One-way cancellation signal.
//!
//! [`CancelSignal`] is the only state shared across the console-listener
//! thread boundary. The listener thread sets it exactly once; supervisor and
//! drain tasks observe it. Once set it is never cleared: cancellation of a
//! session is a one-way transition.

use tokio_util::sync::CancellationToken;

/// Shared one-shot cancellation flag for a single supervised run.
///
/// Cloning shares the same underlying flag (the handle is `Arc`-backed);
/// the flag itself is never copied.
///
/// # Example
/// ```
/// use pacerun::CancelSignal;
///
/// let signal = CancelSignal::new();
/// let observer = signal.clone();
/// assert!(!observer.is_set());
/// signal.set();
/// assert!(observer.is_set());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancelSignal {
    token: CancellationToken,
}

impl CancelSignal {
    /// Creates a fresh, unset signal.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Sets the flag. Idempotent; the flag can never be cleared afterwards.
    pub fn set(&self) {
        self.token.cancel();
    }

    /// Returns whether the flag has been set.
    pub fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the flag is set (immediately if it already is).
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_is_one_way_and_shared() {
        let signal = CancelSignal::new();
        let observer = signal.clone();

        let waiter = tokio::spawn({
            let s = signal.clone();
            async move {
                s.cancelled().await;
            }
        });

        assert!(!observer.is_set());
        signal.set();
        signal.set(); // idempotent
        assert!(observer.is_set());
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_completes_immediately_when_already_set() {
        let signal = CancelSignal::new();
        signal.set();
        signal.cancelled().await;
    }

    #[test]
    fn set_observable_across_thread_boundary() {
        let signal = CancelSignal::new();
        let observer = signal.clone();
        let handle = std::thread::spawn(move || {
            observer.set();
        });
        handle.join().unwrap();
        assert!(signal.is_set());
    }
}
