//! # Subscriber trait for runtime events.
//!
//! A [`Subscribe`] implementation observes [`Event`]s published on the
//! [`Bus`](crate::Bus). Subscribers must be passive with respect to the
//! scheduler and runner: they never mutate session buffers or window state,
//! only react (logging, metrics, alerting).

use async_trait::async_trait;

use crate::events::Event;

/// # Observer of runtime events.
///
/// Implementations receive every event delivered by the listener task spawned
/// via [`SubscriberSet::attach`](crate::SubscriberSet::attach). Handlers run
/// on the listener task, so they should return quickly; offload heavy work.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use pacerun::{Event, EventKind, Subscribe};
///
/// struct RetryCounter;
///
/// #[async_trait]
/// impl Subscribe for RetryCounter {
///     fn name(&self) -> &str { "retry-counter" }
///
///     async fn on_event(&self, event: &Event) {
///         if event.kind == EventKind::CallRetryScheduled {
///             // increment a counter...
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Returns a stable, human-readable subscriber name.
    fn name(&self) -> &str;

    /// Handles a single event.
    async fn on_event(&self, event: &Event);
}
