//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] carries [`Event`]s from the scheduler and the runner to whoever
//! cares to listen. It is deliberately passive plumbing: publishing must
//! never slow a submission or a supervised run, so everything downstream of
//! `publish` is best-effort.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                  Subscribers (many):
//!   Scheduler ──┐
//!               ├──────► Bus ───────► SubscriberSet::attach ──► LogWriter
//!   Runner    ──┘   (broadcast chan)                        └─► custom subscribers
//! ```
//!
//! ## Rules
//! - `publish` never blocks and never fails from the publisher's view.
//! - One bounded ring buffer is shared by all receivers; a receiver that
//!   falls behind sees `RecvError::Lagged(n)` and loses the n oldest events.
//! - Nothing is stored: an event published while no receiver exists is gone.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Any number of publishers may share one bus (the handle is a cheap clone
/// of an `Arc`-backed sender); each receiver gets its own clone of every
/// event published after it subscribed.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus whose ring buffer holds `capacity` recent events,
    /// clamped to a minimum of 1. The buffer is shared across receivers,
    /// not allocated per subscriber.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all current receivers.
    ///
    /// Fire-and-forget: with no receivers the event is silently dropped,
    /// and the publisher never learns whether anyone consumed it.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Opens an independent receiver observing events published from this
    /// point on. A lagging receiver skips the oldest overwritten events and
    /// keeps going.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for Bus {
    /// Returns a bus with a 1024-event ring buffer.
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::CallAccepted).with_name("ping"));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::CallAccepted);
        assert_eq!(ev.name.as_deref(), Some("ping"));
    }

    #[tokio::test]
    async fn publish_without_receivers_is_dropped() {
        let bus = Bus::new(1);
        // No receiver subscribed; must not block or panic.
        bus.publish(Event::new(EventKind::ProcessSpawned));
    }
}
