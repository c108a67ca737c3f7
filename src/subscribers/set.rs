//! # Fan-out set of subscribers.
//!
//! [`SubscriberSet`] holds the registered subscribers and delivers each
//! [`Event`] to all of them in registration order. [`SubscriberSet::attach`]
//! spawns the listener task that bridges a [`Bus`] to the set.
//!
//! ## Lag behavior
//! The listener reads from a broadcast receiver; if subscribers are slow
//! enough that the bus ring buffer wraps, the receiver observes
//! `RecvError::Lagged(n)` and the listener logs the skip and continues.
//! Event delivery is best-effort by design.

use std::sync::Arc;

use log::warn;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::events::{Bus, Event};
use crate::subscribers::subscribe::Subscribe;

/// Ordered collection of subscribers sharing one event stream.
#[derive(Default)]
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a set from the given subscribers.
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Delivers one event to every subscriber, sequentially.
    pub async fn emit(&self, ev: &Event) {
        for sub in &self.subs {
            sub.on_event(ev).await;
        }
    }

    /// Subscribes to the bus and forwards events to this set.
    ///
    /// The returned handle finishes when the bus is dropped (all senders gone).
    /// Dropping the handle detaches the listener without stopping it.
    pub fn attach(self: Arc<Self>, bus: &Bus) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => self.emit(&ev).await,
                    Err(RecvError::Lagged(n)) => {
                        warn!("subscriber listener lagged; skipped {n} events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
