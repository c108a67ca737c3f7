//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the scheduler and the
//! subprocess runner.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: [`Scheduler`](crate::Scheduler) (admission, retries,
//!   acceptance) and [`Runner`](crate::Runner) (spawn, exit, cancellation).
//! - **Consumers**: [`SubscriberSet::attach`](crate::SubscriberSet::attach),
//!   which fans events out to user subscribers such as
//!   [`LogWriter`](crate::LogWriter).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
