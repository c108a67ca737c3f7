//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out, and a built-in [`LogWriter`] that renders events through the
//! `log` facade.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Scheduler/Runner ── publish(Event) ──► Bus ──► SubscriberSet::attach listener
//!                                                       │
//!                                                  ┌────┴─────┬────────┐
//!                                                  ▼          ▼        ▼
//!                                              LogWriter   Metrics   Custom
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
