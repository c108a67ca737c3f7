//! # Admission strictness for the rate-limit window.
//!
//! Checking the window *before* sending and charging it only *after* a
//! successful call is the lenient reading of a trailing-window limit: under
//! bursty concurrent submission it lets more attempts be in flight than the
//! window has room for, even though accepted calls stay close to the cap.
//! The strict reading reserves a slot up front. Both are reasonable, so the
//! choice is a knob instead of a silent decision.

use serde::{Deserialize, Serialize};

/// Controls when a submission is charged against the rate-limit window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionPolicy {
    /// Charge the window only when a call succeeds.
    ///
    /// Failed attempts never consume quota. Concurrent submissions may
    /// transiently put more attempts in flight than `capacity`; the committed
    /// record count can overshoot only when several racing attempts succeed
    /// inside one window.
    CommitOnSuccess,

    /// Reserve a slot at admission; commit it on success, release on failure.
    ///
    /// Gives a hard guarantee: at no point do in-flight attempts plus
    /// accepted calls exceed `capacity` within one window, even with many
    /// concurrent submitters.
    ReserveThenCommit,
}

impl Default for AdmissionPolicy {
    /// Returns [`AdmissionPolicy::CommitOnSuccess`].
    fn default() -> Self {
        AdmissionPolicy::CommitOnSuccess
    }
}

impl AdmissionPolicy {
    /// True when a slot must be reserved before the attempt is sent.
    #[inline]
    pub fn reserves(&self) -> bool {
        matches!(self, AdmissionPolicy::ReserveThenCommit)
    }
}
