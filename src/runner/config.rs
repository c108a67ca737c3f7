//! # Runner configuration.
//!
//! [`RunnerConfig`] carries the supervision knobs: how long to wait for a
//! cancelled child to stop before forcing a kill, which key triggers
//! cancellation, and any extra redaction rules to apply to reports.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cancel::KeyBinding;

/// One custom needle→token redaction rule for report post-processing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedactRule {
    /// Literal text to replace (backslashes are normalized first).
    pub needle: String,
    /// Stable placeholder to substitute.
    pub token: String,
}

/// Configuration for the supervised subprocess runner.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Grace period between a termination request and a forced kill, in
    /// seconds. `0` kills immediately.
    pub grace_secs: u64,

    /// Key that cancels a running session (Esc always works too).
    pub cancel_key: KeyBinding,

    /// Extra redaction rules applied to every report, after the built-in
    /// working-tree and toolchain rules.
    pub redactions: Vec<RedactRule>,
}

impl Default for RunnerConfig {
    /// Defaults: 2-second grace, `q` cancel key, no extra redactions.
    fn default() -> Self {
        Self {
            grace_secs: 2,
            cancel_key: KeyBinding::default(),
            redactions: Vec::new(),
        }
    }
}

impl RunnerConfig {
    /// The kill-escalation grace period as a [`Duration`].
    #[inline]
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }
}
