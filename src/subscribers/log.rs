//! # Logging subscriber.
//!
//! [`LogWriter`] renders events through the [`log`] facade so the embedding
//! application controls the sink and filtering.
//!
//! ## Output format
//! ```text
//! [admission-wait] call=generate-plan wait=1.73s
//! [accepted] call=generate-plan attempt=1
//! [retry] call=generate-plan attempt=2 delay=120.00s err="rate limited: 429"
//! [abandoned] call=generate-plan attempt=20 err="retries exhausted"
//! [spawned] cmd=main.py
//! [exited] cmd=main.py code=0
//! [cancel-requested] cmd=main.py
//! [kill-escalated] cmd=main.py grace=2.00s
//! [terminated] cmd=main.py
//! ```

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::error::fmt_delay;
use crate::events::{Event, EventKind};
use crate::subscribers::subscribe::Subscribe;

/// Subscriber that logs every event via the `log` facade.
///
/// Failures and escalations log at `warn`, admission waits at `debug`,
/// everything else at `info`.
#[derive(Debug, Default)]
pub struct LogWriter;

impl LogWriter {
    /// Creates a new log writer.
    pub fn new() -> Self {
        Self
    }
}

fn opt(field: &Option<std::sync::Arc<str>>) -> &str {
    field.as_deref().unwrap_or("?")
}

fn delay(ms: Option<u32>) -> String {
    fmt_delay(Duration::from_millis(u64::from(ms.unwrap_or(0))))
}

#[async_trait]
impl Subscribe for LogWriter {
    fn name(&self) -> &str {
        "log-writer"
    }

    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::AdmissionWait => {
                debug!(
                    "[admission-wait] call={} wait={}",
                    opt(&e.name),
                    delay(e.delay_ms)
                );
            }
            EventKind::CallAccepted => {
                info!(
                    "[accepted] call={} attempt={}",
                    opt(&e.name),
                    e.attempt.unwrap_or(0)
                );
            }
            EventKind::CallFailed => {
                warn!(
                    "[failed] call={} attempt={} err={:?}",
                    opt(&e.name),
                    e.attempt.unwrap_or(0),
                    opt(&e.reason)
                );
            }
            EventKind::CallRetryScheduled => {
                warn!(
                    "[retry] call={} attempt={} delay={} err={:?}",
                    opt(&e.name),
                    e.attempt.unwrap_or(0),
                    delay(e.delay_ms),
                    opt(&e.reason)
                );
            }
            EventKind::CallAbandoned => {
                warn!(
                    "[abandoned] call={} attempt={} err={:?}",
                    opt(&e.name),
                    e.attempt.unwrap_or(0),
                    opt(&e.reason)
                );
            }
            EventKind::ProcessSpawned => {
                info!("[spawned] cmd={}", opt(&e.name));
            }
            EventKind::ProcessSpawnFailed => {
                warn!("[spawn-failed] cmd={} err={:?}", opt(&e.name), opt(&e.reason));
            }
            EventKind::ProcessExited => {
                info!(
                    "[exited] cmd={} code={}",
                    opt(&e.name),
                    e.exit_code.unwrap_or(-1)
                );
            }
            EventKind::CancelRequested => {
                info!("[cancel-requested] cmd={}", opt(&e.name));
            }
            EventKind::KillEscalated => {
                warn!(
                    "[kill-escalated] cmd={} grace={}",
                    opt(&e.name),
                    delay(e.delay_ms)
                );
            }
            EventKind::ProcessTerminated => {
                info!("[terminated] cmd={}", opt(&e.name));
            }
        }
    }
}
