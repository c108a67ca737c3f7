//! # Session state machine and the process report.
//!
//! One supervised child-process execution moves through:
//!
//! ```text
//! NotStarted ──► Running ──► Completed   (child exited on its own)
//!                        ├─► Terminated  (cancellation requested and honored)
//!                        └─► Failed      (runner could not start/supervise)
//! ```
//!
//! All three right-hand states are terminal. A nonzero exit code is a
//! *reported* outcome under `Completed`, not a runner failure.

/// Lifecycle state of one supervised execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// The child has not been spawned yet.
    NotStarted,
    /// The child is running under supervision.
    Running,
    /// The child exited on its own; the exit code was recorded.
    Completed,
    /// Cancellation was requested and the child is confirmed stopped.
    Terminated,
    /// The runner itself could not start or supervise the child.
    Failed,
}

impl SessionState {
    /// True for states from which no further transition occurs.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Terminated | SessionState::Failed
        )
    }

    /// Whether `next` is a legal successor of this state.
    pub fn may_advance(&self, next: SessionState) -> bool {
        match (self, next) {
            (SessionState::NotStarted, SessionState::Running) => true,
            // Spawn failures go terminal without ever running.
            (SessionState::NotStarted, SessionState::Failed) => true,
            (SessionState::Running, n) => n.is_terminal(),
            _ => false,
        }
    }

    /// Advances to `next` when legal; terminal states absorb all requests.
    ///
    /// Returns whether the transition was applied.
    pub fn advance(&mut self, next: SessionState) -> bool {
        if self.may_advance(next) {
            *self = next;
            true
        } else {
            false
        }
    }
}

/// Which output stream a chunk came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamTag {
    /// The child's standard output.
    Stdout,
    /// The child's standard error.
    Stderr,
}

impl StreamTag {
    /// Returns a short stable label for combined-log rendering.
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamTag::Stdout => "stdout",
            StreamTag::Stderr => "stderr",
        }
    }
}

/// One line of child output, tagged with its stream of origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamChunk {
    /// Stream the line was read from.
    pub tag: StreamTag,
    /// The line text (without trailing newline).
    pub text: String,
}

/// Terminal outcome of a supervised run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The child exited on its own, with whatever code it chose.
    Completed {
        /// Recorded exit code (`-1` when the platform reports none, e.g.
        /// death by signal).
        exit_code: i32,
    },
    /// The run was cancelled by the user and the child is confirmed stopped.
    Terminated,
    /// The runner could not start or supervise the child.
    Failed {
        /// Redacted description of what went wrong.
        error: String,
    },
}

impl RunOutcome {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunOutcome::Completed { .. } => "run_completed",
            RunOutcome::Terminated => "run_terminated",
            RunOutcome::Failed { .. } => "run_failed",
        }
    }

    /// The session state this outcome corresponds to.
    pub fn state(&self) -> SessionState {
        match self {
            RunOutcome::Completed { .. } => SessionState::Completed,
            RunOutcome::Terminated => SessionState::Terminated,
            RunOutcome::Failed { .. } => SessionState::Failed,
        }
    }
}

/// Structured result of one supervised execution.
///
/// All text is redacted before the report is handed back: absolute paths of
/// the working tree and the toolchain installation are replaced with stable
/// placeholder tokens, so reports are reproducible across machines.
#[derive(Clone, Debug)]
pub struct ProcessReport {
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Child stdout, lines in arrival order.
    pub stdout: String,
    /// Child stderr, lines in arrival order.
    pub stderr: String,
    /// Best-effort interleaving of both streams, each line tagged with its
    /// origin. Within one stream order is exact; across streams it is not
    /// guaranteed.
    pub combined: Vec<StreamChunk>,
    /// Whether the user cancelled the run.
    pub cancelled_by_user: bool,
}

impl ProcessReport {
    /// The exit code, present only when the child completed on its own.
    pub fn exit_code(&self) -> Option<i32> {
        match self.outcome {
            RunOutcome::Completed { exit_code } => Some(exit_code),
            _ => None,
        }
    }

    /// Renders the combined log as `tag: line` text, one entry per line.
    pub fn combined_text(&self) -> String {
        self.combined
            .iter()
            .map(|c| format!("{}: {}", c.tag.as_str(), c.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
