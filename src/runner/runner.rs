//! # Supervised subprocess runner.
//!
//! Owns one child-process lifecycle: spawn with both output streams piped,
//! drain them concurrently, watch for user cancellation, and compose the
//! final [`ProcessReport`].
//!
//! ## Architecture
//! ```text
//! Runner::run(argv, cwd)
//!   ├─► spawn child (stdout/stderr piped, kill_on_drop)
//!   ├─► drainer task (stdout) ──┐
//!   ├─► drainer task (stderr) ──┼──► per-stream buffers + combined log
//!   ├─► console watch thread ───┘──► CancelSignal
//!   └─► select:
//!        ├─ child exits        ──► Completed { exit_code }
//!        └─ signal set         ──► terminate ── grace ──► kill ──► Terminated
//!   then: join both drainers, redact, report
//! ```
//!
//! ## Rules
//! - Both drainers start immediately after spawn; a runner that reads one
//!   stream to completion before the other can deadlock against a full pipe.
//! - `Terminated` is reported only after the child is confirmed stopped;
//!   cancellation never leaves a session in limbo. The child leads its own
//!   process group and both signals target the group, so grandchildren
//!   cannot outlive a cancellation.
//! - Buffers are read only after both drainers were joined. After a
//!   termination the joins are bounded: an orphan holding the pipe open
//!   must not stall the report.
//! - Spawn errors are captured as `Failed`, never retried here.
//! - No timeout is imposed on execution; only user cancellation ends a run
//!   early.

use std::path::Path;
use std::process::Stdio;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time;

use crate::cancel::{CancelSignal, ConsoleInput};
use crate::events::{Bus, Event, EventKind};
use crate::runner::config::RunnerConfig;
use crate::runner::drain::{CombinedLog, drain_stream};
use crate::runner::redact::Redactor;
use crate::runner::session::{ProcessReport, RunOutcome, SessionState, StreamTag};

/// Launches and supervises one child process per [`run`](Runner::run) call.
pub struct Runner {
    cfg: RunnerConfig,
    bus: Bus,
}

impl Runner {
    /// Creates a runner with the given configuration, publishing events to `bus`.
    pub fn new(cfg: RunnerConfig, bus: Bus) -> Self {
        Self { cfg, bus }
    }

    /// Executes `argv` in `cwd` under supervision, with console cancellation.
    ///
    /// Wires a terminal watch for the configured cancel key, runs the child
    /// via [`run_with_cancel`](Runner::run_with_cancel), then stops the watch
    /// and flushes any console input buffered during supervision so stray
    /// keystrokes do not leak into the caller's next prompt.
    pub async fn run(&self, argv: &[String], cwd: &Path) -> ProcessReport {
        let input = ConsoleInput::detect();
        let signal = CancelSignal::new();
        let watch = input.watch(self.cfg.cancel_key, signal.clone());

        let report = self.run_with_cancel(argv, cwd, signal).await;

        watch.stop();
        input.flush();
        report
    }

    /// Executes `argv` in `cwd` under supervision with an external
    /// cancellation signal.
    ///
    /// The caller owns the signal; setting it at any point while the child
    /// runs terminates the session (gracefully, then forcibly after the
    /// configured grace period). All report text is redacted before return.
    pub async fn run_with_cancel(
        &self,
        argv: &[String],
        cwd: &Path,
        signal: CancelSignal,
    ) -> ProcessReport {
        let Some((program, args)) = argv.split_first() else {
            return failed_report("empty command".to_string());
        };
        let name = program.clone();
        let redactor = self.build_redactor(cwd, Path::new(program));
        let mut state = SessionState::NotStarted;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so cancellation can signal the whole tree and
        // not just the direct child.
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                state.advance(SessionState::Failed);
                let error = redactor.redact(&format!("spawning {name}: {err}"));
                self.bus.publish(
                    Event::new(EventKind::ProcessSpawnFailed)
                        .with_name(name.as_str())
                        .with_reason(error.clone()),
                );
                return failed_report(error);
            }
        };

        if state.advance(SessionState::Running) {
            self.bus
                .publish(Event::new(EventKind::ProcessSpawned).with_name(name.as_str()));
        }

        // Both drainers start before anything waits on the child, so neither
        // pipe can fill while the other is being read.
        let combined: CombinedLog = Arc::default();
        let out_task = child
            .stdout
            .take()
            .map(|s| tokio::spawn(drain_stream(s, StreamTag::Stdout, Arc::clone(&combined))));
        let err_task = child
            .stderr
            .take()
            .map(|s| tokio::spawn(drain_stream(s, StreamTag::Stderr, Arc::clone(&combined))));

        let wait_result = {
            let wait = child.wait();
            tokio::pin!(wait);
            tokio::select! {
                status = &mut wait => Some(status),
                _ = signal.cancelled() => None,
            }
        };

        let outcome = match wait_result {
            Some(Ok(status)) => {
                let exit_code = status.code().unwrap_or(-1);
                state.advance(SessionState::Completed);
                self.bus.publish(
                    Event::new(EventKind::ProcessExited)
                        .with_name(name.as_str())
                        .with_exit_code(exit_code),
                );
                RunOutcome::Completed { exit_code }
            }
            Some(Err(err)) => {
                state.advance(SessionState::Failed);
                RunOutcome::Failed {
                    error: redactor.redact(&format!("waiting for {name}: {err}")),
                }
            }
            None => {
                self.bus
                    .publish(Event::new(EventKind::CancelRequested).with_name(name.as_str()));
                self.shutdown_child(&mut child, &name).await;
                state.advance(SessionState::Terminated);
                RunOutcome::Terminated
            }
        };

        // On a normal exit the streams are at EOF and the joins return at
        // once. After a termination, grandchildren outside our reach could
        // still hold the inherited write ends open, so the joins are bounded
        // and the combined log stands in for an aborted drainer.
        let bounded = matches!(outcome, RunOutcome::Terminated);
        let stdout_lines = join_drainer(out_task, StreamTag::Stdout, &combined, bounded).await;
        let stderr_lines = join_drainer(err_task, StreamTag::Stderr, &combined, bounded).await;
        let mut combined = {
            let mut log = combined.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *log)
        };
        for chunk in &mut combined {
            chunk.text = redactor.redact(&chunk.text);
        }

        let cancelled_by_user = matches!(outcome, RunOutcome::Terminated);
        ProcessReport {
            outcome,
            stdout: redactor.redact(&join_lines(&stdout_lines)),
            stderr: redactor.redact(&join_lines(&stderr_lines)),
            combined,
            cancelled_by_user,
        }
    }

    /// Stops a cancelled child: terminate request, bounded grace, then a
    /// forced kill. Both signals target the child's process group, so
    /// grandchildren go down with it. Returns only once the direct child has
    /// actually stopped.
    async fn shutdown_child(&self, child: &mut Child, name: &str) {
        request_terminate(child);

        let grace = self.cfg.grace();
        if time::timeout(grace, child.wait()).await.is_err() {
            self.bus.publish(
                Event::new(EventKind::KillEscalated)
                    .with_name(name)
                    .with_delay(grace),
            );
            request_kill(child);
            let _ = child.wait().await;
        }

        self.bus
            .publish(Event::new(EventKind::ProcessTerminated).with_name(name));
    }

    fn build_redactor(&self, cwd: &Path, program: &Path) -> Redactor {
        let mut redactor = Redactor::for_run(cwd, program);
        for rule in &self.cfg.redactions {
            redactor = redactor.rule(&rule.needle, &rule.token);
        }
        redactor
    }
}

/// Sends the platform's polite termination request to the child's group.
///
/// The child leads its own process group (pgid == pid), so the negative-pid
/// form reaches every descendant still in the group.
#[cfg(unix)]
fn request_terminate(child: &mut Child) {
    signal_group(child, libc::SIGTERM);
}

/// Forcibly kills the child's process group.
#[cfg(unix)]
fn request_kill(child: &mut Child) {
    signal_group(child, libc::SIGKILL);
}

#[cfg(unix)]
fn signal_group(child: &mut Child, sig: libc::c_int) {
    match child.id() {
        Some(pid) => unsafe {
            libc::kill(-(pid as libc::pid_t), sig);
        },
        // Already reaped; nothing to signal.
        None => {
            let _ = child.start_kill();
        }
    }
}

/// Windows has no graceful signal for console-less children; kill directly.
#[cfg(not(unix))]
fn request_terminate(child: &mut Child) {
    let _ = child.start_kill();
}

#[cfg(not(unix))]
fn request_kill(child: &mut Child) {
    let _ = child.start_kill();
}

/// How long a drainer may keep running after the child was terminated.
const DRAIN_WAIT: Duration = Duration::from_millis(500);

/// Joins one drainer, bounded when the child did not exit on its own.
///
/// A drainer that outlives the bound is stuck on a pipe held open by an
/// orphaned grandchild; it is aborted and the lines it already pushed to the
/// combined log are used instead.
async fn join_drainer(
    task: Option<JoinHandle<Vec<String>>>,
    tag: StreamTag,
    combined: &CombinedLog,
    bounded: bool,
) -> Vec<String> {
    let Some(mut task) = task else {
        return Vec::new();
    };
    if !bounded {
        return task.await.unwrap_or_default();
    }
    match time::timeout(DRAIN_WAIT, &mut task).await {
        Ok(lines) => lines.unwrap_or_default(),
        Err(_) => {
            task.abort();
            combined
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .filter(|c| c.tag == tag)
                .map(|c| c.text.clone())
                .collect()
        }
    }
}

fn failed_report(error: String) -> ProcessReport {
    ProcessReport {
        outcome: RunOutcome::Failed { error },
        stdout: String::new(),
        stderr: String::new(),
        combined: Vec::new(),
        cancelled_by_user: false,
    }
}

fn join_lines(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn runner() -> Runner {
        Runner::new(RunnerConfig::default(), Bus::default())
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn echo_hello_reports_clean_completion() {
        let dir = tempfile::tempdir().unwrap();
        let argv = vec!["echo".to_string(), "hello".to_string()];
        let report = runner()
            .run_with_cancel(&argv, dir.path(), CancelSignal::new())
            .await;

        assert_eq!(report.stdout, "hello\n");
        assert_eq!(report.stderr, "");
        assert_eq!(report.exit_code(), Some(0));
        assert!(!report.cancelled_by_user);
        assert_eq!(report.outcome.state(), SessionState::Completed);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_a_reported_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let report = runner()
            .run_with_cancel(&sh("echo boom 1>&2; exit 3"), dir.path(), CancelSignal::new())
            .await;

        assert_eq!(report.exit_code(), Some(3));
        assert_eq!(report.stderr, "boom\n");
        assert!(!report.cancelled_by_user);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn heavy_interleaved_output_does_not_deadlock() {
        // Each stream gets well over a pipe buffer's worth of data while the
        // child alternates between them.
        let script = "i=1; while [ $i -le 5000 ]; do \
                      echo out-line-$i-padding-padding-padding; \
                      echo err-line-$i-padding-padding-padding 1>&2; \
                      i=$((i+1)); done";
        let dir = tempfile::tempdir().unwrap();
        let report = runner()
            .run_with_cancel(&sh(script), dir.path(), CancelSignal::new())
            .await;

        assert_eq!(report.exit_code(), Some(0));
        let out: Vec<&str> = report.stdout.lines().collect();
        let err: Vec<&str> = report.stderr.lines().collect();
        assert_eq!(out.len(), 5000);
        assert_eq!(err.len(), 5000);
        // FIFO within each stream, independent of relative write timing.
        assert_eq!(out[0], "out-line-1-padding-padding-padding");
        assert_eq!(out[4999], "out-line-5000-padding-padding-padding");
        assert_eq!(err[0], "err-line-1-padding-padding-padding");
        assert_eq!(err[4999], "err-line-5000-padding-padding-padding");
        assert_eq!(report.combined.len(), 10_000);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancellation_terminates_within_grace() {
        let dir = tempfile::tempdir().unwrap();
        let signal = CancelSignal::new();
        let trigger = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            trigger.set();
        });

        let argv = vec!["sleep".to_string(), "10".to_string()];
        let started = Instant::now();
        let report = runner().run_with_cancel(&argv, dir.path(), signal).await;

        assert!(report.cancelled_by_user);
        assert_eq!(report.outcome, RunOutcome::Terminated);
        assert_eq!(report.exit_code(), None);
        // Cancelled at ~0.25s with a 2s grace; well inside the bound.
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn sigterm_ignoring_child_is_killed_after_grace() {
        let mut cfg = RunnerConfig::default();
        cfg.grace_secs = 1;
        let runner = Runner::new(cfg, Bus::default());

        let dir = tempfile::tempdir().unwrap();
        let signal = CancelSignal::new();
        let trigger = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.set();
        });

        let started = Instant::now();
        let report = runner
            .run_with_cancel(&sh("trap '' TERM; sleep 30"), dir.path(), signal)
            .await;

        assert!(report.cancelled_by_user);
        assert_eq!(report.outcome, RunOutcome::Terminated);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn grandchildren_holding_pipes_do_not_stall_cancellation() {
        // The detached grandchild inherits stdout/stderr but leaves the
        // process group, so it survives the group signals and keeps the
        // pipe write ends open; the report must not wait for it.
        let mut cfg = RunnerConfig::default();
        cfg.grace_secs = 1;
        let runner = Runner::new(cfg, Bus::default());

        let dir = tempfile::tempdir().unwrap();
        let signal = CancelSignal::new();
        let trigger = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.set();
        });

        let started = Instant::now();
        let script = "echo started; setsid sleep 30 & trap '' TERM; sleep 30";
        let report = runner
            .run_with_cancel(&sh(script), dir.path(), signal)
            .await;

        assert!(report.cancelled_by_user);
        assert_eq!(report.outcome, RunOutcome::Terminated);
        // Output captured before cancellation survives the bounded join.
        assert!(report.stdout.contains("started"));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn missing_binary_reports_failed() {
        let dir = tempfile::tempdir().unwrap();
        let argv = vec!["pacerun-test-no-such-binary".to_string()];
        let report = runner()
            .run_with_cancel(&argv, dir.path(), CancelSignal::new())
            .await;

        match &report.outcome {
            RunOutcome::Failed { error } => assert!(!error.is_empty()),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(report.exit_code(), None);
        assert!(!report.cancelled_by_user);
    }

    #[tokio::test]
    async fn empty_argv_reports_failed() {
        let dir = tempfile::tempdir().unwrap();
        let report = runner()
            .run_with_cancel(&[], dir.path(), CancelSignal::new())
            .await;
        assert!(matches!(report.outcome, RunOutcome::Failed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn working_tree_paths_are_redacted() {
        let dir = tempfile::tempdir().unwrap();
        let report = runner()
            .run_with_cancel(&sh("pwd"), dir.path(), CancelSignal::new())
            .await;

        assert_eq!(report.stdout, "<project>\n");
        assert!(!report.stdout.contains(dir.path().to_str().unwrap()));
    }
}
