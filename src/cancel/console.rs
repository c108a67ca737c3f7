//! # Terminal input controller.
//!
//! Watches the console for a cancellation key press while a supervised run
//! is in progress. The platform's blocking key-read primitive is not
//! cooperative, so the watch runs on a **dedicated OS thread**; it
//! communicates exclusively through the one-way [`CancelSignal`] and never
//! touches session buffers.
//!
//! ```text
//! ConsoleInput::watch(binding, signal)
//!        │
//!        └─► std::thread ── crossterm poll/read loop ──► signal.set()
//!                                                         (on 'q' / Esc)
//! Runner ◄──────────────── signal.cancelled() ───────────┘
//! ```
//!
//! [`TerminalInput::flush`] discards any input buffered but not consumed
//! during supervision, so stray keystrokes do not leak into the caller's
//! next interactive prompt.

use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use serde::{Deserialize, Serialize};

use crate::cancel::signal::CancelSignal;

/// Poll interval for the watch thread; bounds how quickly it notices `stop`.
const POLL_TICK: Duration = Duration::from_millis(100);

/// The key that triggers cancellation.
///
/// Esc is always honored in addition to the bound character; matching is
/// case-insensitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBinding {
    /// Character that triggers cancellation.
    pub ch: char,
}

impl Default for KeyBinding {
    /// Returns the `q` binding.
    fn default() -> Self {
        Self { ch: 'q' }
    }
}

impl KeyBinding {
    /// Returns whether a key code triggers cancellation under this binding.
    pub fn matches(&self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => true,
            KeyCode::Char(c) => c.eq_ignore_ascii_case(&self.ch),
            _ => false,
        }
    }
}

/// Handle to an active key watch.
///
/// Dropping the handle stops the watch thread and joins it.
#[derive(Debug)]
pub struct InputWatch {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl InputWatch {
    /// A watch with no backing thread (headless environments).
    fn inert() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(true)),
            thread: None,
        }
    }

    /// Stops the watch thread and waits for it to exit.
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for InputWatch {
    fn drop(&mut self) {
        self.halt();
    }
}

/// # Seam between the runner and the platform console.
///
/// Implementations are selected at startup based on what the environment can
/// actually do, instead of spreading platform conditionals through the
/// runner.
pub trait TerminalInput: Send + Sync {
    /// Starts watching for the cancellation key; on a match, sets `signal`.
    ///
    /// The watch also ends on its own once `signal` is set by anyone else.
    fn watch(&self, binding: KeyBinding, signal: CancelSignal) -> InputWatch;

    /// Discards any console input buffered but not yet consumed.
    fn flush(&self);
}

/// Console controller backed by crossterm key events.
///
/// Raw mode is enabled for the duration of a watch (required for unbuffered
/// key delivery on unix) and restored when the watch stops.
#[derive(Debug, Default)]
pub struct ConsoleInput;

impl ConsoleInput {
    /// Picks the controller appropriate for this environment: the console
    /// watcher when stdin is a terminal, otherwise a no-op controller.
    pub fn detect() -> Box<dyn TerminalInput> {
        if std::io::stdin().is_terminal() {
            Box::new(ConsoleInput)
        } else {
            Box::new(NullInput)
        }
    }
}

impl TerminalInput for ConsoleInput {
    fn watch(&self, binding: KeyBinding, signal: CancelSignal) -> InputWatch {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let raw = enable_raw_mode().is_ok();
            while !thread_stop.load(Ordering::SeqCst) && !signal.is_set() {
                match event::poll(POLL_TICK) {
                    Ok(true) => {
                        if let Ok(Event::Key(key)) = event::read() {
                            if key.kind == KeyEventKind::Press && binding.matches(key.code) {
                                signal.set();
                                break;
                            }
                        }
                    }
                    Ok(false) => {}
                    Err(_) => break,
                }
            }
            if raw {
                let _ = disable_raw_mode();
            }
        });

        InputWatch {
            stop,
            thread: Some(handle),
        }
    }

    fn flush(&self) {
        while event::poll(Duration::ZERO).unwrap_or(false) {
            if event::read().is_err() {
                break;
            }
        }
    }
}

/// No-op controller for environments without an interactive console
/// (pipelines, CI). Cancellation can still arrive through a shared
/// [`CancelSignal`] set elsewhere.
#[derive(Debug, Default)]
pub struct NullInput;

impl TerminalInput for NullInput {
    fn watch(&self, _binding: KeyBinding, _signal: CancelSignal) -> InputWatch {
        InputWatch::inert()
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_matches_bound_char_case_insensitively() {
        let b = KeyBinding::default();
        assert!(b.matches(KeyCode::Char('q')));
        assert!(b.matches(KeyCode::Char('Q')));
        assert!(b.matches(KeyCode::Esc));
        assert!(!b.matches(KeyCode::Char('x')));
        assert!(!b.matches(KeyCode::Enter));
    }

    #[test]
    fn binding_deserializes_from_char() {
        let b: KeyBinding = toml::from_str::<std::collections::HashMap<String, KeyBinding>>(
            "key = \"c\"",
        )
        .unwrap()["key"];
        assert!(b.matches(KeyCode::Char('C')));
    }

    #[test]
    fn null_input_watch_is_inert() {
        let signal = CancelSignal::new();
        let watch = NullInput.watch(KeyBinding::default(), signal.clone());
        watch.stop();
        assert!(!signal.is_set());
        NullInput.flush();
    }
}
