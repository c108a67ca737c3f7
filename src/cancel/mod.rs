//! User-initiated cancellation plumbing.
//!
//! Two pieces: the one-way [`CancelSignal`] shared between the console
//! listener and the runner's tasks, and the [`TerminalInput`] controller
//! that turns a key press into a signal set.
//!
//! The listener side runs on its own OS thread (blocking key reads are not
//! cooperative); everything else observes the signal from async context.

mod console;
mod signal;

pub use console::{ConsoleInput, InputWatch, KeyBinding, NullInput, TerminalInput};
pub use signal::CancelSignal;
