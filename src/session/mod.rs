//! The game session: state machine, deferred work, observers.
//!
//! - `controller`: `SessionController`, the only code that mutates session state
//! - `schedule`: deferred tasks and the epochs that invalidate them
//! - `observer`: snapshot observers and the flip cue

pub mod controller;
pub mod observer;
pub mod schedule;

pub use controller::{FlipOutcome, IgnoreReason, SessionController, TickOutcome};
pub use observer::{FlipCue, SessionObserver, SilentCue};
pub use schedule::{Deferred, Epochs, ScheduledTask, TimerKey};
