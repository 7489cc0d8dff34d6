//! Deferred work and the epochs that keep it honest.
//!
//! Two things happen "later" in a session: a mismatched pair turns back face
//! down after a short reveal, and a timeout notice disappears after a few
//! seconds. Both are described by a `Deferred` value that records the epochs
//! current when it was scheduled. When it comes due, the controller compares
//! those epochs with its own and drops the task if anything has moved on
//! (the game was restarted, the turn already passed, a newer notice was shown).

use std::time::Duration;

/// Monotonic counters identifying the live game, turn, timer run and timeout notice.
///
/// They only ever increase, across games as well as within one, so a value
/// captured in one game can never match a later game by accident.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Epochs {
    /// Bumped by every start and restart.
    pub game: u64,
    /// Bumped whenever the turn passes, and by every start and restart.
    pub turn: u64,
    /// Bumped whenever a timeout notice is shown.
    pub message: u64,
    /// Bumped whenever the turn timer is refilled: a new game, a new turn, or
    /// an accepted flip.
    pub timer: u64,
}

/// Identity of the running turn timer.
///
/// The driver keeps exactly one tick interval alive per key and rebuilds it
/// whenever the key changes, so the first tick after a refill always comes a
/// full period later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerKey {
    pub game: u64,
    pub turn: u64,
    pub timer: u64,
}

/// Work to run after a delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deferred {
    /// Turn a mismatched pair back over and pass the turn.
    ResolveMismatch { game: u64, turn: u64 },
    /// Remove the timeout notice.
    ClearTimeoutMessage { game: u64, message: u64 },
}

impl Deferred {
    /// Game epoch the task was scheduled under.
    #[must_use]
    pub fn game(&self) -> u64 {
        match *self {
            Deferred::ResolveMismatch { game, .. } | Deferred::ClearTimeoutMessage { game, .. } => game,
        }
    }

    /// Whether the task still applies under `epochs`.
    #[must_use]
    pub fn is_current(&self, epochs: &Epochs) -> bool {
        match *self {
            Deferred::ResolveMismatch { game, turn } => game == epochs.game && turn == epochs.turn,
            Deferred::ClearTimeoutMessage { game, message } => {
                game == epochs.game && message == epochs.message
            }
        }
    }
}

/// A deferred task together with how long to wait before running it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledTask {
    pub delay: Duration,
    pub task: Deferred,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_is_current() {
        let epochs = Epochs { game: 2, turn: 5, message: 1, timer: 3 };

        assert!(Deferred::ResolveMismatch { game: 2, turn: 5 }.is_current(&epochs));
        assert!(!Deferred::ResolveMismatch { game: 2, turn: 4 }.is_current(&epochs));
        assert!(!Deferred::ResolveMismatch { game: 1, turn: 5 }.is_current(&epochs));
    }

    #[test]
    fn test_clear_message_is_current() {
        let epochs = Epochs { game: 2, turn: 5, message: 1, timer: 3 };

        assert!(Deferred::ClearTimeoutMessage { game: 2, message: 1 }.is_current(&epochs));
        // A turn change does not invalidate a notice
        assert!(Deferred::ClearTimeoutMessage { game: 2, message: 1 }
            .is_current(&Epochs { turn: 9, timer: 4, ..epochs }));
        assert!(!Deferred::ClearTimeoutMessage { game: 2, message: 0 }.is_current(&epochs));
        assert!(!Deferred::ClearTimeoutMessage { game: 3, message: 1 }.is_current(&epochs));
    }

    #[test]
    fn test_game_epoch() {
        assert_eq!(Deferred::ResolveMismatch { game: 7, turn: 1 }.game(), 7);
        assert_eq!(Deferred::ClearTimeoutMessage { game: 3, message: 1 }.game(), 3);
    }
}
