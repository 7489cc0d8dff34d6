//! Hooks the controller calls out to.
//!
//! - `SessionObserver` receives a `Snapshot` after every change. This is how
//!   a presentation layer learns it should redraw.
//! - `FlipCue` is told about every accepted flip so a frontend can play a
//!   sound. It is fire-and-forget: it returns nothing and must not block.

use tracing::trace;

use crate::core::{Card, Snapshot};

/// Receives state snapshots.
///
/// Any `FnMut(&Snapshot) + Send` closure is an observer.
pub trait SessionObserver: Send {
    fn state_changed(&mut self, snapshot: &Snapshot);
}

impl<F> SessionObserver for F
where
    F: FnMut(&Snapshot) + Send,
{
    fn state_changed(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}

/// Feedback cue played on every accepted flip.
pub trait FlipCue: Send {
    fn flip(&self, card: Card);
}

/// Cue that only logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentCue;

impl FlipCue for SilentCue {
    fn flip(&self, card: Card) {
        trace!(value = card.value, "Flip cue");
    }
}
