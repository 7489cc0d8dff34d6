//! Session state and the snapshots handed to the presentation layer.
//!
//! ## SessionState
//!
//! Everything a session knows: deck, flipped and matched cards, scores,
//! current player, turn timer, timeout notice and phase. Only the session
//! controller mutates it.
//!
//! ## Snapshot
//!
//! A read-only copy published after every change. Uses `im` persistent
//! collections, so taking one is O(1) no matter how large the board is.

use im::OrdSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::deck::{Card, CardIndex, Deck};
use super::player::{PlayerId, PlayerMap};
use crate::rules::GameResult;

/// Where the session is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for a start action. No board, no timer.
    #[default]
    NotStarted,
    /// Cards can be flipped and the turn timer runs.
    InProgress,
    /// Every pair has been found.
    GameOver,
}

/// Cards face up this turn, in the order they were flipped. Never more than two.
pub type FlippedCards = SmallVec<[CardIndex; 2]>;

/// Mutable state of one session.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub(crate) phase: Phase,
    pub(crate) deck: Deck,
    pub(crate) flipped: FlippedCards,
    pub(crate) matched: OrdSet<CardIndex>,
    pub(crate) scores: PlayerMap<u32>,
    pub(crate) current_player: PlayerId,
    pub(crate) turn_timer: u32,
    pub(crate) timeout_message: Option<String>,
    pub(crate) outcome: Option<GameResult>,
}

impl SessionState {
    /// State before any game has started.
    #[must_use]
    pub fn new(turn_seconds: u32) -> Self {
        Self {
            phase: Phase::NotStarted,
            deck: Deck::empty(),
            flipped: SmallVec::new(),
            matched: OrdSet::new(),
            scores: PlayerMap::with_value(0),
            current_player: PlayerId::ONE,
            turn_timer: turn_seconds,
            timeout_message: None,
            outcome: None,
        }
    }

    /// State at the first turn of a game played with `deck`.
    #[must_use]
    pub fn dealt(deck: Deck, turn_seconds: u32) -> Self {
        Self {
            phase: Phase::InProgress,
            deck,
            ..Self::new(turn_seconds)
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    #[must_use]
    pub fn scores(&self) -> &PlayerMap<u32> {
        &self.scores
    }

    #[must_use]
    pub fn is_flipped(&self, index: CardIndex) -> bool {
        self.flipped.contains(&index)
    }

    #[must_use]
    pub fn is_matched(&self, index: CardIndex) -> bool {
        self.matched.contains(&index)
    }

    /// Every card on a non-empty board has been matched.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.deck.is_empty() && self.matched.len() == self.deck.len()
    }

    /// Copy the state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            deck: self.deck.clone(),
            flipped: self.flipped.clone(),
            matched: self.matched.clone(),
            scores: self.scores.clone(),
            current_player: self.current_player,
            turn_timer: self.turn_timer,
            timeout_message: self.timeout_message.clone(),
            outcome: self.outcome,
        }
    }
}

/// How a card should be drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardFace {
    /// Face down; can be flipped.
    Hidden,
    /// Face up this turn.
    Revealed(u8),
    /// Permanently face up.
    Matched(u8),
}

/// Read-only view of a session at one moment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub deck: Deck,
    pub flipped: FlippedCards,
    pub matched: OrdSet<CardIndex>,
    pub scores: PlayerMap<u32>,
    pub current_player: PlayerId,
    pub turn_timer: u32,
    pub timeout_message: Option<String>,
    pub outcome: Option<GameResult>,
}

impl Snapshot {
    /// How the card at `index` should be drawn, or `None` if it is not on the board.
    #[must_use]
    pub fn face(&self, index: CardIndex) -> Option<CardFace> {
        let Card { value } = self.deck.get(index)?;
        Some(if self.matched.contains(&index) {
            CardFace::Matched(value)
        } else if self.flipped.contains(&index) {
            CardFace::Revealed(value)
        } else {
            CardFace::Hidden
        })
    }

    /// A flip of `index` would be accepted right now.
    #[must_use]
    pub fn can_flip(&self, index: CardIndex) -> bool {
        self.phase == Phase::InProgress
            && self.flipped.len() < 2
            && self.face(index) == Some(CardFace::Hidden)
    }

    /// Number of pairs found so far.
    #[must_use]
    pub fn matched_pairs(&self) -> usize {
        self.matched.len() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_deck() -> Deck {
        Deck::from_values(&[1, 2, 1, 2]).unwrap()
    }

    #[test]
    fn test_new_state_defaults() {
        let state = SessionState::new(20);

        assert_eq!(state.phase(), Phase::NotStarted);
        assert!(state.deck.is_empty());
        assert!(state.flipped.is_empty());
        assert!(state.matched.is_empty());
        assert_eq!(state.scores()[PlayerId::ONE], 0);
        assert_eq!(state.scores()[PlayerId::TWO], 0);
        assert_eq!(state.current_player(), PlayerId::ONE);
        assert_eq!(state.turn_timer, 20);
        assert_eq!(state.timeout_message, None);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_dealt_state() {
        let state = SessionState::dealt(small_deck(), 15);

        assert_eq!(state.phase(), Phase::InProgress);
        assert_eq!(state.deck.len(), 4);
        assert_eq!(state.turn_timer, 15);
    }

    #[test]
    fn test_is_complete() {
        let mut state = SessionState::dealt(small_deck(), 20);
        for i in 0..3 {
            state.matched.insert(CardIndex::new(i));
        }
        assert!(!state.is_complete());

        state.matched.insert(CardIndex::new(3));
        assert!(state.is_complete());
    }

    #[test]
    fn test_snapshot_faces() {
        let mut state = SessionState::dealt(small_deck(), 20);
        state.matched.insert(CardIndex::new(0));
        state.matched.insert(CardIndex::new(2));
        state.flipped.push(CardIndex::new(1));

        let snap = state.snapshot();

        assert_eq!(snap.face(CardIndex::new(0)), Some(CardFace::Matched(1)));
        assert_eq!(snap.face(CardIndex::new(1)), Some(CardFace::Revealed(2)));
        assert_eq!(snap.face(CardIndex::new(3)), Some(CardFace::Hidden));
        assert_eq!(snap.face(CardIndex::new(4)), None);
        assert_eq!(snap.matched_pairs(), 1);

        assert!(snap.can_flip(CardIndex::new(3)));
        assert!(!snap.can_flip(CardIndex::new(0)));
        assert!(!snap.can_flip(CardIndex::new(1)));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut state = SessionState::dealt(small_deck(), 20);
        let before = state.snapshot();

        state.flipped.push(CardIndex::new(0));

        assert!(before.flipped.is_empty());
        assert_eq!(state.snapshot().flipped.as_slice(), &[CardIndex::new(0)]);
    }

    #[test]
    fn test_snapshot_serde() {
        let snap = SessionState::dealt(small_deck(), 20).snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
    }
}
