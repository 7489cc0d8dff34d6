//! # memory-match
//!
//! A two-player memory-matching game engine.
//!
//! A shuffled deck of paired values is laid face down. Players take turns
//! flipping two cards: a match scores a point and the player goes again, a
//! mismatch is shown briefly and then the turn passes. A turn also passes
//! when its timer runs out. The game ends when every pair has been found.
//!
//! ## Design Principles
//!
//! 1. **One owner**: all session state lives in `SessionController`.
//!    Frontends read `Snapshot`s and send commands; they never touch state.
//!
//! 2. **Invalid input is a no-op**: flipping a matched card, flipping twice,
//!    or flipping before the game starts changes nothing and is not an error.
//!
//! 3. **No stale callbacks**: delayed work carries the epochs it was
//!    scheduled under and is dropped if the game or turn has moved on.
//!
//! 4. **Deterministic when asked**: a seed or a fixed deck makes a session
//!    fully reproducible.
//!
//! ## Modules
//!
//! - `core`: players, RNG, cards and decks, configuration, state and snapshots
//! - `rules`: game outcome
//! - `session`: the controller state machine, deferred tasks, observers
//! - `runtime`: tokio driver that owns a controller and feeds it time
//! - `error`: error types for configuration and the driver

pub mod core;
pub mod error;
pub mod rules;
pub mod runtime;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    Card, CardFace, CardIndex, Deck, GameRng, Phase, PlayerId, PlayerMap, SessionConfig,
    SessionState, Snapshot,
};

pub use crate::error::{ConfigError, DeckError, DriverError};

pub use crate::rules::GameResult;

pub use crate::session::{
    Deferred, FlipCue, FlipOutcome, IgnoreReason, SessionController, SessionObserver, SilentCue,
    TickOutcome, TimerKey,
};

pub use crate::runtime::{Command, SessionHandle};
