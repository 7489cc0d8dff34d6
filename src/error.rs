//! Error types.
//!
//! Game operations themselves never fail: an invalid flip is a no-op, not an
//! error. Errors only come from the edges: validating a configuration or a
//! fixed deck, and talking to a session task that has gone away.

use thiserror::Error;

/// A fixed deck that cannot be played.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("deck is empty")]
    Empty,

    #[error("deck has {0} cards; a deck must hold whole pairs")]
    OddLength(usize),

    #[error("card values start at 1, found 0 at position {0}")]
    ZeroValue(usize),

    #[error("value {value} appears {count} times; every value must appear exactly twice")]
    Unpaired { value: u8, count: usize },

    #[error("deck holds {0} cards, more than the {max} supported", max = crate::core::MAX_PAIRS as usize * 2)]
    TooLarge(usize),
}

/// An unusable session configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("pair count must be between 1 and {max}, got {0}", max = crate::core::MAX_PAIRS)]
    PairCount(u8),

    #[error("turn length must be at least one second")]
    ZeroTurnSeconds,

    #[error("invalid fixed deck: {0}")]
    Deck(#[from] DeckError),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The session task can no longer be reached.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("session task has stopped")]
    Closed,

    #[error("session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
