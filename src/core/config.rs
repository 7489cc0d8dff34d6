//! Session configuration.
//!
//! `SessionConfig` controls the board size and the timings of a session.
//! It is built with builder methods or loaded from TOML; every field has a
//! default, so a config file only needs the keys it changes:
//!
//! ```toml
//! pairs = 8
//! turn_seconds = 15
//! seed = 1234
//! ```
//!
//! Validation happens once, in `SessionConfig::dealer`, before a controller
//! is built. Nothing downstream re-checks these values.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::deck::{Dealer, Deck, MAX_PAIRS};
use crate::error::ConfigError;

/// Default number of pairs on the board.
pub const DEFAULT_PAIRS: u8 = 10;

/// Default seconds per turn.
pub const DEFAULT_TURN_SECONDS: u32 = 20;

/// Configuration for one game session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of pairs dealt (ignored when `fixed_deck` is set).
    pub pairs: u8,

    /// Seconds a player has before the turn passes.
    pub turn_seconds: u32,

    /// How long a mismatched pair stays face up, in milliseconds.
    pub mismatch_delay_ms: u64,

    /// How long the timeout notice stays up, in milliseconds.
    pub message_linger_ms: u64,

    /// RNG seed. `None` draws one from the OS.
    pub seed: Option<u64>,

    /// Deal these values in this order every game.
    pub fixed_deck: Option<Vec<u8>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pairs: DEFAULT_PAIRS,
            turn_seconds: DEFAULT_TURN_SECONDS,
            mismatch_delay_ms: 1_000,
            message_linger_ms: 2_000,
            seed: None,
            fixed_deck: None,
        }
    }
}

impl SessionConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Set the number of pairs.
    #[must_use]
    pub fn with_pairs(mut self, pairs: u8) -> Self {
        self.pairs = pairs;
        self
    }

    /// Set the turn length in seconds.
    #[must_use]
    pub fn with_turn_seconds(mut self, seconds: u32) -> Self {
        self.turn_seconds = seconds;
        self
    }

    /// Set the mismatch reveal delay.
    #[must_use]
    pub fn with_mismatch_delay(mut self, delay: Duration) -> Self {
        self.mismatch_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set how long the timeout notice lingers.
    #[must_use]
    pub fn with_message_linger(mut self, linger: Duration) -> Self {
        self.message_linger_ms = linger.as_millis() as u64;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Deal the given values in order every game.
    #[must_use]
    pub fn with_fixed_deck(mut self, values: Vec<u8>) -> Self {
        self.fixed_deck = Some(values);
        self
    }

    #[must_use]
    pub fn mismatch_delay(&self) -> Duration {
        Duration::from_millis(self.mismatch_delay_ms)
    }

    #[must_use]
    pub fn message_linger(&self) -> Duration {
        Duration::from_millis(self.message_linger_ms)
    }

    /// Validate the configuration and build the dealer it describes.
    pub fn dealer(&self) -> Result<Dealer, ConfigError> {
        if self.turn_seconds == 0 {
            return Err(ConfigError::ZeroTurnSeconds);
        }
        match &self.fixed_deck {
            Some(values) => Ok(Dealer::Fixed(Deck::from_values(values)?)),
            None if self.pairs == 0 || self.pairs > MAX_PAIRS => {
                Err(ConfigError::PairCount(self.pairs))
            }
            None => Ok(Dealer::Shuffled { pairs: self.pairs }),
        }
    }
}
