//! Core types: players, RNG, cards and decks, configuration, session state.
//!
//! These are plain data types. The rules that move a session between states
//! live in `session`.

pub mod player;
pub mod rng;
pub mod deck;
pub mod config;
pub mod state;

pub use player::{PlayerId, PlayerMap, PLAYER_COUNT};
pub use rng::GameRng;
pub use deck::{Card, CardIndex, Dealer, Deck, MAX_PAIRS};
pub use config::{SessionConfig, DEFAULT_PAIRS, DEFAULT_TURN_SECONDS};
pub use state::{CardFace, FlippedCards, Phase, SessionState, Snapshot};
