//! Game rules that do not depend on session bookkeeping.
//!
//! Matching itself is `Card::matches`; this module decides how a finished
//! game is scored.

pub mod outcome;

pub use outcome::GameResult;
