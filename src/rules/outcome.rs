//! Deciding who won a finished game.

use serde::{Deserialize, Serialize};

use crate::core::player::{PlayerId, PlayerMap};

/// Result of a completed game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// One player found more pairs.
    Winner(PlayerId),
    /// Both players found the same number of pairs.
    Tie,
}

impl GameResult {
    /// Decide the result from final scores.
    #[must_use]
    pub fn from_scores(scores: &PlayerMap<u32>) -> Self {
        let (one, two) = (scores[PlayerId::ONE], scores[PlayerId::TWO]);
        match one.cmp(&two) {
            std::cmp::Ordering::Greater => GameResult::Winner(PlayerId::ONE),
            std::cmp::Ordering::Less => GameResult::Winner(PlayerId::TWO),
            std::cmp::Ordering::Equal => GameResult::Tie,
        }
    }

    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, GameResult::Winner(p) if *p == player)
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameResult::Winner(player) => write!(f, "{player} wins!"),
            GameResult::Tie => write!(f, "It's a tie!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(one: u32, two: u32) -> PlayerMap<u32> {
        PlayerMap::new(|p| if p == PlayerId::ONE { one } else { two })
    }

    #[test]
    fn test_from_scores() {
        assert_eq!(GameResult::from_scores(&scores(6, 4)), GameResult::Winner(PlayerId::ONE));
        assert_eq!(GameResult::from_scores(&scores(3, 7)), GameResult::Winner(PlayerId::TWO));
        assert_eq!(GameResult::from_scores(&scores(5, 5)), GameResult::Tie);
    }

    #[test]
    fn test_is_winner() {
        let result = GameResult::Winner(PlayerId::TWO);
        assert!(result.is_winner(PlayerId::TWO));
        assert!(!result.is_winner(PlayerId::ONE));

        assert!(!GameResult::Tie.is_winner(PlayerId::ONE));
        assert!(!GameResult::Tie.is_winner(PlayerId::TWO));
    }

    #[test]
    fn test_display() {
        assert_eq!(GameResult::Winner(PlayerId::ONE).to_string(), "Player 1 wins!");
        assert_eq!(GameResult::Tie.to_string(), "It's a tie!");
    }
}
