//! Cards and decks.
//!
//! A card is just a face value. Two cards share every value, so a card is
//! identified by its position in the deck (`CardIndex`), never by its value.
//!
//! ## Dealing
//!
//! ```
//! use memory_match::core::{Deck, GameRng};
//!
//! let mut rng = GameRng::new(42);
//! let deck = Deck::shuffled(10, &mut rng);
//!
//! assert_eq!(deck.len(), 20);
//! let mut values = deck.values();
//! values.sort_unstable();
//! assert_eq!(&values[..4], &[1, 1, 2, 2]);
//! ```

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::rng::GameRng;
use crate::error::DeckError;

/// Largest supported number of pairs in a deck.
pub const MAX_PAIRS: u8 = 50;

/// Position of a card in the deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardIndex(pub u16);

impl CardIndex {
    /// Create a new card index.
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Get the index as a `usize` for slice access.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CardIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single card. Only the face value matters for matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub value: u8,
}

impl Card {
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self { value }
    }

    /// Two cards match when their face values are equal.
    #[must_use]
    pub fn matches(self, other: Card) -> bool {
        self.value == other.value
    }
}

/// Ordered sequence of cards for one game.
///
/// Backed by an `im::Vector` so snapshots share structure with the live deck.
/// A deck is never edited in place; each game deals a new one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vector<Card>,
}

impl Deck {
    /// A deck with no cards, as shown before a game starts.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Deal `pairs` pairs (values `1..=pairs`) in uniformly random order.
    #[must_use]
    pub fn shuffled(pairs: u8, rng: &mut GameRng) -> Self {
        let mut values: Vec<u8> = (1..=pairs).flat_map(|v| [v, v]).collect();
        rng.shuffle(&mut values);
        Self {
            cards: values.into_iter().map(Card::new).collect(),
        }
    }

    /// Build a deck in a fixed order.
    ///
    /// Every value must be non-zero and appear exactly twice. Values need not
    /// be contiguous.
    pub fn from_values(values: &[u8]) -> Result<Self, DeckError> {
        if values.is_empty() {
            return Err(DeckError::Empty);
        }
        if values.len() % 2 != 0 {
            return Err(DeckError::OddLength(values.len()));
        }
        if values.len() > MAX_PAIRS as usize * 2 {
            return Err(DeckError::TooLarge(values.len()));
        }
        if let Some(pos) = values.iter().position(|&v| v == 0) {
            return Err(DeckError::ZeroValue(pos));
        }

        let mut counts: FxHashMap<u8, usize> = FxHashMap::default();
        for &value in values {
            *counts.entry(value).or_default() += 1;
        }
        // Report the smallest offending value so the error is stable.
        if let Some((&value, &count)) = counts
            .iter()
            .filter(|&(_, &count)| count != 2)
            .min_by_key(|&(&value, _)| value)
        {
            return Err(DeckError::Unpaired { value, count });
        }

        Ok(Self {
            cards: values.iter().copied().map(Card::new).collect(),
        })
    }

    /// Number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Number of pairs in the deck.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    /// Get the card at `index`, if it is on the board.
    #[must_use]
    pub fn get(&self, index: CardIndex) -> Option<Card> {
        self.cards.get(index.index()).copied()
    }

    /// Iterate over cards in board order.
    pub fn iter(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter().copied()
    }

    /// Face values in board order.
    #[must_use]
    pub fn values(&self) -> Vec<u8> {
        self.iter().map(|c| c.value).collect()
    }
}

/// How each new game gets its deck.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dealer {
    /// Deal `pairs` pairs in random order.
    Shuffled { pairs: u8 },
    /// Always deal the same deck.
    Fixed(Deck),
}

impl Dealer {
    /// Deal a deck for a new game.
    pub fn deal(&self, rng: &mut GameRng) -> Deck {
        match self {
            Dealer::Shuffled { pairs } => Deck::shuffled(*pairs, rng),
            Dealer::Fixed(deck) => deck.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut values: Vec<u8>) -> Vec<u8> {
        values.sort_unstable();
        values
    }

    #[test]
    fn test_shuffled_deck_has_each_value_twice() {
        let mut rng = GameRng::new(42);
        let deck = Deck::shuffled(10, &mut rng);

        let expected: Vec<u8> = (1..=10).flat_map(|v| [v, v]).collect();
        assert_eq!(deck.len(), 20);
        assert_eq!(deck.pair_count(), 10);
        assert_eq!(sorted(deck.values()), expected);
    }

    #[test]
    fn test_shuffled_deck_is_deterministic_per_seed() {
        let a = Deck::shuffled(10, &mut GameRng::new(9));
        let b = Deck::shuffled(10, &mut GameRng::new(9));
        let c = Deck::shuffled(10, &mut GameRng::new(10));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_from_values() {
        let deck = Deck::from_values(&[1, 2, 1, 2]).unwrap();

        assert_eq!(deck.len(), 4);
        assert_eq!(deck.get(CardIndex::new(1)), Some(Card::new(2)));
        assert_eq!(deck.get(CardIndex::new(4)), None);
    }

    #[test]
    fn test_from_values_rejects_bad_decks() {
        assert_eq!(Deck::from_values(&[]), Err(DeckError::Empty));
        assert_eq!(Deck::from_values(&[1, 1, 2]), Err(DeckError::OddLength(3)));
        assert_eq!(Deck::from_values(&[1, 0, 1, 0]), Err(DeckError::ZeroValue(1)));
        assert_eq!(
            Deck::from_values(&[3, 3, 3, 3]),
            Err(DeckError::Unpaired { value: 3, count: 4 })
        );
        assert_eq!(
            Deck::from_values(&[1, 2, 3, 1]),
            Err(DeckError::Unpaired { value: 2, count: 1 })
        );

        let huge: Vec<u8> = (1..=51).flat_map(|v| [v, v]).collect();
        assert_eq!(Deck::from_values(&huge), Err(DeckError::TooLarge(102)));
    }

    #[test]
    fn test_card_matching() {
        assert!(Card::new(4).matches(Card::new(4)));
        assert!(!Card::new(4).matches(Card::new(5)));
    }

    #[test]
    fn test_empty_deck() {
        let deck = Deck::empty();
        assert!(deck.is_empty());
        assert_eq!(deck.get(CardIndex::new(0)), None);
    }

    #[test]
    fn test_dealer() {
        let mut rng = GameRng::new(1);
        let fixed = Deck::from_values(&[2, 1, 2, 1]).unwrap();

        assert_eq!(Dealer::Fixed(fixed.clone()).deal(&mut rng), fixed);
        assert_eq!(Dealer::Shuffled { pairs: 3 }.deal(&mut rng).len(), 6);
    }

    #[test]
    fn test_card_index_display() {
        assert_eq!(format!("{}", CardIndex::new(7)), "#7");
    }
}
