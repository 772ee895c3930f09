//! Card, rank, and suit value types plus the standard 52-card deck.
//!
//! Cards are small `Copy` values with a dense index in `0..52`, which lets
//! state-invariant checks run on a single `u64` occupancy mask.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// The four suits, in deck-index order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Clubs = 0,
    Diamonds = 1,
    Spades = 2,
    Hearts = 3,
}

impl Suit {
    /// All suits in deck-index order.
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Spades, Suit::Hearts];

    /// Unicode symbol for display.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Card ranks from Two (2) to Ace (14).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    /// All ranks, lowest first.
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Numeric value, 2..=14.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Single-character display: `2`..`9`, `T`, `J`, `Q`, `K`, `A`.
    #[must_use]
    pub fn to_char(self) -> char {
        match self {
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
            other => (b'0' + other.value()) as char,
        }
    }
}

/// An immutable playing card.
///
/// Ordering is suit-major, then rank within the suit, which is the
/// tie-breaking order used everywhere in the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    suit: Suit,
    rank: Rank,
}

impl Card {
    /// Create a card from suit and rank.
    #[must_use]
    pub const fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    /// The card's suit.
    #[must_use]
    pub const fn suit(self) -> Suit {
        self.suit
    }

    /// The card's rank.
    #[must_use]
    pub const fn rank(self) -> Rank {
        self.rank
    }

    /// Dense deck index in `0..52`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.suit as usize * 13 + (self.rank as usize - 2)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.symbol())
    }
}

/// All 52 cards in deck-index order.
#[must_use]
pub fn standard_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card::new(suit, rank));
        }
    }
    deck
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_has_52_unique_indices() {
        let deck = standard_deck();
        assert_eq!(deck.len(), DECK_SIZE);

        let mut seen = 0u64;
        for card in &deck {
            assert!(card.index() < DECK_SIZE);
            assert_eq!(seen & (1 << card.index()), 0);
            seen |= 1 << card.index();
        }
        assert_eq!(seen.count_ones(), 52);
    }

    #[test]
    fn test_ordering_is_rank_within_suit() {
        let low = Card::new(Suit::Clubs, Rank::Ten);
        let high = Card::new(Suit::Clubs, Rank::Ace);
        assert!(low < high);

        // Suit-major: every club sorts before every diamond.
        let ace_clubs = Card::new(Suit::Clubs, Rank::Ace);
        let two_diamonds = Card::new(Suit::Diamonds, Rank::Two);
        assert!(ace_clubs < two_diamonds);
    }

    #[test]
    fn test_display() {
        assert_eq!(Card::new(Suit::Spades, Rank::Queen).to_string(), "Q♠");
        assert_eq!(Card::new(Suit::Hearts, Rank::Two).to_string(), "2♥");
        assert_eq!(Card::new(Suit::Clubs, Rank::Ten).to_string(), "T♣");
    }

    #[test]
    fn test_serialization() {
        let card = Card::new(Suit::Hearts, Rank::King);
        let json = serde_json::to_string(&card).unwrap();
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(card, back);
    }
}
