//! Trick resolution and penalty scoring.
//!
//! The penalty rule is a parameter of the evaluator, not of the search: the
//! engine only ever sees the reward the round derives from these scores.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Card, PlayerId, Rank, Suit};

/// Scores tricks under the standard penalty-card rule: each heart costs
/// `heart_penalty`, the queen of spades costs `queen_spades_penalty`, and
/// the highest card of the leading suit takes the trick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrickEvaluator {
    /// Penalty per heart taken.
    pub heart_penalty: u32,

    /// Penalty for taking the queen of spades.
    pub queen_spades_penalty: u32,
}

impl Default for TrickEvaluator {
    fn default() -> Self {
        Self {
            heart_penalty: 1,
            queen_spades_penalty: 13,
        }
    }
}

impl TrickEvaluator {
    /// Penalty value of a single card.
    #[must_use]
    pub fn card_penalty(&self, card: Card) -> u32 {
        if card.suit() == Suit::Hearts {
            self.heart_penalty
        } else if card.suit() == Suit::Spades && card.rank() == Rank::Queen {
            self.queen_spades_penalty
        } else {
            0
        }
    }

    /// Total penalty carried by a trick.
    #[must_use]
    pub fn trick_penalty(&self, trick: &[(PlayerId, Card)]) -> u32 {
        trick.iter().map(|&(_, card)| self.card_penalty(card)).sum()
    }

    /// Largest penalty a single player can accumulate in one round: all 13
    /// hearts plus the queen of spades.
    #[must_use]
    pub fn max_penalty(&self) -> u32 {
        13 * self.heart_penalty + self.queen_spades_penalty
    }

    /// Resolve a completed trick: the owner of the highest card of the
    /// leading suit takes the trick and its penalty, and leads the next one.
    ///
    /// Returns `None` for an empty trick.
    #[must_use]
    pub fn trick_loser(&self, trick: &[(PlayerId, Card)]) -> Option<(PlayerId, u32)> {
        let (_, lead_card) = *trick.first()?;
        let lead = lead_card.suit();

        let followers: SmallVec<[(PlayerId, Card); 4]> = trick
            .iter()
            .filter(|&&(_, card)| card.suit() == lead)
            .copied()
            .collect();
        let &(loser, _) = followers.iter().max_by_key(|&&(_, card)| card.rank())?;

        Some((loser, self.trick_penalty(trick)))
    }
}
