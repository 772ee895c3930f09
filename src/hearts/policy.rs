//! Card-choice policies for guided rollouts.
//!
//! The engine's default rollout plays uniformly at random. A `PlayPolicy`
//! expresses a heuristic "choose a legal card" rule, and `GuidedRollout`
//! plugs it into the engine as a `SimulationPolicy` without engine changes.

use crate::core::{Card, EngineError, GameState, PlayerId, Rank, SearchRng, Suit};
use crate::mcts::SimulationPolicy;

use super::round::DeterminizedRound;

/// Choose one card from a non-empty legal set, given the trick so far.
pub trait PlayPolicy: Send + Sync {
    fn choose(&self, legal: &[Card], trick: &[(PlayerId, Card)], rng: &mut SearchRng) -> Card;
}

/// Uniform random choice among the legal cards.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformPlay;

impl PlayPolicy for UniformPlay {
    fn choose(&self, legal: &[Card], _trick: &[(PlayerId, Card)], rng: &mut SearchRng) -> Card {
        legal[rng.gen_range_usize(0..legal.len())]
    }
}

/// Low-play heuristic: follow with the lowest card of the suit, lead low,
/// and dump the most dangerous card when void.
#[derive(Clone, Copy, Debug, Default)]
pub struct AvoidPenaltyPlay;

impl AvoidPenaltyPlay {
    fn danger(card: Card) -> (u8, u8) {
        // Queen of spades first, then hearts by rank, then plain high cards.
        if card.suit() == Suit::Spades && card.rank() == Rank::Queen {
            (2, card.rank().value())
        } else if card.suit() == Suit::Hearts {
            (1, card.rank().value())
        } else {
            (0, card.rank().value())
        }
    }
}

impl PlayPolicy for AvoidPenaltyPlay {
    fn choose(&self, legal: &[Card], trick: &[(PlayerId, Card)], rng: &mut SearchRng) -> Card {
        let lead = trick.first().map(|&(_, card)| card.suit());
        let following = matches!(lead, Some(suit) if legal.iter().all(|c| c.suit() == suit));

        let chosen = if following || trick.is_empty() {
            legal.iter().min_by_key(|c| c.rank())
        } else {
            // Void in the leading suit: shed the worst card.
            legal.iter().max_by_key(|&&c| Self::danger(c))
        };
        match chosen {
            Some(&card) => card,
            // Unreachable for a non-empty legal set; fall back uniformly.
            None => legal[rng.gen_range_usize(0..legal.len())],
        }
    }
}

/// Rollout driven by a `PlayPolicy`: determinize once, then play every seat
/// with the policy until the round ends.
#[derive(Clone, Copy, Debug, Default)]
pub struct GuidedRollout<P> {
    policy: P,
}

impl<P: PlayPolicy> GuidedRollout<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }
}

impl<P: PlayPolicy> SimulationPolicy<DeterminizedRound> for GuidedRollout<P> {
    fn simulate(&self, state: &DeterminizedRound, rng: &mut SearchRng) -> Result<f64, EngineError> {
        let mut current = state.determinize(rng)?;
        while !current.terminal() {
            let legal = current.legal_moves()?;
            let card = self.policy.choose(&legal, current.trick(), rng);
            current = current.play(card, rng)?;
        }
        Ok(current.reward())
    }
}
