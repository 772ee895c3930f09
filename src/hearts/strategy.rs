//! The environment boundary: pick a card to play, watch the table.
//!
//! `play` reconstructs the ground-truth round from the observation, re-roots
//! the search tree onto it, searches, and returns the chosen card after a
//! defensive legality check. `watch` never fails: it maintains the unseen
//! pool across the round and keeps the tree rooted at reality, logging and
//! dropping the tree on any inconsistency instead of propagating an error.

use im::OrdSet;
use tracing::{debug, trace, warn};

use super::evaluator::TrickEvaluator;
use super::round::{DeterminizedRound, RoundObservation};
use crate::core::{standard_deck, Card, EngineError, PlayerId};
use crate::mcts::{MctsEngine, SearchConfig, SearchTree};

/// Side channel delivered with every `watch` notification.
#[derive(Clone, Debug, Default)]
pub struct WatchInfo {
    /// The game is over; all search state can be released.
    pub done: bool,

    /// A new round is being dealt; the unseen pool resets to the full deck.
    pub is_new_round: bool,

    /// The action just taken, if any: who played which card.
    pub action: Option<(PlayerId, Card)>,
}

/// A trick-taking strategy backed by determinized MCTS.
pub struct MctsStrategy {
    config: SearchConfig,
    evaluator: TrickEvaluator,
    engine: MctsEngine<DeterminizedRound>,
    tree: Option<SearchTree<DeterminizedRound>>,
    unseen: OrdSet<Card>,
}

impl MctsStrategy {
    /// Create a strategy with the standard penalty rule.
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self::with_evaluator(config, TrickEvaluator::default())
    }

    /// Create a strategy with a custom penalty rule.
    #[must_use]
    pub fn with_evaluator(config: SearchConfig, evaluator: TrickEvaluator) -> Self {
        let engine = MctsEngine::new(config.clone());
        Self {
            config,
            evaluator,
            engine,
            tree: None,
            unseen: standard_deck().into_iter().collect(),
        }
    }

    /// Pick a card to play for the observed position.
    ///
    /// The returned card is guaranteed to be in the observed hand and to
    /// respect the follow-suit rule; a search result violating either is a
    /// bug surfaced as `IllegalMove` rather than handed to the environment.
    pub fn play(&mut self, observation: &RoundObservation) -> Result<Card, EngineError> {
        let root = DeterminizedRound::from_observation(
            observation,
            &self.unseen,
            self.evaluator,
            &self.config,
        )?;

        let mut tree = match self.tree.take() {
            Some(mut tree) => {
                if tree.get(tree.root()).state != root {
                    tree.move_to_child(root);
                }
                tree
            }
            None => SearchTree::new(root),
        };

        let outcome = self.engine.search(&mut tree, self.config.budget);
        let chosen = outcome.map(|best| (tree.get(best).state.last_play(), tree.len()));
        self.tree = Some(tree);

        let (last_play, nodes) = chosen?;
        let card = last_play.ok_or_else(|| {
            EngineError::SearchInternal("chosen child carries no originating play".into())
        })?;

        if !observation.my_hand.contains(&card) {
            return Err(EngineError::IllegalMove {
                card,
                reason: "card not in observed hand".into(),
            });
        }
        if let Some(&(_, lead_card)) = observation.trick.first() {
            let lead = lead_card.suit();
            if card.suit() != lead && observation.my_hand.iter().any(|c| c.suit() == lead) {
                return Err(EngineError::IllegalMove {
                    card,
                    reason: format!("must follow {lead}"),
                });
            }
        }

        debug!(
            %card,
            iterations = self.engine.stats().iterations,
            nodes,
            "selected play"
        );
        Ok(card)
    }

    /// Absorb one environment notification. Never fails.
    ///
    /// Round boundaries reset the unseen pool; every reported play is
    /// removed from it; otherwise the tree is re-rooted onto the real
    /// post-action state so the next search continues from ground truth.
    pub fn watch(&mut self, observation: &RoundObservation, info: &WatchInfo) {
        if info.done {
            self.tree = None;
            return;
        }
        if info.is_new_round {
            self.unseen = standard_deck().into_iter().collect();
            self.tree = None;
            return;
        }

        if let Some((player, card)) = info.action {
            if self.unseen.remove(&card).is_none() {
                warn!(%card, %player, "played card was not in the unseen pool");
            } else {
                trace!(%card, %player, "observed play");
            }
        }

        if let Some(tree) = self.tree.as_mut() {
            match DeterminizedRound::from_observation(
                observation,
                &self.unseen,
                self.evaluator,
                &self.config,
            ) {
                Ok(state) => {
                    if tree.get(tree.root()).state != state {
                        tree.move_to_child(state);
                    }
                }
                Err(err) => {
                    warn!(%err, "observation inconsistent with tracked round, dropping tree");
                    self.tree = None;
                }
            }
        }
    }

    /// Number of cards not yet seen played this round.
    #[must_use]
    pub fn unseen_count(&self) -> usize {
        self.unseen.len()
    }

    /// Diagnostics from the most recent search.
    #[must_use]
    pub fn last_search_stats(&self) -> &crate::mcts::SearchStats {
        self.engine.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameState, PlayerMap, Rank, SearchRng, Suit, DECK_SIZE};

    fn small_config() -> SearchConfig {
        SearchConfig::default().with_budget(32).with_seed(7)
    }

    /// Scripted table: real hands for every seat, driving the strategy at
    /// seat 0 through observations and watch notifications.
    struct Table {
        evaluator: TrickEvaluator,
        hands: PlayerMap<Vec<Card>>,
        trick: Vec<(PlayerId, Card)>,
        discarded: usize,
        scores: Vec<u32>,
        turn: PlayerId,
    }

    impl Table {
        fn deal(seed: u64) -> Self {
            let mut rng = SearchRng::new(seed);
            let mut deck = standard_deck();
            rng.shuffle(&mut deck);

            let mut hands: PlayerMap<Vec<Card>> = PlayerMap::with_default(4);
            for (i, card) in deck.into_iter().enumerate() {
                hands[PlayerId::new((i / 13) as u8)].push(card);
            }
            for player in PlayerId::all(4) {
                hands[player].sort_unstable();
            }

            Self {
                evaluator: TrickEvaluator::default(),
                hands,
                trick: Vec::new(),
                discarded: 0,
                scores: vec![0; 4],
                turn: PlayerId::new(0),
            }
        }

        fn observe(&self) -> RoundObservation {
            RoundObservation {
                my_id: PlayerId::new(0),
                player_count: 4,
                my_hand: self.hands[PlayerId::new(0)].clone(),
                trick: self.trick.clone(),
                current_player: self.turn,
                scores: self.scores.clone(),
            }
        }

        fn legal(&self, player: PlayerId) -> Vec<Card> {
            let hand = &self.hands[player];
            match self.trick.first() {
                Some(&(_, lead)) => {
                    let following: Vec<Card> = hand
                        .iter()
                        .copied()
                        .filter(|c| c.suit() == lead.suit())
                        .collect();
                    if following.is_empty() {
                        hand.clone()
                    } else {
                        following
                    }
                }
                None => hand.clone(),
            }
        }

        /// Apply a play and resolve the trick if complete.
        fn apply(&mut self, player: PlayerId, card: Card) {
            let pos = self.hands[player].iter().position(|&c| c == card).unwrap();
            self.hands[player].remove(pos);
            self.trick.push((player, card));

            if self.trick.len() == 4 {
                let (loser, penalty) = self.evaluator.trick_loser(&self.trick).unwrap();
                self.scores[loser.index()] += penalty;
                self.discarded += 4;
                self.trick.clear();
                self.turn = loser;
            } else {
                self.turn = player.next(4);
            }
        }
    }

    #[test]
    fn test_play_returns_a_legal_card_from_hand() {
        let table = Table::deal(21);
        let mut strategy = MctsStrategy::new(small_config());
        strategy.watch(&table.observe(), &WatchInfo {
            is_new_round: true,
            ..Default::default()
        });

        let obs = table.observe();
        let card = strategy.play(&obs).unwrap();

        assert!(obs.my_hand.contains(&card));
    }

    #[test]
    fn test_full_round_against_scripted_opponents() {
        let mut table = Table::deal(33);
        let mut strategy = MctsStrategy::new(small_config());
        strategy.watch(&table.observe(), &WatchInfo {
            is_new_round: true,
            ..Default::default()
        });

        while table.discarded < DECK_SIZE {
            let actor = table.turn;
            let legal = table.legal(actor);

            let card = if actor == PlayerId::new(0) {
                let card = strategy.play(&table.observe()).unwrap();
                assert!(legal.contains(&card), "{card} is not legal here");
                card
            } else {
                legal[0]
            };

            table.apply(actor, card);
            strategy.watch(&table.observe(), &WatchInfo {
                action: Some((actor, card)),
                ..Default::default()
            });
        }

        assert_eq!(strategy.unseen_count(), 0);
        let total: u32 = table.scores.iter().sum();
        assert_eq!(total, 26);

        strategy.watch(&table.observe(), &WatchInfo {
            done: true,
            ..Default::default()
        });
        assert!(strategy.tree.is_none());
    }

    #[test]
    fn test_new_round_resets_the_unseen_pool() {
        let table = Table::deal(5);
        let mut strategy = MctsStrategy::new(small_config());

        strategy.watch(&table.observe(), &WatchInfo {
            action: Some((PlayerId::new(1), Card::new(Suit::Clubs, Rank::Two))),
            ..Default::default()
        });
        assert_eq!(strategy.unseen_count(), 51);

        strategy.watch(&table.observe(), &WatchInfo {
            is_new_round: true,
            ..Default::default()
        });
        assert_eq!(strategy.unseen_count(), 52);
    }

    #[test]
    fn test_watch_tolerates_duplicate_reports() {
        let table = Table::deal(5);
        let mut strategy = MctsStrategy::new(small_config());
        let played = Card::new(Suit::Hearts, Rank::Nine);

        let info = WatchInfo {
            action: Some((PlayerId::new(2), played)),
            ..Default::default()
        };
        strategy.watch(&table.observe(), &info);
        strategy.watch(&table.observe(), &info);

        assert_eq!(strategy.unseen_count(), 51);
    }

    #[test]
    fn test_search_tree_survives_between_decisions() {
        let table = Table::deal(13);
        let mut strategy = MctsStrategy::new(small_config());
        strategy.watch(&table.observe(), &WatchInfo {
            is_new_round: true,
            ..Default::default()
        });

        strategy.play(&table.observe()).unwrap();
        let tree = strategy.tree.as_ref().unwrap();

        assert!(tree.len() > 1);
        assert!(!tree.get(tree.root()).state.terminal());
    }
}
