//! The searchable round state with hidden-card determinization.
//!
//! A round built from a real observation knows only the agent's own hand;
//! every other unseen card sits in the `pool`. The state stays *undetermined*
//! until the first transition, which deals the pool to the opponents
//! uniformly at random. Because every expansion and rollout from a freshly
//! observed root starts with its own deal, averaging rewards across
//! iterations approximates the value of a play against the true distribution
//! of opponent hands.
//!
//! The deal invariant is checked after every construction and transition:
//! each of the 52 cards sits in exactly one of hands, current trick,
//! resolved discard, or the unseen pool.

use std::hash::{Hash, Hasher};

use im::OrdSet;
use smallvec::SmallVec;

use super::evaluator::TrickEvaluator;
use crate::core::{
    standard_deck, Card, EngineError, GameState, PlayerId, PlayerMap, SearchRng, Suit, DECK_SIZE,
};
use crate::mcts::SearchConfig;

fn card_mask<I: IntoIterator<Item = Card>>(cards: I) -> u64 {
    cards
        .into_iter()
        .fold(0u64, |mask, card| mask | 1 << card.index())
}

fn claim(seen: &mut u64, card: Card, place: &str) -> Result<(), EngineError> {
    let bit = 1u64 << card.index();
    if *seen & bit != 0 {
        return Err(EngineError::StateInvariant(format!(
            "{card} appears in {place} and in an earlier set"
        )));
    }
    *seen |= bit;
    Ok(())
}

/// What the environment reveals between actions: the agent's own hand, the
/// trick in progress, whose turn it is, and the running penalty scores.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundObservation {
    /// The observing agent's seat.
    pub my_id: PlayerId,

    /// Number of seats at the table.
    pub player_count: usize,

    /// The agent's current hand.
    pub my_hand: Vec<Card>,

    /// The in-progress trick, in play order.
    pub trick: Vec<(PlayerId, Card)>,

    /// The seat to act next.
    pub current_player: PlayerId,

    /// Cumulative penalty per seat this round.
    pub scores: Vec<u32>,
}

/// An immutable snapshot of a trick-taking round, searchable by the engine.
///
/// Transitions never mutate: `next_state` and `play` return a new value with
/// its own consistent card sets. Structural equality compares every
/// identifying field; the hash is only ever used to accelerate child lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeterminizedRound {
    evaluator: TrickEvaluator,
    me: PlayerId,
    turn: PlayerId,
    hands: PlayerMap<Vec<Card>>,
    hand_sizes: PlayerMap<usize>,
    trick: SmallVec<[(PlayerId, Card); 4]>,
    discard: OrdSet<Card>,
    pool: OrdSet<Card>,
    scores: PlayerMap<u32>,
    trick_number: u8,
    last_play: Option<Card>,
    determinized: bool,
    deal_samples: usize,
    max_branching: usize,
}

impl Hash for DeterminizedRound {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.turn.hash(state);
        self.trick_number.hash(state);
        self.determinized.hash(state);
        for (_, hand) in self.hands.iter() {
            hand.hash(state);
        }
        self.trick.hash(state);
        card_mask(self.discard.iter().copied()).hash(state);
        card_mask(self.pool.iter().copied()).hash(state);
        self.scores.hash(state);
        self.last_play.hash(state);
    }
}

impl DeterminizedRound {
    /// Build an undetermined round from a real observation.
    ///
    /// `unseen` is the pool the strategy maintains across `watch` calls: all
    /// 52 cards minus every card reported played. It therefore still
    /// contains the agent's own unplayed hand; the difference is exactly the
    /// opponents' hidden cards. Opponent hand sizes are reconstructed from
    /// the discard and the trick in progress.
    pub fn from_observation(
        observation: &RoundObservation,
        unseen: &OrdSet<Card>,
        evaluator: TrickEvaluator,
        config: &SearchConfig,
    ) -> Result<Self, EngineError> {
        let n = observation.player_count;
        if n < 2 || n > 52 {
            return Err(EngineError::StateInvariant(format!(
                "unsupported player count {n}"
            )));
        }
        if observation.scores.len() != n {
            return Err(EngineError::StateInvariant(format!(
                "{} scores reported for {n} players",
                observation.scores.len()
            )));
        }

        let me = observation.my_id;
        let mut pool = unseen.clone();
        for &card in &observation.my_hand {
            if pool.remove(&card).is_none() {
                return Err(EngineError::StateInvariant(format!(
                    "held card {card} is missing from the unseen pool"
                )));
            }
        }

        // Everything ever played is deck minus unseen; subtracting the
        // trick in progress leaves the resolved discard.
        let mut discard: OrdSet<Card> = standard_deck()
            .into_iter()
            .filter(|card| !unseen.contains(card))
            .collect();
        for &(_, card) in &observation.trick {
            if discard.remove(&card).is_none() {
                return Err(EngineError::StateInvariant(format!(
                    "trick card {card} was not reported as played"
                )));
            }
        }

        if discard.len() % n != 0 {
            return Err(EngineError::StateInvariant(format!(
                "{} discarded cards do not form whole tricks of {n}",
                discard.len()
            )));
        }
        let tricks_resolved = discard.len() / n;

        let in_trick =
            |player: PlayerId| observation.trick.iter().any(|&(p, _)| p == player) as usize;
        let initial = observation.my_hand.len() + tricks_resolved + in_trick(me);
        let mut sizes = Vec::with_capacity(n);
        for player in PlayerId::all(n) {
            let size = (initial - tricks_resolved)
                .checked_sub(in_trick(player))
                .ok_or_else(|| {
                    EngineError::StateInvariant(format!(
                        "{player} cannot have played into the current trick"
                    ))
                })?;
            sizes.push(size);
        }
        let hand_sizes = PlayerMap::new(n, |player| sizes[player.index()]);

        let hidden: usize = PlayerId::all(n)
            .filter(|&p| p != me)
            .map(|p| hand_sizes[p])
            .sum();
        if hidden != pool.len() {
            return Err(EngineError::StateInvariant(format!(
                "opponents should hold {hidden} cards but the pool has {}",
                pool.len()
            )));
        }

        let mut hands: PlayerMap<Vec<Card>> = PlayerMap::with_default(n);
        let mut my_hand = observation.my_hand.clone();
        my_hand.sort_unstable();
        hands[me] = my_hand;

        let round = Self {
            evaluator,
            me,
            turn: observation.current_player,
            hands,
            hand_sizes,
            trick: observation.trick.iter().copied().collect(),
            discard,
            pool,
            scores: PlayerMap::new(n, |p| observation.scores[p.index()]),
            trick_number: tricks_resolved as u8,
            last_play: None,
            determinized: false,
            deal_samples: config.deal_samples,
            max_branching: config.max_branching,
        };
        round.check_invariant()?;
        Ok(round)
    }

    /// Deal a fresh perfect-information round: all 52 cards shuffled and
    /// dealt evenly, `me` to lead.
    pub fn deal(
        me: PlayerId,
        player_count: usize,
        evaluator: TrickEvaluator,
        config: &SearchConfig,
        rng: &mut SearchRng,
    ) -> Result<Self, EngineError> {
        if player_count < 2 || DECK_SIZE % player_count != 0 {
            return Err(EngineError::StateInvariant(format!(
                "cannot deal {DECK_SIZE} cards evenly to {player_count} players"
            )));
        }
        let per_hand = DECK_SIZE / player_count;

        let mut deck = standard_deck();
        rng.shuffle(&mut deck);

        let mut hands: PlayerMap<Vec<Card>> = PlayerMap::with_default(player_count);
        for (i, card) in deck.into_iter().enumerate() {
            hands[PlayerId::new((i / per_hand) as u8)].push(card);
        }
        for player in PlayerId::all(player_count) {
            hands[player].sort_unstable();
        }

        let round = Self {
            evaluator,
            me,
            turn: me,
            hand_sizes: PlayerMap::with_value(player_count, per_hand),
            hands,
            trick: SmallVec::new(),
            discard: OrdSet::new(),
            pool: OrdSet::new(),
            scores: PlayerMap::with_value(player_count, 0),
            trick_number: 0,
            last_play: None,
            determinized: true,
            deal_samples: config.deal_samples,
            max_branching: config.max_branching,
        };
        round.check_invariant()?;
        Ok(round)
    }

    /// Sample one consistent assignment of the pool to the opponents,
    /// uniformly without replacement.
    pub fn determinize(&self, rng: &mut SearchRng) -> Result<Self, EngineError> {
        if self.determinized {
            return Ok(self.clone());
        }

        let mut sampled = self.clone();
        let mut cards: Vec<Card> = sampled.pool.iter().copied().collect();
        rng.shuffle(&mut cards);

        let mut cursor = cards.into_iter();
        for player in PlayerId::all(self.player_count()) {
            if player == self.me {
                continue;
            }
            let hand = &mut sampled.hands[player];
            for _ in 0..sampled.hand_sizes[player] {
                match cursor.next() {
                    Some(card) => hand.push(card),
                    None => {
                        return Err(EngineError::StateInvariant(
                            "unseen pool too small for the reconstructed hand sizes".into(),
                        ))
                    }
                }
            }
            hand.sort_unstable();
        }
        if cursor.next().is_some() {
            return Err(EngineError::StateInvariant(
                "unseen pool larger than the reconstructed hand sizes".into(),
            ));
        }

        sampled.pool = OrdSet::new();
        sampled.determinized = true;
        sampled.check_invariant()?;
        Ok(sampled)
    }

    /// Whether every hand is concrete (no cards left in the pool).
    #[must_use]
    pub fn is_determinized(&self) -> bool {
        self.determinized
    }

    /// Number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.hands.player_count()
    }

    /// Seat to act next.
    #[must_use]
    pub fn turn(&self) -> PlayerId {
        self.turn
    }

    /// The searching agent's seat.
    #[must_use]
    pub fn my_id(&self) -> PlayerId {
        self.me
    }

    /// The trick in progress, in play order.
    #[must_use]
    pub fn trick(&self) -> &[(PlayerId, Card)] {
        &self.trick
    }

    /// The card whose play produced this state, if any.
    #[must_use]
    pub fn last_play(&self) -> Option<Card> {
        self.last_play
    }

    /// Cumulative penalty for one seat.
    #[must_use]
    pub fn penalty(&self, player: PlayerId) -> u32 {
        self.scores[player]
    }

    /// Suit that must be followed, if a trick is in progress.
    #[must_use]
    pub fn leading_suit(&self) -> Option<Suit> {
        self.trick.first().map(|&(_, card)| card.suit())
    }

    /// Legal plays for the seat to act: cards of the leading suit if any
    /// are held, the whole hand otherwise.
    ///
    /// The acting seat's hand must be concrete: either the state is
    /// determinized or it is the agent's own turn.
    pub fn legal_moves(&self) -> Result<Vec<Card>, EngineError> {
        let hand = &self.hands[self.turn];
        if hand.is_empty() {
            return Err(EngineError::StateInvariant(format!(
                "{} has no cards to play",
                self.turn
            )));
        }

        let legal: Vec<Card> = match self.leading_suit() {
            Some(lead) => {
                let following: Vec<Card> = hand
                    .iter()
                    .copied()
                    .filter(|card| card.suit() == lead)
                    .collect();
                if following.is_empty() {
                    hand.clone()
                } else {
                    following
                }
            }
            None => hand.clone(),
        };
        Ok(legal)
    }

    /// Play a specific card for the seat to act, determinizing first if
    /// needed. Rejects cards not in hand or breaking follow-suit.
    pub fn play(&self, card: Card, rng: &mut SearchRng) -> Result<Self, EngineError> {
        let base = self.determinize(rng)?;
        let legal = base.legal_moves()?;
        if !legal.contains(&card) {
            let reason = if base.hands[base.turn].contains(&card) {
                match base.leading_suit() {
                    Some(lead) => format!("must follow {lead}"),
                    None => "not a legal lead".to_string(),
                }
            } else {
                "card not in hand".to_string()
            };
            return Err(EngineError::IllegalMove { card, reason });
        }
        base.apply(card)
    }

    /// Apply a card already known to be legal for the seat to act.
    fn apply(mut self, card: Card) -> Result<Self, EngineError> {
        let actor = self.turn;
        let hand = &mut self.hands[actor];
        let position = hand.iter().position(|&c| c == card).ok_or_else(|| {
            EngineError::IllegalMove {
                card,
                reason: "card not in hand".into(),
            }
        })?;
        hand.remove(position);
        self.hand_sizes[actor] -= 1;

        self.trick.push((actor, card));
        self.last_play = Some(card);

        if self.trick.len() == self.player_count() {
            let (loser, penalty) = self.evaluator.trick_loser(&self.trick).ok_or_else(|| {
                EngineError::SearchInternal("resolving an empty trick".into())
            })?;
            self.scores[loser] += penalty;
            for (_, played) in self.trick.drain(..) {
                self.discard.insert(played);
            }
            self.trick_number += 1;
            self.turn = loser;
        } else {
            self.turn = actor.next(self.player_count());
        }

        self.check_invariant()?;
        Ok(self)
    }

    /// Verify the deal invariant: every card in exactly one of hands,
    /// trick, discard, or pool, and the union is the full deck.
    pub fn check_invariant(&self) -> Result<(), EngineError> {
        let mut seen = 0u64;
        for (_, hand) in self.hands.iter() {
            for &card in hand {
                claim(&mut seen, card, "a hand")?;
            }
        }
        for &(_, card) in &self.trick {
            claim(&mut seen, card, "the current trick")?;
        }
        for &card in self.discard.iter() {
            claim(&mut seen, card, "the discard")?;
        }
        for &card in self.pool.iter() {
            claim(&mut seen, card, "the unseen pool")?;
        }

        let total = seen.count_ones() as usize;
        if total != DECK_SIZE {
            return Err(EngineError::StateInvariant(format!(
                "{total} cards accounted for, expected {DECK_SIZE}"
            )));
        }
        Ok(())
    }
}

impl GameState for DeterminizedRound {
    fn next_state(&self, rng: &mut SearchRng) -> Result<Self, EngineError> {
        let base = self.determinize(rng)?;
        let legal = base.legal_moves()?;
        let card = legal[rng.gen_range_usize(0..legal.len())];
        base.apply(card)
    }

    fn terminal(&self) -> bool {
        self.discard.len() == DECK_SIZE
    }

    fn reward(&self) -> f64 {
        let max = self.evaluator.max_penalty() as f64;
        (1.0 - self.scores[self.me] as f64 / max).clamp(0.0, 1.0)
    }

    fn num_moves(&self) -> usize {
        if self.determinized {
            return self.legal_moves().map_or(0, |l| l.len());
        }
        // An opponent's legal set is unknown before determinization; its
        // hand size bounds it.
        let choices = if self.turn == self.me {
            self.legal_moves().map_or(0, |l| l.len())
        } else {
            self.hand_sizes[self.turn]
        };
        (choices * self.deal_samples).min(self.max_branching)
    }
}
