//! The abstract game-state contract the search operates on.

use std::fmt::Debug;
use std::hash::Hash;

use super::error::EngineError;
use super::rng::SearchRng;

/// A searchable game state.
///
/// States are immutable values: a transition returns a new state, never
/// mutates in place. All randomness comes from the injected `SearchRng`, so
/// `next_state` is a pure function of `(state, rng)`.
///
/// ## Equality and hashing
///
/// `Eq` must be full structural equality over every identifying field. The
/// `Hash` impl is only ever used to accelerate child lookup; two states with
/// equal hashes are *not* assumed equal, and the search always confirms a
/// hash match with `==` before collapsing children.
pub trait GameState: Clone + Eq + Hash + Debug {
    /// Produce one stochastically sampled successor consistent with the
    /// rules. Must not be called on a terminal state.
    fn next_state(&self, rng: &mut SearchRng) -> Result<Self, EngineError>;

    /// True when the round has reached its natural end.
    fn terminal(&self) -> bool;

    /// Terminal value in `[0, 1]`, oriented so 1.0 is best for the
    /// searching agent. Only meaningful on terminal states.
    fn reward(&self) -> f64;

    /// Upper bound on the number of structurally distinct successors, used
    /// to decide when a node is fully expanded.
    fn num_moves(&self) -> usize;
}
