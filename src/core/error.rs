//! Crate-wide error type.
//!
//! All three variants are fatal to the current search: none are retried,
//! since a corrupted tree or deal would only compound.

use thiserror::Error;

use super::card::Card;

/// Errors surfaced by the search engine and the domain adapter.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The deal invariant was broken: a card sampled into two places, or a
    /// transition left the state outside the 52-card accounting. Indicates
    /// a logic bug in determinization, never corrected silently.
    #[error("deal invariant violated: {0}")]
    StateInvariant(String),

    /// An engine precondition failed, e.g. best-child selection on a node
    /// with no children.
    #[error("search internal error: {0}")]
    SearchInternal(String),

    /// The adapter was about to surface a card not in hand or one breaking
    /// the follow-suit rule. Caught at the environment boundary.
    #[error("illegal move {card}: {reason}")]
    IllegalMove { card: Card, reason: String },
}
