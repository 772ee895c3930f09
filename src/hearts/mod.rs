//! The trick-taking domain adapter.
//!
//! `DeterminizedRound` turns a partially observed round into a searchable
//! `GameState` by sampling the opponents' hidden hands; `MctsStrategy` wires
//! the engine to a turn-based environment through `play` and `watch`.

pub mod evaluator;
pub mod policy;
pub mod round;
pub mod strategy;

pub use evaluator::TrickEvaluator;
pub use policy::{AvoidPenaltyPlay, GuidedRollout, PlayPolicy, UniformPlay};
pub use round::{DeterminizedRound, RoundObservation};
pub use strategy::{MctsStrategy, WatchInfo};
