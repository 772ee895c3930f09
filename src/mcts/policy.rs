//! Rollout policies.
//!
//! The simulation phase is pluggable: the engine only requires something
//! that can estimate a terminal reward from a state. `RandomRollout` is the
//! vanilla-MCTS default; domain crates can provide guided variants without
//! touching the engine.

use crate::core::{EngineError, GameState, SearchRng};

/// Policy for running rollouts from a freshly expanded node.
pub trait SimulationPolicy<S: GameState>: Send + Sync {
    /// Play out from `state` to a terminal state and return its reward.
    fn simulate(&self, state: &S, rng: &mut SearchRng) -> Result<f64, EngineError>;
}

/// Pure random rollout: repeatedly sample `next_state` until terminal.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomRollout;

impl<S: GameState> SimulationPolicy<S> for RandomRollout {
    fn simulate(&self, state: &S, rng: &mut SearchRng) -> Result<f64, EngineError> {
        let mut current = state.clone();
        while !current.terminal() {
            current = current.next_state(rng)?;
        }
        Ok(current.reward())
    }
}
