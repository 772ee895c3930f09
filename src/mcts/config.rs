//! Search configuration parameters.

use serde::{Deserialize, Serialize};

/// MCTS configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// UCB1 exploration constant (default: 1/sqrt(2)).
    /// Larger values favor exploration over exploitation.
    pub exploration_constant: f64,

    /// Probability of descending by UCB1 score instead of expanding when a
    /// node still has unexpanded moves (default: 0.5). High-branching card
    /// games never finish expanding a node within realistic budgets, so the
    /// tree policy deliberately exploits early.
    pub exploitation_bias: f64,

    /// Iterations per decision (default: 100). The only stopping condition.
    pub budget: u32,

    /// Resampling attempts before expansion gives up on finding a
    /// structurally novel successor and marks the node exhausted.
    pub expansion_retries: u32,

    /// Independent hidden-card deals counted per legal choice when sizing
    /// the branching factor of an undetermined root.
    pub deal_samples: usize,

    /// Hard cap on the branching factor of any single node.
    pub max_branching: usize,

    /// Seed for the search RNG. Same seed, same chosen actions.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::FRAC_1_SQRT_2,
            exploitation_bias: 0.5,
            budget: 100,
            expansion_retries: 16,
            deal_samples: 4,
            max_branching: 64,
            seed: 42,
        }
    }
}

impl SearchConfig {
    /// Set the exploration constant.
    #[must_use]
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Set the exploitation bias.
    #[must_use]
    pub fn with_exploitation_bias(mut self, bias: f64) -> Self {
        self.exploitation_bias = bias;
        self
    }

    /// Set the iteration budget.
    #[must_use]
    pub fn with_budget(mut self, budget: u32) -> Self {
        self.budget = budget;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of deals counted per expansion.
    #[must_use]
    pub fn with_deal_samples(mut self, samples: usize) -> Self {
        self.deal_samples = samples;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert!((config.exploration_constant - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
        assert_eq!(config.exploitation_bias, 0.5);
        assert_eq!(config.budget, 100);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SearchConfig::default()
            .with_exploration(1.0)
            .with_budget(500)
            .with_seed(123)
            .with_deal_samples(8);

        assert_eq!(config.exploration_constant, 1.0);
        assert_eq!(config.budget, 500);
        assert_eq!(config.seed, 123);
        assert_eq!(config.deal_samples, 8);
    }

    #[test]
    fn test_serialization() {
        let config = SearchConfig::default().with_seed(7);
        let json = serde_json::to_string(&config).unwrap();
        let back: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed, 7);
        assert_eq!(back.budget, config.budget);
    }
}
