//! Search statistics for diagnostics and tuning.

use serde::{Deserialize, Serialize};

/// Counters collected during one `search` call.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Completed iterations.
    pub iterations: u32,

    /// Rollouts performed (one per iteration).
    pub simulations: u32,

    /// Nodes added to the tree.
    pub nodes_expanded: u32,

    /// Expansions that gave up after the retry bound without finding a
    /// structurally novel successor.
    pub exhausted_expansions: u32,

    /// Maximum tree depth after the search.
    pub max_depth: u16,

    /// Wall time spent searching, in microseconds.
    pub time_us: u64,
}

impl SearchStats {
    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Iterations per second.
    #[must_use]
    pub fn iterations_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.iterations as f64 / (self.time_us as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_reset() {
        let mut stats = SearchStats {
            iterations: 100,
            simulations: 100,
            ..Default::default()
        };

        stats.reset();

        assert_eq!(stats.iterations, 0);
        assert_eq!(stats.simulations, 0);
    }

    #[test]
    fn test_iterations_per_second() {
        let stats = SearchStats {
            iterations: 1000,
            time_us: 1_000_000,
            ..Default::default()
        };
        assert_eq!(stats.iterations_per_second(), 1000.0);

        assert_eq!(SearchStats::default().iterations_per_second(), 0.0);
    }

    #[test]
    fn test_serialization() {
        let stats = SearchStats {
            iterations: 42,
            ..Default::default()
        };

        let json = serde_json::to_string(&stats).unwrap();
        let back: SearchStats = serde_json::from_str(&json).unwrap();

        assert_eq!(back.iterations, 42);
    }
}
