//! The four-phase MCTS loop: selection, expansion, simulation,
//! backpropagation.
//!
//! The tree policy is deliberately asymmetric: even when a node still has
//! unexpanded moves, it descends by UCB1 score with probability
//! `exploitation_bias`. In high-branching card games a node is rarely worth
//! expanding fully, and the bias keeps the budget concentrated on promising
//! lines.

use std::time::Instant;

use smallvec::SmallVec;
use tracing::trace;

use super::config::SearchConfig;
use super::node::NodeId;
use super::policy::{RandomRollout, SimulationPolicy};
use super::stats::SearchStats;
use super::tree::SearchTree;
use crate::core::{EngineError, GameState, SearchRng};

/// The search engine. One instance per searching agent.
///
/// Holds configuration, the seeded RNG, a rollout policy, and diagnostics;
/// stateless between `search` calls except for whatever tree it is handed.
pub struct MctsEngine<S: GameState> {
    config: SearchConfig,
    rng: SearchRng,
    simulation: Box<dyn SimulationPolicy<S>>,
    stats: SearchStats,
}

impl<S: GameState> MctsEngine<S> {
    /// Create an engine with the default random-rollout policy.
    pub fn new(config: SearchConfig) -> Self {
        let rng = SearchRng::new(config.seed);
        Self {
            config,
            rng,
            simulation: Box::new(RandomRollout),
            stats: SearchStats::default(),
        }
    }

    /// Replace the rollout policy.
    #[must_use]
    pub fn with_simulation<P: SimulationPolicy<S> + 'static>(mut self, policy: P) -> Self {
        self.simulation = Box::new(policy);
        self
    }

    /// Run exactly `budget` iterations on `tree`, then return the root's
    /// best child by pure exploitation (exploration constant 0).
    ///
    /// A budget of 0 performs no simulation and picks greedily from the
    /// root's pre-existing statistics.
    pub fn search(&mut self, tree: &mut SearchTree<S>, budget: u32) -> Result<NodeId, EngineError> {
        let start = Instant::now();
        self.stats.reset();

        for _ in 0..budget {
            let front = self.tree_policy(tree)?;
            let reward = self
                .simulation
                .simulate(&tree.get(front).state, &mut self.rng)?;
            self.stats.simulations += 1;
            self.backpropagate(tree, front, reward);
            self.stats.iterations += 1;

            trace!(
                iteration = self.stats.iterations,
                front = %front,
                reward,
                "search iteration"
            );
        }

        self.stats.max_depth = tree.max_depth();
        self.stats.time_us = start.elapsed().as_micros() as u64;

        self.best_child(tree, tree.root(), 0.0)
    }

    /// Selection phase: walk from the root to the node the next rollout
    /// starts from, expanding along the way.
    fn tree_policy(&mut self, tree: &mut SearchTree<S>) -> Result<NodeId, EngineError> {
        let mut current = tree.root();

        loop {
            if tree.get(current).state.terminal() {
                return Ok(current);
            }

            if tree.get(current).children.is_empty() {
                return match self.expand(tree, current)? {
                    Some(child) => Ok(child),
                    // Non-terminal but no novel successor found: roll out
                    // from here rather than loop.
                    None => Ok(current),
                };
            }

            if self.rng.gen_bool(self.config.exploitation_bias) {
                current = self.best_child(tree, current, self.config.exploration_constant)?;
            } else if !tree.get(current).fully_expanded() {
                match self.expand(tree, current)? {
                    Some(child) => return Ok(child),
                    None => {
                        current =
                            self.best_child(tree, current, self.config.exploration_constant)?;
                    }
                }
            } else {
                current = self.best_child(tree, current, self.config.exploration_constant)?;
            }
        }
    }

    /// Expansion phase: sample a successor not already among the children.
    ///
    /// Resamples up to `expansion_retries` times; if every sample collapses
    /// into an existing child the node is marked exhausted and `None` is
    /// returned.
    fn expand(
        &mut self,
        tree: &mut SearchTree<S>,
        node: NodeId,
    ) -> Result<Option<NodeId>, EngineError> {
        for _ in 0..self.config.expansion_retries {
            let candidate = tree.get(node).state.next_state(&mut self.rng)?;
            if tree.find_child(node, &candidate).is_none() {
                let child = tree.add_child(node, candidate);
                self.stats.nodes_expanded += 1;
                return Ok(Some(child));
            }
        }

        tree.get_mut(node).exhausted = true;
        self.stats.exhausted_expansions += 1;
        trace!(node = %node, "expansion exhausted");
        Ok(None)
    }

    /// Score each child by UCB1 and return one of the best, ties broken
    /// uniformly at random.
    ///
    /// `exploration = 0` gives the pure-exploitation pick used for the
    /// final decision. A node with no children is an engine invariant
    /// failure, never silently defaulted.
    fn best_child(
        &mut self,
        tree: &SearchTree<S>,
        node: NodeId,
        exploration: f64,
    ) -> Result<NodeId, EngineError> {
        let parent = tree.get(node);
        if parent.children.is_empty() {
            return Err(EngineError::SearchInternal(format!(
                "best_child invoked on childless node {node}"
            )));
        }

        let ln_parent = (parent.visits as f64).ln();
        let mut best_score = f64::NEG_INFINITY;
        let mut best: SmallVec<[NodeId; 8]> = SmallVec::new();

        for &child_id in &parent.children {
            let child = tree.get(child_id);
            let exploit = child.mean_reward();
            let explore = (2.0 * ln_parent / child.visits as f64).sqrt();
            let score = exploit + exploration * explore;

            if (score - best_score).abs() < f64::EPSILON {
                best.push(child_id);
            } else if score > best_score {
                best_score = score;
                best.clear();
                best.push(child_id);
            }
        }

        self.rng.choose(&best).copied().ok_or_else(|| {
            EngineError::SearchInternal(format!("no best-child candidate under node {node}"))
        })
    }

    /// Backpropagation phase: update every node from `from` to the root
    /// inclusive.
    fn backpropagate(&mut self, tree: &mut SearchTree<S>, from: NodeId, reward: f64) {
        let mut current = from;
        loop {
            let node = tree.get_mut(current);
            node.update(reward);
            if node.parent.is_none() {
                break;
            }
            current = node.parent;
        }
    }

    /// Diagnostics from the last `search` call.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}
