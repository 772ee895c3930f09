//! Domain-agnostic Monte Carlo tree search.
//!
//! The engine knows nothing about cards: any `GameState` implementation can
//! be searched. The tree is an arena of nodes, the rollout policy is
//! pluggable, and every source of randomness flows through the seeded
//! `SearchRng`.

pub mod config;
pub mod node;
pub mod policy;
pub mod search;
pub mod stats;
pub mod tree;

pub use config::SearchConfig;
pub use node::{NodeId, SearchNode};
pub use policy::{RandomRollout, SimulationPolicy};
pub use search::MctsEngine;
pub use stats::SearchStats;
pub use tree::SearchTree;
