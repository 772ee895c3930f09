//! Tree nodes and arena indices.
//!
//! Nodes live in a flat arena (`SearchTree`) and reference each other by
//! `NodeId` index. The parent link is a plain index, a non-owning
//! observation link used only for backpropagation, so there are no
//! reference cycles and a subtree dropped at re-rooting is actually freed.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::core::GameState;

/// Index into the `SearchTree` node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value representing no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Create a new node ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Check if this is the NONE sentinel.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Raw index value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "NodeId(NONE)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

/// A node in the search tree, exclusively owning its game state.
#[derive(Clone, Debug)]
pub struct SearchNode<S> {
    /// The state this node wraps. No aliasing across nodes.
    pub state: S,

    /// Parent node (NONE for the root). Non-owning index link.
    pub parent: NodeId,

    /// Depth in the tree (root = 0).
    pub depth: u16,

    /// Visit count. Starts at 1 on creation and increases by exactly 1 per
    /// backpropagation pass through this node.
    pub visits: u32,

    /// Sum of backpropagated terminal rewards.
    pub reward: f64,

    /// Child node IDs, in discovery order.
    pub children: SmallVec<[NodeId; 8]>,

    /// State-hash buckets over `children`, accelerating dedup lookups. A
    /// bucket hit still requires a structural equality check.
    pub(crate) child_buckets: FxHashMap<u64, SmallVec<[NodeId; 2]>>,

    /// Set when expansion gave up finding a novel successor; the node is
    /// then treated as fully expanded.
    pub exhausted: bool,
}

impl<S: GameState> SearchNode<S> {
    /// Create a node wrapping `state`.
    pub fn new(state: S, parent: NodeId, depth: u16) -> Self {
        Self {
            state,
            parent,
            depth,
            visits: 1,
            reward: 0.0,
            children: SmallVec::new(),
            child_buckets: FxHashMap::default(),
            exhausted: false,
        }
    }

    /// Create a root node.
    pub fn root(state: S) -> Self {
        Self::new(state, NodeId::NONE, 0)
    }

    /// Record one backpropagated reward.
    pub fn update(&mut self, reward: f64) {
        self.visits += 1;
        self.reward += reward;
    }

    /// Average backpropagated reward.
    #[must_use]
    pub fn mean_reward(&self) -> f64 {
        self.reward / self.visits as f64
    }

    /// True when every distinct successor has been discovered, or expansion
    /// has been exhausted.
    #[must_use]
    pub fn fully_expanded(&self) -> bool {
        self.exhausted || self.children.len() >= self.state.num_moves()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EngineError, SearchRng};

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    struct StubState(u32);

    impl GameState for StubState {
        fn next_state(&self, _rng: &mut SearchRng) -> Result<Self, EngineError> {
            Ok(StubState(self.0 + 1))
        }

        fn terminal(&self) -> bool {
            false
        }

        fn reward(&self) -> f64 {
            0.5
        }

        fn num_moves(&self) -> usize {
            2
        }
    }

    #[test]
    fn test_node_id() {
        let id = NodeId::new(5);
        assert_eq!(id.raw(), 5);
        assert!(!id.is_none());
        assert_eq!(format!("{}", id), "NodeId(5)");

        assert!(NodeId::NONE.is_none());
        assert_eq!(format!("{}", NodeId::NONE), "NodeId(NONE)");
    }

    #[test]
    fn test_new_node_starts_with_one_visit() {
        let node = SearchNode::root(StubState(0));

        assert!(node.parent.is_none());
        assert_eq!(node.depth, 0);
        assert_eq!(node.visits, 1);
        assert_eq!(node.reward, 0.0);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_update_accumulates() {
        let mut node = SearchNode::root(StubState(0));

        node.update(0.75);
        node.update(0.25);

        assert_eq!(node.visits, 3);
        assert_eq!(node.reward, 1.0);
        assert!((node.mean_reward() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_fully_expanded() {
        let mut node = SearchNode::root(StubState(0));
        assert!(!node.fully_expanded());

        node.children.push(NodeId::new(1));
        assert!(!node.fully_expanded());

        node.children.push(NodeId::new(2));
        assert!(node.fully_expanded());
    }

    #[test]
    fn test_exhausted_counts_as_fully_expanded() {
        let mut node = SearchNode::root(StubState(0));
        node.exhausted = true;
        assert!(node.fully_expanded());
    }
}
