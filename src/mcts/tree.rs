//! Arena-based search tree.
//!
//! A flat `Vec<SearchNode<S>>` with `NodeId` index links: no reference
//! counting, no ownership cycles. Children are deduplicated by state-hash
//! bucket followed by a full structural equality check; the hash alone is
//! never trusted as equality.

use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};

use super::node::{NodeId, SearchNode};
use crate::core::GameState;

fn state_hash<S: Hash>(state: &S) -> u64 {
    let mut hasher = FxHasher::default();
    state.hash(&mut hasher);
    hasher.finish()
}

/// The search tree: an arena of nodes plus the current root.
#[derive(Clone, Debug)]
pub struct SearchTree<S> {
    nodes: Vec<SearchNode<S>>,
    root: NodeId,
}

impl<S: GameState> SearchTree<S> {
    /// Create a tree with a single root wrapping `root_state`.
    pub fn new(root_state: S) -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(1024),
            root: NodeId::new(0),
        };
        tree.nodes.push(SearchNode::root(root_state));
        tree
    }

    /// Current root ID.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &SearchNode<S> {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode<S> {
        &mut self.nodes[id.0 as usize]
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty (never true for a constructed tree).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest node depth.
    #[must_use]
    pub fn max_depth(&self) -> u16 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Iterate over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SearchNode<S>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i as u32), n))
    }

    /// Find the child of `parent` that structurally equals `state`.
    ///
    /// The hash bucket narrows the candidates; equality is always confirmed
    /// field-by-field before a match is reported.
    #[must_use]
    pub fn find_child(&self, parent: NodeId, state: &S) -> Option<NodeId> {
        let bucket = self.get(parent).child_buckets.get(&state_hash(state))?;
        bucket
            .iter()
            .copied()
            .find(|&id| &self.get(id).state == state)
    }

    /// Insert a child of `parent` wrapping `state`, unless a structurally
    /// equal child already exists. Idempotent; returns the child's ID either
    /// way.
    pub fn add_child(&mut self, parent: NodeId, state: S) -> NodeId {
        if let Some(existing) = self.find_child(parent, &state) {
            return existing;
        }

        let hash = state_hash(&state);
        let depth = self.get(parent).depth + 1;
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(SearchNode::new(state, parent, depth));

        let parent_node = self.get_mut(parent);
        parent_node.children.push(id);
        parent_node.child_buckets.entry(hash).or_default().push(id);

        id
    }

    /// Re-root the tree at the child of the current root matching `state`,
    /// creating that child if absent.
    ///
    /// The retained subtree is compacted into a fresh arena, so every stale
    /// sibling subtree is freed, and already-explored statistics under the
    /// new root survive. Returns the new root ID.
    pub fn move_to_child(&mut self, state: S) -> NodeId {
        let child = self.add_child(self.root, state);
        self.reroot(child);
        self.root
    }

    fn reroot(&mut self, new_root: NodeId) {
        let mut order: Vec<NodeId> = Vec::new();
        let mut remap: FxHashMap<NodeId, NodeId> = FxHashMap::default();

        let mut queue = VecDeque::new();
        queue.push_back(new_root);
        while let Some(id) = queue.pop_front() {
            remap.insert(id, NodeId::new(order.len() as u32));
            order.push(id);
            for &child in &self.nodes[id.0 as usize].children {
                queue.push_back(child);
            }
        }

        let base_depth = self.nodes[new_root.0 as usize].depth;
        let mut nodes = Vec::with_capacity(order.len());
        for &old_id in &order {
            let old = &self.nodes[old_id.0 as usize];
            nodes.push(SearchNode {
                state: old.state.clone(),
                parent: if old_id == new_root {
                    NodeId::NONE
                } else {
                    remap[&old.parent]
                },
                depth: old.depth - base_depth,
                visits: old.visits,
                reward: old.reward,
                children: old.children.iter().map(|c| remap[c]).collect(),
                child_buckets: old
                    .child_buckets
                    .iter()
                    .map(|(&h, bucket)| (h, bucket.iter().map(|c| remap[c]).collect()))
                    .collect(),
                exhausted: old.exhausted,
            });
        }

        self.nodes = nodes;
        self.root = NodeId::new(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EngineError, SearchRng};

    /// Digit-trail toy state: each transition appends a random digit.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    struct TrailState(u64);

    impl GameState for TrailState {
        fn next_state(&self, rng: &mut SearchRng) -> Result<Self, EngineError> {
            Ok(TrailState(self.0 * 10 + rng.gen_range_usize(1..4) as u64))
        }

        fn terminal(&self) -> bool {
            self.0 >= 1000
        }

        fn reward(&self) -> f64 {
            0.5
        }

        fn num_moves(&self) -> usize {
            3
        }
    }

    #[test]
    fn test_new_tree() {
        let tree = SearchTree::new(TrailState(1));

        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.get(tree.root()).state, TrailState(1));
    }

    #[test]
    fn test_add_child_is_idempotent() {
        let mut tree = SearchTree::new(TrailState(1));
        let root = tree.root();

        let a = tree.add_child(root, TrailState(11));
        let b = tree.add_child(root, TrailState(11));
        let c = tree.add_child(root, TrailState(12));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(root).children.len(), 2);
    }

    #[test]
    fn test_find_child_requires_structural_equality() {
        let mut tree = SearchTree::new(TrailState(1));
        let root = tree.root();
        let child = tree.add_child(root, TrailState(11));

        assert_eq!(tree.find_child(root, &TrailState(11)), Some(child));
        assert_eq!(tree.find_child(root, &TrailState(12)), None);
    }

    #[test]
    fn test_child_depth_and_parent_link() {
        let mut tree = SearchTree::new(TrailState(1));
        let root = tree.root();
        let child = tree.add_child(root, TrailState(11));
        let grandchild = tree.add_child(child, TrailState(111));

        assert_eq!(tree.get(child).depth, 1);
        assert_eq!(tree.get(grandchild).depth, 2);
        assert_eq!(tree.get(grandchild).parent, child);
        assert!(tree.get(root).parent.is_none());
    }

    #[test]
    fn test_move_to_child_discards_stale_branches() {
        let mut tree = SearchTree::new(TrailState(1));
        let root = tree.root();

        // Kept branch: 11 with two children.
        let keep = tree.add_child(root, TrailState(11));
        tree.add_child(keep, TrailState(111));
        tree.add_child(keep, TrailState(112));

        // Stale branch: 12 with one child.
        let stale = tree.add_child(root, TrailState(12));
        tree.add_child(stale, TrailState(121));

        tree.get_mut(keep).visits = 40;
        tree.get_mut(keep).reward = 20.0;

        let new_root = tree.move_to_child(TrailState(11));

        // Only the retained subtree survives the compaction.
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(new_root).state, TrailState(11));
        assert_eq!(tree.get(new_root).depth, 0);
        assert!(tree.get(new_root).parent.is_none());

        // Statistics are preserved through re-rooting.
        assert_eq!(tree.get(new_root).visits, 40);
        assert_eq!(tree.get(new_root).reward, 20.0);

        let states: Vec<_> = tree.iter().map(|(_, n)| n.state.clone()).collect();
        assert!(states.contains(&TrailState(111)));
        assert!(states.contains(&TrailState(112)));
        assert!(!states.contains(&TrailState(12)));
        assert!(!states.contains(&TrailState(121)));
    }

    #[test]
    fn test_move_to_child_creates_missing_child() {
        let mut tree = SearchTree::new(TrailState(1));

        let new_root = tree.move_to_child(TrailState(13));

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(new_root).state, TrailState(13));
    }

    #[test]
    fn test_reroot_remaps_child_buckets() {
        let mut tree = SearchTree::new(TrailState(1));
        let root = tree.root();
        let keep = tree.add_child(root, TrailState(11));
        tree.add_child(keep, TrailState(111));
        tree.add_child(root, TrailState(12));

        let new_root = tree.move_to_child(TrailState(11));

        // Dedup lookup still works against the compacted arena.
        let found = tree.find_child(new_root, &TrailState(111));
        assert!(found.is_some());
        assert_eq!(tree.get(found.unwrap()).state, TrailState(111));
        assert_eq!(tree.add_child(new_root, TrailState(111)), found.unwrap());
    }
}
