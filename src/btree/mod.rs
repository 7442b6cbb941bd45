//! Multiway search tree of configurable order.

mod node;

use core::fmt;

use alloc::collections::VecDeque;
use alloc::format;

use smallvec::SmallVec;

use crate::compare::{Compare, Natural};
use crate::config::{DEFAULT_ORDER, Strategy, TreeConfig, WalkOrder};
use crate::error::{Error, Result};
use crate::raw::{Arena, Handle, violation};
use crate::tree::SearchTree;
use crate::view::{Lookup, NodeView};

use node::{BTreeNode, SearchResult};

/// Where a descent from the root ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Position {
    Found { node: Handle, index: usize },
    /// The key belongs at `index` of the leaf `node`.
    Vacant { node: Handle, index: usize },
}

/// A B-tree of order `m`: every node has at most `m` children, every node
/// but the root holds at least `ceil(m / 2) - 1` keys, and all leaves sit at
/// the same depth.
///
/// Unlike the binary strategies a node holds several keys, so
/// [`Lookup::Found`] reports the key's index within the node. Only level-order
/// walks are supported.
pub struct BTree<K, V, C = Natural> {
    nodes: Arena<BTreeNode<K, V>>,
    root: Option<Handle>,
    len: usize,
    order: usize,
    comparator: C,
}

impl<K: Ord, V> BTree<K, V> {
    /// An empty tree of the default order (4).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            order: DEFAULT_ORDER,
            comparator: Natural,
        }
    }

    /// An empty tree of order `order`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOrder`] if `order` is below 3.
    pub fn with_order(order: usize) -> Result<Self> {
        Self::with_config(&TreeConfig::new().with_order(order), Natural)
    }
}

impl<K: Ord, V> Default for BTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Compare<K>> BTree<K, V, C> {
    /// # Errors
    ///
    /// [`Error::InvalidOrder`] if `config.order` is below 3.
    pub fn with_config(config: &TreeConfig, comparator: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            nodes: Arena::with_capacity(config.capacity),
            root: None,
            len: 0,
            order: config.order,
            comparator,
        })
    }

    /// Maximum number of children per node.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    fn min_keys(&self) -> usize {
        self.order.div_ceil(2) - 1
    }

    fn node(&self, node: Handle) -> &BTreeNode<K, V> {
        self.nodes.get(node)
    }

    fn node_mut(&mut self, node: Handle) -> &mut BTreeNode<K, V> {
        self.nodes.get_mut(node)
    }

    fn locate(&self, key: &K) -> Option<Position> {
        let mut current = self.root?;
        loop {
            let node = self.node(current);
            match node.search(&self.comparator, key) {
                SearchResult::Found(index) => return Some(Position::Found { node: current, index }),
                SearchResult::NotFound(index) if node.is_leaf() => {
                    return Some(Position::Vacant { node: current, index });
                }
                SearchResult::NotFound(index) => current = node.children[index],
            }
        }
    }

    /// Points every child of `node` back at it.
    fn adopt_children(&mut self, node: Handle) {
        let children = self.node(node).children.clone();
        for child in children {
            self.node_mut(child).parent = Some(node);
        }
    }

    /// Splits `node` upwards while it holds `order` keys.
    ///
    /// `tracked` is the position of the freshly inserted key; its final
    /// position is returned.
    fn solve_overflow(&mut self, mut node: Handle, mut tracked: (Handle, usize)) -> (Handle, usize) {
        let mid = self.order / 2;
        while self.node(node).key_count() >= self.order {
            let parent = match self.node(node).parent {
                Some(parent) => parent,
                None => {
                    let root = self.nodes.alloc(BTreeNode::new_root_above(node));
                    self.node_mut(node).parent = Some(root);
                    self.root = Some(root);
                    tracing::trace!(?root, "b-tree grew a level");
                    root
                }
            };

            let (key, value, right) = self.node_mut(node).split(mid);
            let right = self.nodes.alloc(right);
            self.adopt_children(right);

            let slot = self.node(parent).slot_of(node);
            let parent_node = self.node_mut(parent);
            parent_node.insert_entry(slot, key, value);
            parent_node.children.insert(slot + 1, right);
            tracing::trace!(?node, ?right, ?parent, "b-tree split");

            if tracked.0 == node {
                tracked = match tracked.1 {
                    index if index < mid => tracked,
                    index if index == mid => (parent, slot),
                    index => (right, index - mid - 1),
                };
            }
            node = parent;
        }
        tracked
    }

    /// Restores minimum occupancy from `node` upwards after a key left it.
    fn solve_underflow(&mut self, mut node: Handle) {
        let min = self.min_keys();
        loop {
            let Some(parent) = self.node(node).parent else {
                if self.node(node).key_count() == 0 {
                    let child = self.node(node).children.first().copied();
                    self.nodes.take(node);
                    self.root = child;
                    if let Some(child) = child {
                        self.node_mut(child).parent = None;
                    }
                    tracing::trace!(new_root = ?child, "b-tree lost a level");
                }
                return;
            };
            if self.node(node).key_count() >= min {
                return;
            }

            let slot = self.node(parent).slot_of(node);
            let siblings = &self.node(parent).children;
            let left = slot.checked_sub(1).map(|slot| siblings[slot]);
            let right = siblings.get(slot + 1).copied();

            if let Some(left) = left
                && self.node(left).key_count() > min
            {
                let (key, value, child) = self.node_mut(left).pop_back();
                let (key, value) = self.node_mut(parent).replace_entry(slot - 1, key, value);
                let target = self.node_mut(node);
                target.insert_entry(0, key, value);
                if let Some(child) = child {
                    target.children.insert(0, child);
                    self.node_mut(child).parent = Some(node);
                }
                tracing::trace!(?node, from = ?left, "b-tree borrow");
                return;
            }

            if let Some(right) = right
                && self.node(right).key_count() > min
            {
                let (key, value, child) = self.node_mut(right).pop_front();
                let (key, value) = self.node_mut(parent).replace_entry(slot, key, value);
                let target = self.node_mut(node);
                target.push_entry(key, value);
                if let Some(child) = child {
                    target.children.push(child);
                    self.node_mut(child).parent = Some(node);
                }
                tracing::trace!(?node, from = ?right, "b-tree borrow");
                return;
            }

            if left.is_some() {
                self.merge_children(parent, slot - 1);
            } else {
                self.merge_children(parent, slot);
            }
            node = parent;
        }
    }

    /// Folds `children[slot + 1]` and the separator between them into
    /// `children[slot]`.
    fn merge_children(&mut self, parent: Handle, slot: usize) {
        let parent_node = self.node_mut(parent);
        let separator = parent_node.remove_entry(slot);
        let right = parent_node.children.remove(slot + 1);
        let left = parent_node.children[slot];

        let right_node = self.nodes.take(right);
        self.node_mut(left).absorb(separator, right_node);
        self.adopt_children(left);
        tracing::trace!(?left, ?right, "b-tree merge");
    }

    /// Leftmost leaf below `node`.
    fn first_leaf(&self, mut node: Handle) -> Handle {
        while let Some(&child) = self.node(node).children.first() {
            node = child;
        }
        node
    }

    fn view(&self, node: Handle) -> NodeView<'_, K, V> {
        NodeView::new(&self.nodes, node)
    }

    /// Visits keys in ascending order.
    fn for_each_key<'a>(&'a self, mut visit: impl FnMut(&'a K)) {
        let Some(root) = self.root else {
            return;
        };
        // (node, next key index to emit)
        let mut stack: SmallVec<[(Handle, usize); 16]> = SmallVec::new();
        stack.push((root, 0));
        while let Some((handle, index)) = stack.pop() {
            let node = self.node(handle);
            if node.is_leaf() {
                node.keys.iter().for_each(&mut visit);
                continue;
            }
            if index > 0 {
                visit(&node.keys[index - 1]);
            }
            if index + 1 < node.children.len() {
                stack.push((handle, index + 1));
            }
            stack.push((node.children[index], 0));
        }
    }
}

impl<K, V, C: Compare<K>> SearchTree<K, V> for BTree<K, V, C> {
    fn strategy(&self) -> Strategy {
        Strategy::BTree
    }

    fn len(&self) -> usize {
        self.len
    }

    fn search(&mut self, key: &K) -> Lookup<'_, K, V> {
        match self.locate(key) {
            Some(Position::Found { node, index }) => Lookup::Found {
                node: self.view(node),
                index,
            },
            Some(Position::Vacant { node, .. }) => Lookup::Missing(Some(self.view(node))),
            None => Lookup::Missing(None),
        }
    }

    fn insert(&mut self, key: K, data: V) -> Result<NodeView<'_, K, V>> {
        let (node, index) = match self.locate(&key) {
            Some(Position::Found { .. }) => return Err(Error::DuplicateKey),
            Some(Position::Vacant { node, index }) => (node, index),
            None => {
                let root = self.nodes.alloc(BTreeNode::new_leaf(None));
                self.root = Some(root);
                (root, 0)
            }
        };

        self.node_mut(node).insert_entry(index, key, data);
        self.len += 1;
        let (holder, _) = self.solve_overflow(node, (node, index));
        Ok(self.view(holder))
    }

    fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let Some(Position::Found { node, index }) = self.locate(key) else {
            return None;
        };

        let (entry, leaf) = if self.node(node).is_leaf() {
            (self.node_mut(node).remove_entry(index), node)
        } else {
            let leaf = self.first_leaf(self.node(node).children[index + 1]);
            let (key, value) = self.node_mut(leaf).remove_entry(0);
            (self.node_mut(node).replace_entry(index, key, value), leaf)
        };
        self.len -= 1;
        self.solve_underflow(leaf);
        Some(entry)
    }

    fn root(&self) -> Option<NodeView<'_, K, V>> {
        self.root.map(|root| self.view(root))
    }

    fn walk(&self, order: WalkOrder, visit: &mut dyn FnMut(NodeView<'_, K, V>)) -> Result<()> {
        if order != WalkOrder::LevelOrder {
            return Err(Error::UnsupportedWalkOrder {
                strategy: Strategy::BTree,
                order,
            });
        }
        let mut queue: VecDeque<Handle> = self.root.into_iter().collect();
        while let Some(node) = queue.pop_front() {
            queue.extend(self.node(node).children.iter().copied());
            visit(self.view(node));
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    fn validate(&self) -> Result<()> {
        let Some(root) = self.root else {
            return if self.len == 0 {
                Ok(())
            } else {
                Err(violation(format!("empty tree with len {}", self.len)))
            };
        };
        if self.node(root).parent.is_some() {
            return Err(violation("root has a parent link"));
        }

        let (min, max) = (self.min_keys(), self.order - 1);
        let mut leaf_depth = None;
        let mut count = 0;
        let mut queue = VecDeque::from([(root, 0usize)]);
        while let Some((handle, depth)) = queue.pop_front() {
            let node = self.node(handle);
            let keys = node.key_count();
            count += keys;

            if keys > max || keys == 0 || (handle != root && keys < min) {
                return Err(violation(format!("{handle:?} holds {keys} keys (allowed {min}..={max})")));
            }
            if node.values.len() != keys {
                return Err(violation(format!("{handle:?} has {keys} keys but {} values", node.values.len())));
            }
            if !node.is_sorted(&self.comparator) {
                return Err(violation(format!("{handle:?} keys out of order")));
            }

            if node.is_leaf() {
                if *leaf_depth.get_or_insert(depth) != depth {
                    return Err(violation(format!("{handle:?} is a leaf at depth {depth}, others at {leaf_depth:?}")));
                }
                continue;
            }
            if node.children.len() != keys + 1 {
                return Err(violation(format!("{handle:?} has {keys} keys but {} children", node.children.len())));
            }
            for &child in &node.children {
                if self.node(child).parent != Some(handle) {
                    return Err(violation(format!("child {child:?} of {handle:?} links to another parent")));
                }
                queue.push_back((child, depth + 1));
            }
        }

        if count != self.len {
            return Err(violation(format!("{count} keys reachable but len is {}", self.len)));
        }

        let mut previous: Option<&K> = None;
        let mut ordered = true;
        self.for_each_key(|key| {
            if let Some(previous) = previous {
                ordered &= self.comparator.compare(previous, key).is_lt();
            }
            previous = Some(key);
        });
        if !ordered {
            return Err(violation("separator keys out of order"));
        }
        Ok(())
    }
}

impl<K: fmt::Debug, V, C: Compare<K>> fmt::Debug for BTree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_set();
        self.for_each_key(|key| {
            keys.entry(key);
        });
        keys.finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::Strategy;
    use crate::testing::{op_strategy, replay, walk_keys};
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn key_counts<V>(tree: &BTree<i32, V>) -> Vec<usize> {
        let mut counts = Vec::new();
        tree.walk(WalkOrder::LevelOrder, &mut |node| counts.push(node.keys().len()))
            .unwrap();
        counts
    }

    #[test]
    fn order_five_scenario() {
        let mut tree = BTree::with_order(5).unwrap();
        for key in 0..20 {
            tree.insert(key, ()).unwrap();
            tree.validate().unwrap();
        }
        assert!(tree.remove(&5));
        tree.validate().unwrap();

        let counts = key_counts(&tree);
        assert!(counts[1..].iter().all(|count| (2..=4).contains(count)), "{counts:?}");
        assert!((1..=4).contains(&counts[0]));
        assert!(!tree.search(&5).is_found());
        assert_eq!(tree.len(), 19);
    }

    #[test]
    fn order_below_three_is_rejected() {
        assert_eq!(BTree::<i32, ()>::with_order(2).err(), Some(Error::InvalidOrder { order: 2 }));
        assert!(BTree::<i32, ()>::with_order(3).is_ok());
    }

    #[test]
    fn only_level_order_walks() {
        let mut tree = BTree::new();
        tree.insert(1, ()).unwrap();
        for order in [WalkOrder::PreOrder, WalkOrder::InOrder, WalkOrder::PostOrder] {
            assert_eq!(
                tree.walk(order, &mut |_| {}),
                Err(Error::UnsupportedWalkOrder {
                    strategy: Strategy::BTree,
                    order
                })
            );
        }
        assert_eq!(walk_keys(&tree, WalkOrder::LevelOrder), [1]);
    }

    #[test]
    fn insert_returns_node_holding_key_after_split() {
        let mut tree = BTree::with_order(3).unwrap();
        for key in [10, 20] {
            tree.insert(key, ()).unwrap();
        }
        // Third key overflows the root leaf; the median moves up.
        let node = tree.insert(15, ()).unwrap();
        assert_eq!(node.keys(), &[15]);
        assert!(node.is_root());
        assert_eq!(node.children().count(), 2);
        tree.validate().unwrap();
    }

    #[test]
    fn found_reports_index_within_node() {
        let mut tree = BTree::new();
        for key in [1, 2, 3] {
            tree.insert(key, key * 10).unwrap();
        }
        match tree.search(&3) {
            Lookup::Found { node, index } => {
                assert_eq!(index, 2);
                assert_eq!(node.values()[index], 30);
            }
            Lookup::Missing(_) => panic!("key 3 not found"),
        }
    }

    #[test]
    fn internal_removal_uses_successor() {
        let mut tree = BTree::with_order(3).unwrap();
        for key in 0..7 {
            tree.insert(key, key).unwrap();
        }
        let root_key = *tree.root().unwrap().key();
        assert_eq!(tree.remove_entry(&root_key), Some((root_key, root_key)));
        tree.validate().unwrap();
        assert!(!tree.contains_key(&root_key));
    }

    #[test]
    fn draining_empties_the_root() {
        let mut tree = BTree::with_order(4).unwrap();
        for key in 0..50 {
            tree.insert(key, ()).unwrap();
        }
        for key in 0..50 {
            assert!(tree.remove(&key));
            tree.validate().unwrap();
        }
        assert!(tree.root().is_none());
        assert!(tree.is_empty());
        assert!(matches!(tree.search(&1), Lookup::Missing(None)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn random_operations_keep_invariants(
            order in 3usize..=5,
            ops in prop::collection::vec(op_strategy(), 0..300),
        ) {
            let mut tree: BTree<i32, i32> = BTree::with_order(order).unwrap();
            replay(&mut tree, &ops)?;
        }
    }
}
