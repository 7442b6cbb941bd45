//! Height-balanced binary search tree.

use core::fmt;

use crate::compare::{Compare, Natural};
use crate::config::{Strategy, TreeConfig, WalkOrder};
use crate::error::{Error, Result};
use crate::raw::{Annotation, Handle, Probe, RawBinaryTree, Triple, violation};
use crate::tree::SearchTree;
use crate::view::{Balance, Lookup, NodeView};

/// Height of the subtree rooted at a node: 0 for a leaf.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Height(i32);

impl Annotation for Height {
    fn leaf() -> Self {
        Height(0)
    }

    fn balance(self) -> Balance {
        Balance::Height(self.0)
    }
}

/// An empty subtree has height -1.
const ABSENT: Height = Height(-1);

/// An AVL tree: sibling subtree heights differ by at most one everywhere.
///
/// Insertion repairs with at most one 3+4 reconstruction; removal may need
/// one per level on the way back to the root.
pub struct AvlTree<K, V, C = Natural> {
    raw: RawBinaryTree<K, V, Height>,
    comparator: C,
}

impl<K: Ord, V> AvlTree<K, V> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: RawBinaryTree::new(),
            comparator: Natural,
        }
    }
}

impl<K: Ord, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Compare<K>> AvlTree<K, V, C> {
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            raw: RawBinaryTree::new(),
            comparator,
        }
    }

    /// Builds a tree reserving `config.capacity` nodes. The order is ignored.
    pub fn with_config(config: &TreeConfig, comparator: C) -> Self {
        Self {
            raw: RawBinaryTree::with_capacity(config.capacity),
            comparator,
        }
    }

    fn stature(&self, node: Option<Handle>) -> i32 {
        self.raw.aux_or(node, ABSENT).0
    }

    fn update_height(&mut self, node: Handle) {
        let height = 1 + self.stature(self.raw.left(node)).max(self.stature(self.raw.right(node)));
        self.raw.set_aux(node, Height(height));
    }

    fn balance_factor(&self, node: Handle) -> i32 {
        self.stature(self.raw.left(node)) - self.stature(self.raw.right(node))
    }

    fn is_balanced(&self, node: Handle) -> bool {
        (-1..=1).contains(&self.balance_factor(node))
    }

    /// The child with the taller subtree. Ties go to the child on the same
    /// side as `node` hangs from its parent, so the reconstruction is a
    /// single rotation when possible.
    fn taller_child(&self, node: Handle) -> Handle {
        let (left, right) = (self.raw.left(node), self.raw.right(node));
        let taller = match self.balance_factor(node) {
            1.. => left,
            ..0 => right,
            0 if self.raw.is_left_child(node) => left,
            0 => right,
        };
        taller.expect("`AvlTree::taller_child()` - unbalanced subtree without grandchild")
    }

    fn rebalance_at(&mut self, unbalanced: Handle) -> Handle {
        let grandchild = self.taller_child(self.taller_child(unbalanced));
        let Triple { a, b, c } = self.raw.rotate_at(grandchild);
        self.update_height(a);
        self.update_height(c);
        self.update_height(b);
        b
    }

    fn view(&self, node: Handle) -> NodeView<'_, K, V> {
        NodeView::new(&self.raw, node)
    }
}

impl<K, V, C: Compare<K>> SearchTree<K, V> for AvlTree<K, V, C> {
    fn strategy(&self) -> Strategy {
        Strategy::Avl
    }

    fn len(&self) -> usize {
        self.raw.len
    }

    fn search(&mut self, key: &K) -> Lookup<'_, K, V> {
        match self.raw.probe(&self.comparator, key) {
            Probe::Found(node) => Lookup::Found {
                node: self.view(node),
                index: 0,
            },
            miss => Lookup::Missing(miss.hot().map(|hot| self.view(hot))),
        }
    }

    fn insert(&mut self, key: K, data: V) -> Result<NodeView<'_, K, V>> {
        let Probe::Missing { link } = self.raw.probe(&self.comparator, &key) else {
            return Err(Error::DuplicateKey);
        };
        let node = self.raw.insert_at(link, key, data);

        let mut ancestor = self.raw.parent(node);
        while let Some(g) = ancestor {
            if !self.is_balanced(g) {
                // One reconstruction restores the height the subtree had
                // before the insertion, so nothing above changes.
                self.rebalance_at(g);
                break;
            }
            self.update_height(g);
            ancestor = self.raw.parent(g);
        }

        Ok(self.view(node))
    }

    fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let Probe::Found(node) = self.raw.probe(&self.comparator, key) else {
            return None;
        };
        let removed = self.raw.remove_at(node);

        let mut ancestor = removed.hot;
        while let Some(mut g) = ancestor {
            if self.is_balanced(g) {
                self.update_height(g);
            } else {
                g = self.rebalance_at(g);
            }
            ancestor = self.raw.parent(g);
        }

        Some((removed.key, removed.data))
    }

    fn root(&self) -> Option<NodeView<'_, K, V>> {
        self.raw.root.map(|root| self.view(root))
    }

    fn walk(&self, order: WalkOrder, visit: &mut dyn FnMut(NodeView<'_, K, V>)) -> Result<()> {
        self.raw.walk(order, |node| visit(self.view(node)));
        Ok(())
    }

    fn clear(&mut self) {
        self.raw.clear();
    }

    fn validate(&self) -> Result<()> {
        self.raw.validate_shape(&self.comparator)?;

        let mut error = None;
        self.raw.walk(WalkOrder::PostOrder, |node| {
            if error.is_some() {
                return;
            }
            let (left, right) = (self.stature(self.raw.left(node)), self.stature(self.raw.right(node)));
            let stored = self.raw.aux(node).0;
            if stored != 1 + left.max(right) {
                error = Some(violation(alloc::format!("{node:?} stores height {stored}, children have {left} and {right}")));
            } else if (left - right).abs() > 1 {
                error = Some(violation(alloc::format!("{node:?} is out of balance ({left} vs {right})")));
            }
        });
        error.map_or(Ok(()), Err)
    }
}

impl<K: fmt::Debug, V, C> fmt::Debug for AvlTree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_set();
        self.raw.walk(WalkOrder::InOrder, |node| {
            keys.entry(self.raw.key(node));
        });
        keys.finish()
    }
}
