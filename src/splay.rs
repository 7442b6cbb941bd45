//! Self-adjusting binary search tree.

use core::fmt;

use crate::compare::{Compare, Natural};
use crate::config::{Strategy, TreeConfig, WalkOrder};
use crate::error::{Error, Result};
use crate::raw::{Handle, Link, Probe, RawBinaryTree};
use crate::tree::SearchTree;
use crate::view::{Lookup, NodeView};

/// A splay tree.
///
/// Every access moves the last node it touched to the root, two levels per
/// step, which gives amortized logarithmic cost without a balance field.
/// Lookups therefore restructure the tree.
pub struct SplayTree<K, V, C = Natural> {
    raw: RawBinaryTree<K, V, ()>,
    comparator: C,
}

impl<K: Ord, V> SplayTree<K, V> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: RawBinaryTree::new(),
            comparator: Natural,
        }
    }
}

impl<K: Ord, V> Default for SplayTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Compare<K>> SplayTree<K, V, C> {
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

    /// Moves `v` to the root.
    fn splay(&mut self, v: Handle) {
        let raw = &mut self.raw;
        while let Some(p) = raw.parent(v) {
            let Some(g) = raw.parent(p) else {
                tracing::trace!(?v, ?p, "splay: single step");
                if raw.is_left_child(v) {
                    raw.attach_left(p, raw.right(v));
                    raw.attach_right(v, Some(p));
                } else {
                    raw.attach_right(p, raw.left(v));
                    raw.attach_left(v, Some(p));
                }
                raw.attach(Link::Root, Some(v));
                break;
            };

            tracing::trace!(?v, ?p, ?g, "splay: double step");
            let above = raw.link_of(g);
            match (raw.is_left_child(v), raw.is_left_child(p)) {
                (true, true) => {
                    raw.attach_left(g, raw.right(p));
                    raw.attach_left(p, raw.right(v));
                    raw.attach_right(p, Some(g));
                    raw.attach_right(v, Some(p));
                }
                (true, false) => {
                    raw.attach_left(p, raw.right(v));
                    raw.attach_right(g, raw.left(v));
                    raw.attach_left(v, Some(g));
                    raw.attach_right(v, Some(p));
                }
                (false, true) => {
                    raw.attach_right(p, raw.left(v));
                    raw.attach_left(g, raw.right(v));
                    raw.attach_right(v, Some(g));
                    raw.attach_left(v, Some(p));
                }
                (false, false) => {
                    raw.attach_right(g, raw.left(p));
                    raw.attach_right(p, raw.left(v));
                    raw.attach_left(p, Some(g));
                    raw.attach_left(v, Some(p));
                }
            }
            raw.attach(above, Some(v));
        }
    }

    /// Descends towards `key` and splays the last node visited.
    fn access(&mut self, key: &K) -> Probe {
        let probe = self.raw.probe(&self.comparator, key);
        if let Some(hot) = probe.hot() {
            self.splay(hot);
        }
        probe
    }

    fn view(&self, node: Handle) -> NodeView<'_, K, V> {
        NodeView::new(&self.raw, node)
    }
}

impl<K, V, C: Compare<K>> SearchTree<K, V> for SplayTree<K, V, C> {
    fn strategy(&self) -> Strategy {
        Strategy::Splay
    }

    fn len(&self) -> usize {
        self.raw.len
    }

    fn search(&mut self, key: &K) -> Lookup<'_, K, V> {
        match self.access(key) {
            Probe::Found(node) => Lookup::Found {
                node: self.view(node),
                index: 0,
            },
            Probe::Missing { .. } => Lookup::Missing(self.raw.root.map(|root| self.view(root))),
        }
    }

    fn insert(&mut self, key: K, data: V) -> Result<NodeView<'_, K, V>> {
        let link = match self.access(&key) {
            Probe::Found(_) => return Err(Error::DuplicateKey),
            Probe::Missing { link } => link,
        };

        let node = self.raw.alloc(key, data);
        self.raw.len += 1;
        match link {
            Link::Root => {}
            // `top` was splayed to the root above; the new node replaces it
            // there and takes over its subtree on the far side.
            Link::Left(top) => {
                let below = self.raw.left(top);
                self.raw.attach_left(top, None);
                self.raw.attach_left(node, below);
                self.raw.attach_right(node, Some(top));
            }
            Link::Right(top) => {
                let below = self.raw.right(top);
                self.raw.attach_right(top, None);
                self.raw.attach_right(node, below);
                self.raw.attach_left(node, Some(top));
            }
        }
        self.raw.attach(Link::Root, Some(node));
        Ok(self.view(node))
    }

    fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let Probe::Found(node) = self.access(key) else {
            return None;
        };

        match (self.raw.left(node), self.raw.right(node)) {
            (None, only) | (only, None) => self.raw.attach(Link::Root, only),
            (Some(left), Some(right)) => {
                self.raw.attach(Link::Root, Some(right));
                // The removed key is below everything in `right`, so its
                // access would end at the minimum, which has no left child.
                let min = self.raw.leftmost(right);
                self.splay(min);
                self.raw.attach_left(min, Some(left));
            }
        }

        let removed = self.raw.release(node);
        self.raw.len -= 1;
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
        self.raw.validate_shape(&self.comparator)
    }
}

impl<K: fmt::Debug, V, C> fmt::Debug for SplayTree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_set();
        self.raw.walk(WalkOrder::InOrder, |node| {
            keys.entry(self.raw.key(node));
        });
        keys.finish()
    }
}
