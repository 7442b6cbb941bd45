//! Color-balanced binary search tree.
//!
//! Each node stores its color and its black height minus one, so a black leaf
//! stores 0 and a red leaf -1, and an absent child counts as a black node of
//! height -1. The repairs follow the usual case table:
//!
//! | case  | situation after the structural change              | repair                                   |
//! |-------|-----------------------------------------------------|------------------------------------------|
//! | RR-1  | red node, red parent, black uncle                    | one reconstruction, top black, sides red |
//! | RR-2  | red node, red parent, red uncle                      | recolor, continue at the grandparent     |
//! | BB-1  | short side, black sibling with a red child           | one reconstruction, top inherits color   |
//! | BB-2R | short side, black sibling, black children, red parent | recolor sibling and parent               |
//! | BB-2B | as BB-2R with a black parent                         | recolor sibling, continue at the parent  |
//! | BB-3  | short side, red sibling                              | rotate the sibling up, retry             |

use core::fmt;

use crate::compare::{Compare, Natural};
use crate::config::{Strategy, TreeConfig, WalkOrder};
use crate::error::{Error, Result};
use crate::raw::{Annotation, Handle, Probe, RawBinaryTree, Triple, violation};
use crate::tree::SearchTree;
use crate::view::{Balance, Color, Lookup, NodeView};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Mark {
    color: Color,
    height: i32,
}

impl Annotation for Mark {
    fn leaf() -> Self {
        Mark {
            color: Color::Red,
            height: -1,
        }
    }

    fn balance(self) -> Balance {
        Balance::RedBlack {
            color: self.color,
            height: self.height,
        }
    }
}

const ABSENT: Mark = Mark {
    color: Color::Black,
    height: -1,
};

/// A red-black tree.
///
/// No red node has a red child, every root-to-leaf path crosses the same
/// number of black nodes, and the root is black.
pub struct RedBlackTree<K, V, C = Natural> {
    raw: RawBinaryTree<K, V, Mark>,
    comparator: C,
}

impl<K: Ord, V> RedBlackTree<K, V> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: RawBinaryTree::new(),
            comparator: Natural,
        }
    }
}

impl<K: Ord, V> Default for RedBlackTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Compare<K>> RedBlackTree<K, V, C> {
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

    fn mark(&self, node: Option<Handle>) -> Mark {
        self.raw.aux_or(node, ABSENT)
    }

    fn is_black(&self, node: Option<Handle>) -> bool {
        self.mark(node).color == Color::Black
    }

    fn is_red(&self, node: Option<Handle>) -> bool {
        !self.is_black(node)
    }

    fn paint(&mut self, node: Handle, color: Color) {
        let Mark { height, .. } = self.raw.aux(node);
        self.raw.set_aux(node, Mark { color, height });
    }

    fn shift_height(&mut self, node: Handle, delta: i32) {
        let Mark { color, height } = self.raw.aux(node);
        self.raw.set_aux(node, Mark { color, height: height + delta });
    }

    fn child_heights(&self, node: Handle) -> (i32, i32) {
        (self.mark(self.raw.left(node)).height, self.mark(self.raw.right(node)).height)
    }

    fn update_height(&mut self, node: Handle) {
        let (left, right) = self.child_heights(node);
        let mut height = left.max(right);
        if self.is_black(Some(node)) {
            height += 1;
        }
        self.shift_height(node, height - self.raw.aux(node).height);
    }

    /// Both children agree on black height and `node` stores the matching value.
    fn black_height_ok(&self, node: Handle) -> bool {
        let (left, right) = self.child_heights(node);
        let expected = if self.is_red(Some(node)) { left } else { left + 1 };
        left == right && self.raw.aux(node).height == expected
    }

    fn solve_double_red(&mut self, mut x: Handle) {
        loop {
            let Some(p) = self.raw.parent(x) else {
                self.paint(x, Color::Black);
                self.shift_height(x, 1);
                return;
            };
            if self.is_black(Some(p)) {
                return;
            }
            let g = self
                .raw
                .parent(p)
                .expect("`RedBlackTree::solve_double_red()` - red node at the root");

            match self.raw.sibling(p) {
                Some(u) if self.is_red(Some(u)) => {
                    tracing::trace!(?x, ?g, "double red, red uncle: recoloring");
                    self.paint(p, Color::Black);
                    self.shift_height(p, 1);
                    self.paint(u, Color::Black);
                    self.shift_height(u, 1);
                    if self.raw.parent(g).is_some() {
                        self.paint(g, Color::Red);
                    }
                    x = g;
                }
                _ => {
                    tracing::trace!(?x, ?g, "double red, black uncle: restructuring");
                    let Triple { a, b, c } = self.raw.rotate_at(x);
                    self.paint(a, Color::Red);
                    self.paint(c, Color::Red);
                    self.paint(b, Color::Black);
                    self.update_height(a);
                    self.update_height(c);
                    self.update_height(b);
                    return;
                }
            }
        }
    }

    /// Restores black heights after a black node left the tree.
    ///
    /// `r` is the subtree one black node short; when it is empty, `hot` names
    /// its parent.
    fn solve_double_black(&mut self, r: Option<Handle>, mut hot: Handle) {
        let mut r = r;
        loop {
            let Some(p) = r.map_or(Some(hot), |r| self.raw.parent(r)) else {
                return;
            };
            let s = if r == self.raw.left(p) { self.raw.right(p) } else { self.raw.left(p) };
            let s = s.expect("`RedBlackTree::solve_double_black()` - short subtree without sibling");

            if self.is_red(Some(s)) {
                tracing::trace!(?p, ?s, "double black, red sibling: rotating sibling up");
                self.paint(s, Color::Black);
                self.paint(p, Color::Red);
                let t = if self.raw.is_left_child(s) { self.raw.left(s) } else { self.raw.right(s) };
                let t = t.expect("`RedBlackTree::solve_double_black()` - red sibling without children");
                let Triple { a, b, c } = self.raw.rotate_at(t);
                self.update_height(a);
                self.update_height(c);
                self.update_height(b);
                hot = p;
                continue;
            }

            let red_nephew = [self.raw.left(s), self.raw.right(s)]
                .into_iter()
                .flatten()
                .find(|&t| self.is_red(Some(t)));
            if let Some(t) = red_nephew {
                tracing::trace!(?p, ?t, "double black, red nephew: restructuring");
                let color = self.raw.aux(p).color;
                let Triple { a, b, c } = self.raw.rotate_at(t);
                self.paint(a, Color::Black);
                self.update_height(a);
                self.paint(c, Color::Black);
                self.update_height(c);
                self.paint(b, color);
                self.update_height(b);
                return;
            }

            self.paint(s, Color::Red);
            self.shift_height(s, -1);
            if self.is_red(Some(p)) {
                tracing::trace!(?p, "double black, black nephews, red parent: recoloring");
                self.paint(p, Color::Black);
                return;
            }
            tracing::trace!(?p, "double black, black nephews, black parent: moving up");
            self.shift_height(p, -1);
            r = Some(p);
        }
    }

    fn view(&self, node: Handle) -> NodeView<'_, K, V> {
        NodeView::new(&self.raw, node)
    }
}

impl<K, V, C: Compare<K>> SearchTree<K, V> for RedBlackTree<K, V, C> {
    fn strategy(&self) -> Strategy {
        Strategy::RedBlack
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
        self.solve_double_red(node);
        Ok(self.view(node))
    }

    fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let Probe::Found(node) = self.raw.probe(&self.comparator, key) else {
            return None;
        };
        let removed = self.raw.remove_at(node);
        let entry = Some((removed.key, removed.data));

        let Some(root) = self.raw.root else {
            return entry;
        };
        match (removed.hot, removed.replacement) {
            (None, _) => {
                self.paint(root, Color::Black);
                self.update_height(root);
            }
            (Some(hot), _) if self.black_height_ok(hot) => {}
            (Some(_), Some(r)) if self.is_red(Some(r)) => {
                self.paint(r, Color::Black);
                self.shift_height(r, 1);
            }
            (Some(hot), r) => self.solve_double_black(r, hot),
        }
        entry
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
        if let Some(root) = self.raw.root
            && self.is_red(Some(root))
        {
            return Err(violation("root is red"));
        }

        let mut error = None;
        self.raw.walk(WalkOrder::PostOrder, |node| {
            if error.is_some() {
                return;
            }
            if self.is_red(Some(node)) && (self.is_red(self.raw.left(node)) || self.is_red(self.raw.right(node))) {
                error = Some(violation(alloc::format!("red node {node:?} has a red child")));
            } else if !self.black_height_ok(node) {
                let (left, right) = self.child_heights(node);
                error = Some(violation(alloc::format!(
                    "{node:?} stores black height {}, children have {left} and {right}",
                    self.raw.aux(node).height
                )));
            }
        });
        error.map_or(Ok(()), Err)
    }
}

impl<K: fmt::Debug, V, C> fmt::Debug for RedBlackTree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_set();
        self.raw.walk(WalkOrder::InOrder, |node| {
            keys.entry(self.raw.key(node));
        });
        keys.finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::testing::{op_strategy, replay, walk_keys};
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn root_balance<V>(tree: &RedBlackTree<i32, V>) -> Option<Balance> {
        tree.root().map(|root| root.balance())
    }

    #[test]
    fn twenty_ascending_keys_then_removals() {
        let mut tree = RedBlackTree::new();
        for key in 0..20 {
            tree.insert(key, key).unwrap();
            tree.validate().unwrap();
        }
        assert!(matches!(root_balance(&tree), Some(Balance::RedBlack { color: Color::Black, .. })));

        for key in [8, 11, 13, 7] {
            assert!(tree.remove(&key));
            tree.validate().unwrap();
        }
        assert_eq!(tree.len(), 16);
        let expected: Vec<i32> = (0..20).filter(|key| ![7, 8, 11, 13].contains(key)).collect();
        assert_eq!(walk_keys(&tree, WalkOrder::InOrder), expected);
    }

    #[test]
    fn first_insert_is_a_black_root() {
        let mut tree = RedBlackTree::new();
        let node = tree.insert(1, ()).unwrap();
        assert_eq!(
            node.balance(),
            Balance::RedBlack {
                color: Color::Black,
                height: 0
            }
        );
    }

    #[test]
    fn red_uncle_recolors() {
        let mut tree = RedBlackTree::new();
        for key in [20, 10, 30] {
            tree.insert(key, ()).unwrap();
        }
        let node = tree.insert(5, ()).unwrap();
        assert_eq!(
            node.balance(),
            Balance::RedBlack {
                color: Color::Red,
                height: -1
            }
        );
        let root = tree.root().unwrap();
        assert_eq!(*root.key(), 20);
        assert_eq!(
            root.balance(),
            Balance::RedBlack {
                color: Color::Black,
                height: 1
            }
        );
        for child in root.children() {
            assert!(matches!(child.balance(), Balance::RedBlack { color: Color::Black, height: 0 }));
        }
    }

    #[test]
    fn emptying_and_refilling() {
        let mut tree = RedBlackTree::new();
        for key in 0..64 {
            tree.insert(key, key).unwrap();
        }
        for key in (0..64).rev() {
            assert_eq!(tree.remove_entry(&key), Some((key, key)));
            tree.validate().unwrap();
        }
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        tree.insert(3, 3).unwrap();
        tree.validate().unwrap();
    }

    #[test]
    fn removing_root_with_one_child() {
        let mut tree = RedBlackTree::new();
        tree.insert(1, ()).unwrap();
        tree.insert(2, ()).unwrap();
        assert!(tree.remove(&1));
        tree.validate().unwrap();
        assert_eq!(tree.root().map(|root| *root.key()), Some(2));
        assert_eq!(
            root_balance(&tree),
            Some(Balance::RedBlack {
                color: Color::Black,
                height: 0
            })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn random_operations_keep_invariants(ops in prop::collection::vec(op_strategy(), 0..300)) {
            let mut tree: RedBlackTree<i32, i32> = RedBlackTree::new();
            replay(&mut tree, &ops)?;
        }
    }
}
