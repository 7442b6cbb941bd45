use alloc::collections::VecDeque;
use core::slice;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use crate::config::WalkOrder;
use crate::view::{Balance, NodeSource};

/// Per-node balance field of a binary strategy.
pub(crate) trait Annotation: Copy {
    /// Value given to a freshly inserted leaf.
    fn leaf() -> Self;

    fn balance(self) -> Balance;
}

impl Annotation for () {
    fn leaf() -> Self {}

    fn balance(self) -> Balance {
        Balance::Unannotated
    }
}

pub(crate) struct BinaryNode<K, V, A> {
    pub(crate) key: K,
    pub(crate) data: V,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    // Lookup link only; ownership runs through `left`/`right`.
    pub(crate) parent: Option<Handle>,
    pub(crate) aux: A,
}

/// The three nodes of a 3+4 reconstruction, in ascending key order.
///
/// `b` is the new local root, `a` and `c` its children.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Triple {
    pub(crate) a: Handle,
    pub(crate) b: Handle,
    pub(crate) c: Handle,
}

/// Where a node hangs: the edge that owns it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Link {
    Root,
    Left(Handle),
    Right(Handle),
}

/// Arena-backed binary tree shared by the AVL, red-black and splay strategies.
///
/// Owns the nodes, the root handle and the element count. Knows nothing about
/// balancing: strategies drive it through the link helpers and [`rotate_at`].
///
/// [`rotate_at`]: RawBinaryTree::rotate_at
pub(crate) struct RawBinaryTree<K, V, A> {
    nodes: Arena<BinaryNode<K, V, A>>,
    pub(crate) root: Option<Handle>,
    pub(crate) len: usize,
}

impl<K, V, A: Annotation> RawBinaryTree<K, V, A> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Allocates a detached node.
    pub(crate) fn alloc(&mut self, key: K, data: V) -> Handle {
        self.nodes.alloc(BinaryNode {
            key,
            data,
            left: None,
            right: None,
            parent: None,
            aux: A::leaf(),
        })
    }

    /// Nodes currently allocated, linked or not.
    pub(crate) fn live_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Releases a node that is no longer linked into the tree.
    pub(crate) fn release(&mut self, node: Handle) -> BinaryNode<K, V, A> {
        self.nodes.take(node)
    }

    #[inline]
    pub(crate) fn node(&self, node: Handle) -> &BinaryNode<K, V, A> {
        self.nodes.get(node)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, node: Handle) -> &mut BinaryNode<K, V, A> {
        self.nodes.get_mut(node)
    }

    #[inline]
    pub(crate) fn key(&self, node: Handle) -> &K {
        &self.nodes.get(node).key
    }

    #[inline]
    pub(crate) fn left(&self, node: Handle) -> Option<Handle> {
        self.nodes.get(node).left
    }

    #[inline]
    pub(crate) fn right(&self, node: Handle) -> Option<Handle> {
        self.nodes.get(node).right
    }

    #[inline]
    pub(crate) fn parent(&self, node: Handle) -> Option<Handle> {
        self.nodes.get(node).parent
    }

    #[inline]
    pub(crate) fn aux(&self, node: Handle) -> A {
        self.nodes.get(node).aux
    }

    /// Annotation of an optional child; `absent` stands in for the empty edge.
    #[inline]
    pub(crate) fn aux_or(&self, node: Option<Handle>, absent: A) -> A {
        node.map_or(absent, |node| self.aux(node))
    }

    #[inline]
    pub(crate) fn set_aux(&mut self, node: Handle, aux: A) {
        self.nodes.get_mut(node).aux = aux;
    }

    pub(crate) fn is_left_child(&self, node: Handle) -> bool {
        self.parent(node).is_some_and(|parent| self.left(parent) == Some(node))
    }

    pub(crate) fn link_of(&self, node: Handle) -> Link {
        match self.parent(node) {
            None => Link::Root,
            Some(parent) if self.left(parent) == Some(node) => Link::Left(parent),
            Some(parent) => Link::Right(parent),
        }
    }

    /// The other child of `node`'s parent.
    pub(crate) fn sibling(&self, node: Handle) -> Option<Handle> {
        match self.link_of(node) {
            Link::Root => None,
            Link::Left(parent) => self.right(parent),
            Link::Right(parent) => self.left(parent),
        }
    }

    /// Makes `child` the left child of `node`, fixing the child's back link.
    pub(crate) fn attach_left(&mut self, node: Handle, child: Option<Handle>) {
        self.nodes.get_mut(node).left = child;
        if let Some(child) = child {
            self.nodes.get_mut(child).parent = Some(node);
        }
    }

    /// Makes `child` the right child of `node`, fixing the child's back link.
    pub(crate) fn attach_right(&mut self, node: Handle, child: Option<Handle>) {
        self.nodes.get_mut(node).right = child;
        if let Some(child) = child {
            self.nodes.get_mut(child).parent = Some(node);
        }
    }

    /// Hangs `child` (or nothing) from `link`, repointing the root if needed.
    pub(crate) fn attach(&mut self, link: Link, child: Option<Handle>) {
        match link {
            Link::Root => {
                self.root = child;
                if let Some(child) = child {
                    self.nodes.get_mut(child).parent = None;
                }
            }
            Link::Left(parent) => self.attach_left(parent, child),
            Link::Right(parent) => self.attach_right(parent, child),
        }
    }

    pub(crate) fn leftmost(&self, mut node: Handle) -> Handle {
        while let Some(left) = self.left(node) {
            node = left;
        }
        node
    }

    /// In-order successor of `node`.
    pub(crate) fn successor(&self, node: Handle) -> Option<Handle> {
        if let Some(right) = self.right(node) {
            return Some(self.leftmost(right));
        }
        let mut current = node;
        while let Link::Right(parent) = self.link_of(current) {
            current = parent;
        }
        self.parent(current)
    }

    /// 3+4 reconstruction around `v`, its parent and its grandparent.
    ///
    /// The three nodes are relabeled `a < b < c` and their four outer subtrees
    /// `t1 < t2 < t3 < t4`; `b` takes over the grandparent's place with `a`
    /// (owning `t1`, `t2`) and `c` (owning `t3`, `t4`) as children. All four
    /// zig/zag shapes go through this one relinking.
    ///
    /// Annotations are left stale; callers refresh `a`, `c`, then `b`.
    ///
    /// # Panics
    ///
    /// Panics if `v` has no parent or no grandparent.
    pub(crate) fn rotate_at(&mut self, v: Handle) -> Triple {
        let p = self.parent(v).expect("`RawBinaryTree::rotate_at()` - node has no parent");
        let g = self.parent(p).expect("`RawBinaryTree::rotate_at()` - node has no grandparent");
        let above = self.link_of(g);

        let (triple, outer) = match (self.is_left_child(p), self.is_left_child(v)) {
            // zig-zig
            (true, true) => (Triple { a: v, b: p, c: g }, [self.left(v), self.right(v), self.right(p), self.right(g)]),
            // zig-zag
            (true, false) => (Triple { a: p, b: v, c: g }, [self.left(p), self.left(v), self.right(v), self.right(g)]),
            // zag-zig
            (false, true) => (Triple { a: g, b: v, c: p }, [self.left(g), self.left(v), self.right(v), self.right(p)]),
            // zag-zag
            (false, false) => (Triple { a: g, b: p, c: v }, [self.left(g), self.left(p), self.left(v), self.right(v)]),
        };

        tracing::trace!(v = ?v, p = ?p, g = ?g, top = ?triple.b, "3+4 reconstruction");
        self.connect34(triple, outer);
        self.attach(above, Some(triple.b));
        triple
    }

    fn connect34(&mut self, Triple { a, b, c }: Triple, [t1, t2, t3, t4]: [Option<Handle>; 4]) {
        self.attach_left(a, t1);
        self.attach_right(a, t2);
        self.attach_left(c, t3);
        self.attach_right(c, t4);
        self.attach_left(b, Some(a));
        self.attach_right(b, Some(c));
    }

    /// Visits every node reachable from the root in `order`.
    pub(crate) fn walk(&self, order: WalkOrder, mut visit: impl FnMut(Handle)) {
        let Some(root) = self.root else {
            return;
        };

        match order {
            WalkOrder::PreOrder => {
                let mut stack: SmallVec<[Handle; 32]> = SmallVec::new();
                stack.push(root);
                while let Some(node) = stack.pop() {
                    visit(node);
                    stack.extend(self.right(node));
                    stack.extend(self.left(node));
                }
            }
            WalkOrder::InOrder => {
                let mut node = Some(self.leftmost(root));
                while let Some(current) = node {
                    visit(current);
                    node = self.successor(current);
                }
            }
            WalkOrder::PostOrder => {
                // Reverse of a root-right-left pre-order.
                let mut stack: SmallVec<[Handle; 32]> = SmallVec::new();
                let mut out: alloc::vec::Vec<Handle> = alloc::vec::Vec::with_capacity(self.len);
                stack.push(root);
                while let Some(node) = stack.pop() {
                    out.push(node);
                    stack.extend(self.left(node));
                    stack.extend(self.right(node));
                }
                out.into_iter().rev().for_each(visit);
            }
            WalkOrder::LevelOrder => {
                let mut queue = VecDeque::with_capacity(self.len);
                queue.push_back(root);
                while let Some(node) = queue.pop_front() {
                    visit(node);
                    queue.extend(self.left(node));
                    queue.extend(self.right(node));
                }
            }
        }
    }
}

impl<K, V, A: Annotation> NodeSource<K, V> for RawBinaryTree<K, V, A> {
    fn keys(&self, node: Handle) -> &[K] {
        slice::from_ref(&self.node(node).key)
    }

    fn values(&self, node: Handle) -> &[V] {
        slice::from_ref(&self.node(node).data)
    }

    fn parent(&self, node: Handle) -> Option<Handle> {
        self.node(node).parent
    }

    fn child_slots(&self, _node: Handle) -> usize {
        2
    }

    fn child(&self, node: Handle, slot: usize) -> Option<Handle> {
        match slot {
            0 => self.node(node).left,
            1 => self.node(node).right,
            _ => None,
        }
    }

    fn balance(&self, node: Handle) -> Balance {
        self.node(node).aux.balance()
    }
}
