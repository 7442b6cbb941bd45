//! Read-only access to tree nodes.
//!
//! Every strategy hands out [`NodeView`]s instead of references to its
//! internal node type. A view borrows the tree, so it cannot outlive the next
//! mutation.

use core::fmt;

use smallvec::SmallVec;

use crate::raw::Handle;

/// Color of a red-black node.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Color {
    /// Freshly inserted nodes are red.
    #[default]
    Red,
    Black,
}

/// Balance bookkeeping stored on a node, as seen from outside the tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Balance {
    /// Splay nodes carry no balance field.
    Unannotated,
    /// AVL height: a leaf is 0, an absent child counts as -1.
    Height(i32),
    /// Red-black color and black height minus one (absent children count as -1).
    RedBlack { color: Color, height: i32 },
    /// B-tree nodes balance by occupancy, not by a stored field.
    Multiway,
}

/// Node storage a [`NodeView`] reads through.
///
/// Binary trees expose two child slots (left = 0, right = 1) that may be empty;
/// B-tree nodes expose `keys + 1` occupied slots, or none for a leaf.
pub(crate) trait NodeSource<K, V> {
    fn keys(&self, node: Handle) -> &[K];
    fn values(&self, node: Handle) -> &[V];
    fn parent(&self, node: Handle) -> Option<Handle>;
    fn child_slots(&self, node: Handle) -> usize;
    fn child(&self, node: Handle, slot: usize) -> Option<Handle>;
    fn balance(&self, node: Handle) -> Balance;
}

/// Opaque node identity, stable until the node is removed.
///
/// Useful for checking that two views refer to the same node, e.g. that a
/// splayed node ended up at the root.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(Handle);

/// A borrowed, read-only view of one tree node.
pub struct NodeView<'a, K, V> {
    source: &'a dyn NodeSource<K, V>,
    handle: Handle,
}

impl<K, V> Clone for NodeView<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeView<'_, K, V> {}

impl<'a, K, V> NodeView<'a, K, V> {
    pub(crate) fn new(source: &'a dyn NodeSource<K, V>, handle: Handle) -> Self {
        Self { source, handle }
    }

    fn at(&self, handle: Option<Handle>) -> Option<Self> {
        handle.map(|handle| Self::new(self.source, handle))
    }

    /// Identity of the underlying node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        NodeId(self.handle)
    }

    /// The node's first (for binary nodes: only) key.
    ///
    /// # Panics
    ///
    /// Panics on a B-tree node without keys, which only a corrupted tree holds.
    #[must_use]
    pub fn key(&self) -> &'a K {
        &self.source.keys(self.handle)[0]
    }

    /// All keys stored in the node, ascending.
    #[must_use]
    pub fn keys(&self) -> &'a [K] {
        self.source.keys(self.handle)
    }

    /// Payload of the first key.
    ///
    /// # Panics
    ///
    /// Panics on a B-tree node without keys.
    #[must_use]
    pub fn data(&self) -> &'a V {
        &self.source.values(self.handle)[0]
    }

    /// Payloads parallel to [`keys`](Self::keys).
    #[must_use]
    pub fn values(&self) -> &'a [V] {
        self.source.values(self.handle)
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.at(self.source.parent(self.handle))
    }

    /// Child in `slot`, if present. Binary nodes use slot 0 (left) and 1 (right).
    #[must_use]
    pub fn child(&self, slot: usize) -> Option<Self> {
        self.at(self.source.child(self.handle, slot))
    }

    #[must_use]
    pub fn left(&self) -> Option<Self> {
        self.child(0)
    }

    #[must_use]
    pub fn right(&self) -> Option<Self> {
        self.child(1)
    }

    #[must_use]
    pub fn has_left(&self) -> bool {
        self.source.child(self.handle, 0).is_some()
    }

    #[must_use]
    pub fn has_right(&self) -> bool {
        self.source.child(self.handle, 1).is_some()
    }

    /// Present children, left to right.
    pub fn children(&self) -> impl Iterator<Item = NodeView<'a, K, V>> + use<'a, K, V> {
        let (source, handle) = (self.source, self.handle);
        (0..source.child_slots(handle))
            .filter_map(move |slot| source.child(handle, slot).map(|child| NodeView::new(source, child)))
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children().next().is_none()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.source.parent(self.handle).is_none()
    }

    #[must_use]
    pub fn balance(&self) -> Balance {
        self.source.balance(self.handle)
    }

    /// Number of edges between this node and the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.source.parent(self.handle);
        while let Some(parent) = current {
            depth += 1;
            current = self.source.parent(parent);
        }
        depth
    }

    /// Number of keys stored in the subtree rooted here.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        let mut total = 0;
        let mut pending: SmallVec<[Handle; 32]> = SmallVec::new();
        pending.push(self.handle);
        while let Some(node) = pending.pop() {
            total += self.source.keys(node).len();
            pending.extend((0..self.source.child_slots(node)).filter_map(|slot| self.source.child(node, slot)));
        }
        total
    }
}

impl<K: fmt::Debug, V> fmt::Debug for NodeView<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeView")
            .field("id", &self.handle)
            .field("keys", &self.keys())
            .field("balance", &self.balance())
            .finish()
    }
}

/// Outcome of [`SearchTree::search`](crate::SearchTree::search).
#[derive(Debug)]
pub enum Lookup<'a, K, V> {
    /// The key is stored at `keys()[index]` of `node` (index is 0 for binary nodes).
    Found { node: NodeView<'a, K, V>, index: usize },
    /// The key is absent. Holds the last node visited, the parent a new node
    /// would get; `None` only when the tree is empty.
    Missing(Option<NodeView<'a, K, V>>),
}

impl<'a, K, V> Lookup<'a, K, V> {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found { .. })
    }

    /// The matching node on a hit, the last visited node on a miss.
    #[must_use]
    pub fn node(&self) -> Option<NodeView<'a, K, V>> {
        match self {
            Lookup::Found { node, .. } => Some(*node),
            Lookup::Missing(hot) => *hot,
        }
    }

    /// Stored key and payload on a hit.
    #[must_use]
    pub fn entry(&self) -> Option<(&'a K, &'a V)> {
        match self {
            Lookup::Found { node, index } => Some((&node.keys()[*index], &node.values()[*index])),
            Lookup::Missing(_) => None,
        }
    }

    /// Stored payload on a hit.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.entry().map(|(_, value)| value)
    }
}
