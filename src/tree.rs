//! The contract shared by every balancing strategy.

use crate::config::{Strategy, WalkOrder};
use crate::error::Result;
use crate::view::{Lookup, NodeView};

/// An ordered key/payload store with unique keys.
///
/// All four strategies implement this trait and it is object safe, so a
/// [`Registry`](crate::Registry) can hand out `Box<dyn SearchTree<K, V>>`
/// without the caller knowing which one it got.
///
/// `search` takes `&mut self` because a splay tree restructures itself on
/// every lookup.
pub trait SearchTree<K, V> {
    /// Which strategy backs this tree.
    fn strategy(&self) -> Strategy;

    /// Number of stored keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up `key`.
    ///
    /// On a miss the returned [`Lookup::Missing`] carries the last node
    /// visited (the would-be parent), which is `None` only for an empty tree.
    fn search(&mut self, key: &K) -> Lookup<'_, K, V>;

    /// Inserts a new key.
    ///
    /// Returns the node that holds the key once rebalancing has finished.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateKey`](crate::Error::DuplicateKey) if the key is
    /// already present; the tree is left unchanged.
    fn insert(&mut self, key: K, data: V) -> Result<NodeView<'_, K, V>>;

    /// Removes `key` and returns the stored pair, or `None` if it was absent.
    fn remove_entry(&mut self, key: &K) -> Option<(K, V)>;

    /// Removes `key`. Returns `false` if it was absent.
    fn remove(&mut self, key: &K) -> bool {
        self.remove_entry(key).is_some()
    }

    fn contains_key(&mut self, key: &K) -> bool {
        self.search(key).is_found()
    }

    /// Payload stored under `key`.
    fn get<'a>(&'a mut self, key: &K) -> Option<&'a V>
    where
        K: 'a,
    {
        self.search(key).value()
    }

    fn root(&self) -> Option<NodeView<'_, K, V>>;

    /// Calls `visit` on every node in `order`.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedWalkOrder`](crate::Error::UnsupportedWalkOrder) if
    /// the strategy cannot traverse in `order`. B-trees only walk level order.
    fn walk(&self, order: WalkOrder, visit: &mut dyn FnMut(NodeView<'_, K, V>)) -> Result<()>;

    /// Drops every entry.
    fn clear(&mut self);

    /// Audits every structural invariant of the strategy.
    ///
    /// # Errors
    ///
    /// [`Error::InvariantViolation`](crate::Error::InvariantViolation)
    /// describing the first broken property found.
    fn validate(&self) -> Result<()>;
}
