use core::cmp::Ordering;
use core::mem;

use smallvec::SmallVec;

use crate::compare::Compare;
use crate::raw::{Arena, Handle};
use crate::view::{Balance, NodeSource};

/// Entries kept inline before a node spills to the heap; covers the default
/// order of 4 including the transient overflow entry.
const INLINE: usize = 4;

/// Result of searching one node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SearchResult {
    /// Key is at the given index.
    Found(usize),
    /// Key is absent; index of the first larger key, which is also the
    /// child to descend into.
    NotFound(usize),
}

/// A multiway node: `keys` and `values` are parallel, `children` is empty for
/// a leaf and one longer than `keys` otherwise.
pub(crate) struct BTreeNode<K, V> {
    pub(crate) keys: SmallVec<[K; INLINE]>,
    pub(crate) values: SmallVec<[V; INLINE]>,
    pub(crate) children: SmallVec<[Handle; INLINE + 1]>,
    pub(crate) parent: Option<Handle>,
}

impl<K, V> BTreeNode<K, V> {
    pub(crate) fn new_leaf(parent: Option<Handle>) -> Self {
        Self {
            keys: SmallVec::new(),
            values: SmallVec::new(),
            children: SmallVec::new(),
            parent,
        }
    }

    /// A keyless internal node over a single child, used when the root splits.
    pub(crate) fn new_root_above(child: Handle) -> Self {
        let mut node = Self::new_leaf(None);
        node.children.push(child);
        node
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Binary search with `comparator`.
    pub(crate) fn search<C: Compare<K>>(&self, comparator: &C, key: &K) -> SearchResult {
        match self.keys.binary_search_by(|probe| comparator.compare(probe, key)) {
            Ok(index) => SearchResult::Found(index),
            Err(index) => SearchResult::NotFound(index),
        }
    }

    /// Slot of `child` in `children`.
    ///
    /// # Panics
    ///
    /// Panics if `child` does not hang from this node.
    pub(crate) fn slot_of(&self, child: Handle) -> usize {
        self.children
            .iter()
            .position(|&slot| slot == child)
            .expect("`BTreeNode::slot_of()` - child not linked to its parent")
    }

    pub(crate) fn insert_entry(&mut self, index: usize, key: K, value: V) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    pub(crate) fn push_entry(&mut self, key: K, value: V) {
        self.keys.push(key);
        self.values.push(value);
    }

    pub(crate) fn remove_entry(&mut self, index: usize) -> (K, V) {
        (self.keys.remove(index), self.values.remove(index))
    }

    /// Stores a new entry at `index`, returning the one it displaced.
    pub(crate) fn replace_entry(&mut self, index: usize, key: K, value: V) -> (K, V) {
        (
            mem::replace(&mut self.keys[index], key),
            mem::replace(&mut self.values[index], value),
        )
    }

    /// Removes the last entry together with the last child, if any.
    pub(crate) fn pop_back(&mut self) -> (K, V, Option<Handle>) {
        let key = self.keys.pop().expect("`BTreeNode::pop_back()` - empty node");
        let value = self.values.pop().expect("`BTreeNode::pop_back()` - empty node");
        (key, value, self.children.pop())
    }

    /// Removes the first entry together with the first child, if any.
    pub(crate) fn pop_front(&mut self) -> (K, V, Option<Handle>) {
        let (key, value) = self.remove_entry(0);
        let child = (!self.children.is_empty()).then(|| self.children.remove(0));
        (key, value, child)
    }

    /// Splits around `keys[mid]`.
    ///
    /// `self` keeps the entries before `mid` and the children up to `mid`;
    /// the median entry and a new right sibling holding everything after it
    /// are returned. The sibling's children still point at `self`.
    pub(crate) fn split(&mut self, mid: usize) -> (K, V, Self) {
        let keys: SmallVec<[K; INLINE]> = self.keys.drain(mid + 1..).collect();
        let values: SmallVec<[V; INLINE]> = self.values.drain(mid + 1..).collect();
        let children: SmallVec<[Handle; INLINE + 1]> = if self.is_leaf() {
            SmallVec::new()
        } else {
            self.children.drain(mid + 1..).collect()
        };
        let key = self.keys.pop().expect("`BTreeNode::split()` - median missing");
        let value = self.values.pop().expect("`BTreeNode::split()` - median missing");

        let right = Self {
            keys,
            values,
            children,
            parent: self.parent,
        };
        (key, value, right)
    }

    /// Appends `separator` and all of `right`. Moved children still point at
    /// `right`'s old slot.
    pub(crate) fn absorb(&mut self, separator: (K, V), right: Self) {
        self.push_entry(separator.0, separator.1);
        self.keys.extend(right.keys);
        self.values.extend(right.values);
        self.children.extend(right.children);
    }

    /// Keys are strictly ascending under `comparator`.
    pub(crate) fn is_sorted<C: Compare<K>>(&self, comparator: &C) -> bool {
        self.keys
            .windows(2)
            .all(|pair| comparator.compare(&pair[0], &pair[1]) == Ordering::Less)
    }
}

impl<K, V> NodeSource<K, V> for Arena<BTreeNode<K, V>> {
    fn keys(&self, node: Handle) -> &[K] {
        &self.get(node).keys
    }

    fn values(&self, node: Handle) -> &[V] {
        &self.get(node).values
    }

    fn parent(&self, node: Handle) -> Option<Handle> {
        self.get(node).parent
    }

    fn child_slots(&self, node: Handle) -> usize {
        self.get(node).children.len()
    }

    fn child(&self, node: Handle, slot: usize) -> Option<Handle> {
        self.get(node).children.get(slot).copied()
    }

    fn balance(&self, _node: Handle) -> Balance {
        Balance::Multiway
    }
}
