//! Key ordering.
//!
//! Every tree is parameterised over one key type and one comparator, so keys
//! that cannot be ordered against each other never reach a tree.

use core::cmp::Ordering;

/// A total order over keys of type `K`.
///
/// Implementations must be consistent: `compare(a, b)` is the reverse of
/// `compare(b, a)`, and the relation must be transitive. A comparator that
/// breaks these rules leaves the tree in an unspecified (but memory-safe)
/// state.
///
/// Closures of the shape `Fn(&K, &K) -> Ordering` are comparators:
///
/// ```
/// use balance_tree::{AvlTree, SearchTree};
///
/// let mut tree = AvlTree::with_comparator(|a: &i32, b: &i32| b.cmp(a));
/// for key in [1, 2, 3] {
///     tree.insert(key, ()).unwrap();
/// }
///
/// let mut keys = Vec::new();
/// tree.walk(balance_tree::WalkOrder::InOrder, &mut |node| keys.push(*node.key())).unwrap();
/// assert_eq!(keys, [3, 2, 1]);
/// ```
pub trait Compare<K: ?Sized> {
    /// Three-way comparison of `a` against `b`.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// The key type's own [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Natural;

impl<K: Ord + ?Sized> Compare<K> for Natural {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: ?Sized, F> Compare<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}
