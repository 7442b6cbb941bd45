//! Plain binary-search-tree search, insertion and removal.
//!
//! Balanced strategies run these first and then repair from the node the
//! operation touched last (its "hot" node).

use core::cmp::Ordering;
use core::mem;

use alloc::format;
use alloc::string::String;

use super::binary::{Annotation, Link, RawBinaryTree};
use super::handle::Handle;
use crate::compare::Compare;
use crate::config::WalkOrder;
use crate::error::{Error, Result};

/// Result of descending from the root towards a key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Probe {
    Found(Handle),
    /// The key is absent; `link` is the empty edge it would hang from.
    Missing { link: Link },
}

impl Probe {
    /// Last node visited: the match, or the parent of the empty edge.
    pub(crate) fn hot(self) -> Option<Handle> {
        match self {
            Probe::Found(node) => Some(node),
            Probe::Missing { link: Link::Root } => None,
            Probe::Missing {
                link: Link::Left(parent) | Link::Right(parent),
            } => Some(parent),
        }
    }
}

/// A node unlinked by [`RawBinaryTree::remove_at`].
pub(crate) struct Removed<K, V> {
    /// Parent of the node that physically left the tree.
    pub(crate) hot: Option<Handle>,
    /// Subtree that took the vacated place.
    pub(crate) replacement: Option<Handle>,
    pub(crate) key: K,
    pub(crate) data: V,
}

impl<K, V, A: Annotation> RawBinaryTree<K, V, A> {
    /// Standard descent from the root.
    pub(crate) fn probe<C: Compare<K>>(&self, comparator: &C, key: &K) -> Probe {
        let mut link = Link::Root;
        let mut current = self.root;
        while let Some(node) = current {
            match comparator.compare(key, self.key(node)) {
                Ordering::Less => {
                    link = Link::Left(node);
                    current = self.left(node);
                }
                Ordering::Greater => {
                    link = Link::Right(node);
                    current = self.right(node);
                }
                Ordering::Equal => return Probe::Found(node),
            }
        }
        Probe::Missing { link }
    }

    /// Hangs a new leaf from an empty edge found by [`probe`](Self::probe).
    pub(crate) fn insert_at(&mut self, link: Link, key: K, data: V) -> Handle {
        let node = self.alloc(key, data);
        self.attach(link, Some(node));
        self.len += 1;
        node
    }

    /// Unlinks `node` the textbook way.
    ///
    /// A node with two children trades its entry with its in-order successor,
    /// which is then removed in its place; `node` itself stays in the tree
    /// holding the successor's entry.
    pub(crate) fn remove_at(&mut self, node: Handle) -> Removed<K, V> {
        let victim = match (self.left(node), self.right(node)) {
            (Some(_), Some(right)) => self.leftmost(right),
            _ => node,
        };

        let link = self.link_of(victim);
        let replacement = match self.left(victim) {
            None => self.right(victim),
            Some(left) => {
                debug_assert!(self.right(victim).is_none());
                Some(left)
            }
        };
        self.attach(link, replacement);
        let hot = match link {
            Link::Root => None,
            Link::Left(parent) | Link::Right(parent) => Some(parent),
        };

        let mut released = self.release(victim);
        if victim != node {
            let kept = self.node_mut(node);
            mem::swap(&mut kept.key, &mut released.key);
            mem::swap(&mut kept.data, &mut released.data);
        }
        self.len -= 1;

        Removed {
            hot,
            replacement,
            key: released.key,
            data: released.data,
        }
    }

    /// Checks the properties every binary strategy shares: strictly ascending
    /// in-order keys, back links that mirror the child links, and a node count
    /// equal to `len`.
    pub(crate) fn validate_shape<C: Compare<K>>(&self, comparator: &C) -> Result<()> {
        if let Some(root) = self.root
            && self.parent(root).is_some()
        {
            return Err(violation("root has a parent link"));
        }

        let mut count = 0;
        let mut previous: Option<Handle> = None;
        let mut error = None;
        self.walk(WalkOrder::InOrder, |node| {
            count += 1;
            if error.is_some() {
                return;
            }
            for child in [self.left(node), self.right(node)].into_iter().flatten() {
                if self.parent(child) != Some(node) {
                    error = Some(violation(format!("child {child:?} of {node:?} links to another parent")));
                }
            }
            if let Some(previous) = previous
                && comparator.compare(self.key(previous), self.key(node)) != Ordering::Less
            {
                error = Some(violation(format!("keys out of order at {node:?}")));
            }
            previous = Some(node);
        });

        if let Some(error) = error {
            return Err(error);
        }
        if count != self.len {
            return Err(violation(format!("{count} nodes reachable but len is {}", self.len)));
        }
        if self.live_nodes() != self.len {
            return Err(violation(format!("{} nodes allocated but len is {}", self.live_nodes(), self.len)));
        }
        Ok(())
    }
}

pub(crate) fn violation(message: impl Into<String>) -> Error {
    let message = message.into();
    tracing::debug!(%message, "invariant check failed");
    Error::InvariantViolation(message)
}
