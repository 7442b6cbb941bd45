//! Strategy tags, traversal orders and tree construction parameters.

use core::fmt;
use core::str::FromStr;

use alloc::borrow::ToOwned;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Smallest B-tree order with a meaningful split.
pub const MIN_ORDER: usize = 3;

/// Order used when a [`TreeConfig`] does not set one.
pub const DEFAULT_ORDER: usize = 4;

/// Identifies one of the balancing strategies.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Strategy {
    /// Height-balanced binary tree.
    Avl,
    /// Color-balanced binary tree.
    RedBlack,
    /// Self-adjusting binary tree.
    Splay,
    /// Multiway tree of configurable order.
    BTree,
}

impl Strategy {
    /// All built-in strategies.
    pub const ALL: [Strategy; 4] = [Strategy::Avl, Strategy::RedBlack, Strategy::Splay, Strategy::BTree];

    /// Canonical lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Strategy::Avl => "avl",
            Strategy::RedBlack => "red-black",
            Strategy::Splay => "splay",
            Strategy::BTree => "btree",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "avl" => Ok(Strategy::Avl),
            "red-black" | "redblack" | "rb" | "rbtree" => Ok(Strategy::RedBlack),
            "splay" => Ok(Strategy::Splay),
            "btree" | "b-tree" => Ok(Strategy::BTree),
            _ => Err(Error::UnknownStrategy(name.to_owned())),
        }
    }
}

/// Order in which [`walk`](crate::SearchTree::walk) visits nodes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum WalkOrder {
    PreOrder,
    InOrder,
    PostOrder,
    LevelOrder,
}

impl fmt::Display for WalkOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WalkOrder::PreOrder => "pre-order",
            WalkOrder::InOrder => "in-order",
            WalkOrder::PostOrder => "post-order",
            WalkOrder::LevelOrder => "level-order",
        })
    }
}

/// Construction parameters shared by all strategies.
///
/// Binary strategies ignore `order`; the B-tree requires it to be at least
/// [`MIN_ORDER`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeConfig {
    /// Maximum number of children of a B-tree node.
    pub order: usize,
    /// Number of nodes to reserve up front.
    pub capacity: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            capacity: 0,
        }
    }
}

impl TreeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Checks the parameters a B-tree depends on.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOrder`] if `order` is below 3.
    pub fn validate(&self) -> Result<()> {
        if self.order < MIN_ORDER {
            return Err(Error::InvalidOrder { order: self.order });
        }
        Ok(())
    }
}
