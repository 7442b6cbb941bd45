//! Self-balancing search trees for Rust.
//!
//! Four interchangeable strategies behind one [`SearchTree`] contract:
//!
//! - [`AvlTree`] - height balanced, at most one reconstruction per insert
//! - [`RedBlackTree`] - color balanced, cheap recoloring on most updates
//! - [`SplayTree`] - self-adjusting, recently used keys stay near the root
//! - [`BTree`] - multiway nodes of configurable order
//!
//! The three binary strategies share one arena-backed node store and one 3+4
//! reconstruction routine; they differ only in the annotation they keep per
//! node and in how they repair after an update.
//!
//! # Example
//!
//! ```
//! use balance_tree::{Lookup, Registry, SearchTree, Strategy, TreeConfig, WalkOrder};
//!
//! let registry = Registry::<i32, &str>::with_builtin();
//! let config = TreeConfig::new().with_order(5);
//!
//! for strategy in Strategy::ALL {
//!     let mut tree = registry.create(strategy, &config, Default::default()).unwrap();
//!     tree.insert(2, "two").unwrap();
//!     tree.insert(1, "one").unwrap();
//!     tree.insert(3, "three").unwrap();
//!
//!     assert!(tree.insert(2, "again").is_err());
//!     assert_eq!(tree.get(&3), Some(&"three"));
//!     assert!(matches!(tree.search(&4), Lookup::Missing(Some(_))));
//!
//!     assert!(tree.remove(&2));
//!     assert_eq!(tree.len(), 2);
//!     tree.validate().unwrap();
//!
//!     let mut visited = 0;
//!     tree.walk(WalkOrder::LevelOrder, &mut |node| visited += node.keys().len()).unwrap();
//!     assert_eq!(visited, 2);
//! }
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - only requires `alloc`
//! - **`serde`** - (de)serialization of [`TreeConfig`], [`Strategy`] and [`WalkOrder`]
//!
//! Rotations, splits and merges emit `tracing` events at `trace` level; the
//! registry logs at `debug`. No subscriber is installed by this crate.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod raw;
#[cfg(test)]
mod testing;

pub mod avl;
pub mod btree;
pub mod compare;
pub mod config;
pub mod error;
pub mod red_black;
pub mod registry;
pub mod splay;
pub mod tree;
pub mod view;

pub use avl::AvlTree;
pub use btree::BTree;
pub use compare::{Compare, Natural};
pub use config::{Strategy, TreeConfig, WalkOrder};
pub use error::{Error, Result};
pub use red_black::RedBlackTree;
pub use registry::{Constructor, Registry};
pub use splay::SplayTree;
pub use tree::SearchTree;
pub use view::{Balance, Color, Lookup, NodeId, NodeView};
