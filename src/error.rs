//! Error types.

use alloc::string::String;

use thiserror::Error;

use crate::config::{Strategy, WalkOrder};

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by tree operations, configuration and the registry.
///
/// A key that is simply absent is not an error: searches report it through
/// [`Lookup::Missing`](crate::Lookup::Missing) and removals through `false`.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// The key is already stored in the tree; nothing was inserted.
    #[error("duplicate key")]
    DuplicateKey,

    /// No constructor is registered under the requested tag or name.
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    /// B-tree order below the minimum of 3.
    #[error("invalid B-tree order {order} (must be at least 3)")]
    InvalidOrder { order: usize },

    /// The strategy cannot traverse in the requested order.
    #[error("{strategy} trees do not support {order} traversal")]
    UnsupportedWalkOrder { strategy: Strategy, order: WalkOrder },

    /// A structural invariant failed; only produced by `validate`.
    #[error("structural invariant violated: {0}")]
    InvariantViolation(String),
}
