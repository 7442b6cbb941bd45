//! Strategy lookup by tag or name.

use core::fmt;

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;

use crate::avl::AvlTree;
use crate::btree::BTree;
use crate::compare::{Compare, Natural};
use crate::config::{Strategy, TreeConfig};
use crate::error::{Error, Result};
use crate::red_black::RedBlackTree;
use crate::splay::SplayTree;
use crate::tree::SearchTree;

/// Builds an empty tree from a configuration and a comparator.
pub type Constructor<K, V, C> = fn(&TreeConfig, C) -> Result<Box<dyn SearchTree<K, V>>>;

/// Maps [`Strategy`] tags to tree constructors.
///
/// There is no global table: a registry is an ordinary value, filled either
/// explicitly with [`register`](Self::register) or all at once with
/// [`with_builtin`](Self::with_builtin).
///
/// ```
/// use balance_tree::{Registry, SearchTree, Strategy, TreeConfig};
///
/// let registry = Registry::<u32, &str>::with_builtin();
/// let mut tree = registry.create_by_name("red-black", &TreeConfig::default(), Default::default()).unwrap();
/// tree.insert(7, "seven").unwrap();
/// assert_eq!(tree.strategy(), Strategy::RedBlack);
/// assert_eq!(tree.get(&7), Some(&"seven"));
/// ```
pub struct Registry<K, V, C = Natural> {
    constructors: BTreeMap<Strategy, Constructor<K, V, C>>,
}

impl<K, V, C> Registry<K, V, C> {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Installs `constructor` under `strategy`, returning the one it replaced.
    pub fn register(&mut self, strategy: Strategy, constructor: Constructor<K, V, C>) -> Option<Constructor<K, V, C>> {
        let previous = self.constructors.insert(strategy, constructor);
        tracing::debug!(%strategy, replaced = previous.is_some(), "registered tree constructor");
        previous
    }

    #[must_use]
    pub fn contains(&self, strategy: Strategy) -> bool {
        self.constructors.contains_key(&strategy)
    }

    /// Registered strategies in tag order.
    pub fn strategies(&self) -> impl Iterator<Item = Strategy> + '_ {
        self.constructors.keys().copied()
    }

    /// Builds an empty tree of the given strategy.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownStrategy`] if nothing is registered under `strategy`,
    /// or whatever the constructor reports (e.g. [`Error::InvalidOrder`]).
    pub fn create(&self, strategy: Strategy, config: &TreeConfig, comparator: C) -> Result<Box<dyn SearchTree<K, V>>> {
        let Some(constructor) = self.constructors.get(&strategy) else {
            tracing::debug!(%strategy, "no constructor registered");
            return Err(Error::UnknownStrategy(strategy.name().to_owned()));
        };
        tracing::debug!(%strategy, order = config.order, "creating tree");
        constructor(config, comparator)
    }

    /// Like [`create`](Self::create), with the strategy given by name
    /// (`"avl"`, `"red-black"`, `"rb"`, `"splay"`, `"btree"`, ...).
    ///
    /// # Errors
    ///
    /// [`Error::UnknownStrategy`] if the name is not recognised, plus
    /// everything [`create`](Self::create) can return.
    pub fn create_by_name(&self, name: &str, config: &TreeConfig, comparator: C) -> Result<Box<dyn SearchTree<K, V>>> {
        self.create(name.parse()?, config, comparator)
    }
}

impl<K: 'static, V: 'static, C: Compare<K> + 'static> Registry<K, V, C> {
    /// A registry holding all four built-in strategies.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Strategy::Avl, build_avl);
        registry.register(Strategy::RedBlack, build_red_black);
        registry.register(Strategy::Splay, build_splay);
        registry.register(Strategy::BTree, build_btree);
        registry
    }
}

impl<K, V, C> Default for Registry<K, V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> fmt::Debug for Registry<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

#[allow(clippy::unnecessary_wraps)]
fn build_avl<K: 'static, V: 'static, C: Compare<K> + 'static>(
    config: &TreeConfig,
    comparator: C,
) -> Result<Box<dyn SearchTree<K, V>>> {
    Ok(Box::new(AvlTree::with_config(config, comparator)))
}

#[allow(clippy::unnecessary_wraps)]
fn build_red_black<K: 'static, V: 'static, C: Compare<K> + 'static>(
    config: &TreeConfig,
    comparator: C,
) -> Result<Box<dyn SearchTree<K, V>>> {
    Ok(Box::new(RedBlackTree::with_config(config, comparator)))
}

#[allow(clippy::unnecessary_wraps)]
fn build_splay<K: 'static, V: 'static, C: Compare<K> + 'static>(
    config: &TreeConfig,
    comparator: C,
) -> Result<Box<dyn SearchTree<K, V>>> {
    Ok(Box::new(SplayTree::with_config(config, comparator)))
}

fn build_btree<K: 'static, V: 'static, C: Compare<K> + 'static>(
    config: &TreeConfig,
    comparator: C,
) -> Result<Box<dyn SearchTree<K, V>>> {
    Ok(Box::new(BTree::with_config(config, comparator)?))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_registry_knows_every_strategy() {
        let registry = Registry::<i32, ()>::with_builtin();
        assert_eq!(registry.strategies().collect::<Vec<_>>(), Strategy::ALL);
        for strategy in Strategy::ALL {
            let tree = registry.create(strategy, &TreeConfig::default(), Natural).unwrap();
            assert_eq!(tree.strategy(), strategy);
            assert!(tree.is_empty());
        }
    }

    #[test]
    fn empty_registry_reports_unknown_strategy() {
        let registry = Registry::<i32, ()>::new();
        assert!(!registry.contains(Strategy::Splay));
        assert_eq!(
            registry.create(Strategy::Splay, &TreeConfig::default(), Natural).err(),
            Some(Error::UnknownStrategy("splay".to_owned()))
        );
    }

    #[test]
    fn names_resolve_through_from_str() {
        let registry = Registry::<i32, ()>::with_builtin();
        let tree = registry.create_by_name("rb", &TreeConfig::default(), Natural).unwrap();
        assert_eq!(tree.strategy(), Strategy::RedBlack);
        assert_eq!(
            registry.create_by_name("skiplist", &TreeConfig::default(), Natural).err(),
            Some(Error::UnknownStrategy("skiplist".to_owned()))
        );
    }

    #[test]
    fn btree_order_is_checked_at_creation() {
        let registry = Registry::<i32, ()>::with_builtin();
        let config = TreeConfig::new().with_order(2);
        assert_eq!(
            registry.create(Strategy::BTree, &config, Natural).err(),
            Some(Error::InvalidOrder { order: 2 })
        );
        // Binary strategies ignore the order.
        assert!(registry.create(Strategy::Avl, &config, Natural).is_ok());
    }

    #[test]
    fn registration_replaces_previous_constructor() {
        let mut registry = Registry::<i32, (), Natural>::new();
        assert!(registry.register(Strategy::Avl, build_avl).is_none());
        // Serve AVL requests with a splay tree.
        assert!(registry.register(Strategy::Avl, build_splay).is_some());
        let tree = registry.create(Strategy::Avl, &TreeConfig::default(), Natural).unwrap();
        assert_eq!(tree.strategy(), Strategy::Splay);
    }

    #[test]
    fn comparator_travels_into_the_tree() {
        type Reverse = fn(&i32, &i32) -> core::cmp::Ordering;
        let registry = Registry::<i32, (), Reverse>::with_builtin();
        let reverse: Reverse = |a, b| b.cmp(a);
        let mut tree = registry.create(Strategy::Avl, &TreeConfig::default(), reverse).unwrap();
        for key in [1, 2, 3] {
            tree.insert(key, ()).unwrap();
        }
        let mut keys = Vec::new();
        tree.walk(crate::WalkOrder::InOrder, &mut |node| keys.push(*node.key())).unwrap();
        assert_eq!(keys, [3, 2, 1]);
    }
}
