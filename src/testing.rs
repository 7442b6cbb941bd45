//! Shared test harness: random operation sequences replayed against a
//! `BTreeMap` model.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use crate::config::WalkOrder;
use crate::error::Error;
use crate::tree::SearchTree;

#[derive(Clone, Debug)]
pub(crate) enum Op {
    Insert(i32),
    Remove(i32),
    Search(i32),
}

pub(crate) fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0i32..256).prop_map(Op::Insert),
        3 => (0i32..256).prop_map(Op::Remove),
        1 => (0i32..256).prop_map(Op::Search),
    ]
}

/// Keys in visiting order.
pub(crate) fn walk_keys<V>(tree: &dyn SearchTree<i32, V>, order: WalkOrder) -> Vec<i32> {
    let mut keys = Vec::new();
    tree.walk(order, &mut |node| keys.extend_from_slice(node.keys()))
        .expect("walk order supported");
    keys
}

/// Applies `ops` to `tree` and to a model, checking results, size and
/// `validate` after every step.
pub(crate) fn replay(tree: &mut dyn SearchTree<i32, i32>, ops: &[Op]) -> Result<(), TestCaseError> {
    let mut model = BTreeMap::new();

    for op in ops {
        match *op {
            Op::Insert(key) => {
                let inserted = tree.insert(key, key * 2).map(|node| node.keys().contains(&key));
                if model.insert(key, key * 2).is_some() {
                    prop_assert_eq!(inserted, Err(Error::DuplicateKey), "insert({}) accepted a duplicate", key);
                } else {
                    prop_assert_eq!(inserted, Ok(true), "insert({}) returned the wrong node", key);
                }
            }
            Op::Remove(key) => {
                prop_assert_eq!(tree.remove_entry(&key), model.remove(&key).map(|data| (key, data)), "remove({})", key);
            }
            Op::Search(key) => {
                let lookup = tree.search(&key);
                prop_assert_eq!(lookup.entry().map(|(k, v)| (*k, *v)), model.get(&key).map(|v| (key, *v)), "search({})", key);
                if !model.contains_key(&key) {
                    prop_assert_eq!(lookup.node().is_none(), model.is_empty());
                }
            }
        }

        prop_assert_eq!(tree.len(), model.len());
        if let Err(error) = tree.validate() {
            return Err(TestCaseError::fail(alloc::format!("after {op:?}: {error}")));
        }
    }

    let mut sorted = walk_keys(tree, WalkOrder::LevelOrder);
    sorted.sort_unstable();
    prop_assert_eq!(sorted, model.keys().copied().collect::<Vec<_>>());
    Ok(())
}
