mod common;

use std::collections::BTreeMap;

use balance_tree::{
    Balance, Color, Error, Lookup, Natural, Registry, SearchTree, Strategy, TreeConfig, WalkOrder,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use proptest::strategy::Strategy as PropStrategy;

type Tree = Box<dyn SearchTree<i64, i64>>;

fn create(strategy: Strategy, order: usize) -> Tree {
    common::init_tracing();
    Registry::with_builtin()
        .create(strategy, &TreeConfig::new().with_order(order), Natural)
        .unwrap()
}

fn keys_in(tree: &dyn SearchTree<i64, i64>, order: WalkOrder) -> Vec<i64> {
    let mut keys = Vec::new();
    tree.walk(order, &mut |node| keys.extend_from_slice(node.keys())).unwrap();
    keys
}

fn sorted_keys(tree: &dyn SearchTree<i64, i64>) -> Vec<i64> {
    let mut keys = keys_in(tree, WalkOrder::LevelOrder);
    keys.sort_unstable();
    keys
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum TreeOp {
    Insert(i64),
    Remove(i64),
    Search(i64),
    Get(i64),
    Clear,
}

fn tree_op_strategy() -> impl PropStrategy<Value = TreeOp> {
    prop_oneof![
        6 => (-500i64..500).prop_map(TreeOp::Insert),
        4 => (-500i64..500).prop_map(TreeOp::Remove),
        2 => (-500i64..500).prop_map(TreeOp::Search),
        2 => (-500i64..500).prop_map(TreeOp::Get),
        1 => Just(TreeOp::Clear),
    ]
}

fn strategy_and_order() -> impl PropStrategy<Value = (Strategy, usize)> {
    prop_oneof![
        Just((Strategy::Avl, 4)),
        Just((Strategy::RedBlack, 4)),
        Just((Strategy::Splay, 4)),
        (3usize..=5).prop_map(|order| (Strategy::BTree, order)),
    ]
}

// ─── Model equivalence ───────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    /// Replays random operations on every strategy and on a `BTreeMap`,
    /// auditing the tree's invariants after each step.
    #[test]
    fn tree_matches_btreemap((strategy, order) in strategy_and_order(), ops in proptest::collection::vec(tree_op_strategy(), 0..400)) {
        let mut tree = create(strategy, order);
        let mut model = BTreeMap::new();

        for op in &ops {
            match *op {
                TreeOp::Insert(key) => {
                    let expected = if model.contains_key(&key) { Err(Error::DuplicateKey) } else { Ok(()) };
                    prop_assert_eq!(tree.insert(key, -key).map(|_| ()), expected, "insert({})", key);
                    model.entry(key).or_insert(-key);
                }
                TreeOp::Remove(key) => {
                    prop_assert_eq!(tree.remove(&key), model.remove(&key).is_some(), "remove({})", key);
                }
                TreeOp::Search(key) => {
                    let lookup = tree.search(&key);
                    prop_assert_eq!(lookup.is_found(), model.contains_key(&key));
                    if let Lookup::Found { node, index } = lookup {
                        prop_assert_eq!(node.keys()[index], key);
                    }
                }
                TreeOp::Get(key) => {
                    prop_assert_eq!(tree.get(&key).copied(), model.get(&key).copied(), "get({})", key);
                }
                TreeOp::Clear => {
                    tree.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(tree.len(), model.len());
            prop_assert_eq!(tree.is_empty(), model.is_empty());
            if let Err(error) = tree.validate() {
                prop_assert!(false, "{} after {:?}: {}", strategy, op, error);
            }
        }

        prop_assert_eq!(sorted_keys(tree.as_ref()), model.keys().copied().collect::<Vec<_>>());
    }

    /// Every key that goes in comes back out with its payload.
    #[test]
    fn entries_round_trip((strategy, order) in strategy_and_order(), keys in proptest::collection::btree_set(-10_000i64..10_000, 0..300)) {
        let mut tree = create(strategy, order);
        for &key in &keys {
            tree.insert(key, key * 3).unwrap();
        }
        prop_assert_eq!(tree.len(), keys.len());
        for &key in &keys {
            prop_assert_eq!(tree.remove_entry(&key), Some((key, key * 3)));
        }
        prop_assert!(tree.is_empty());
        prop_assert!(tree.root().is_none());
    }
}

// ─── Walks ───────────────────────────────────────────────────────────────────

#[test]
fn binary_walks_agree_on_the_root() {
    for strategy in [Strategy::Avl, Strategy::RedBlack, Strategy::Splay] {
        let mut tree = create(strategy, 4);
        for key in [50, 20, 80, 10, 30, 70, 90, 25] {
            tree.insert(key, 0).unwrap();
        }
        let root = *tree.root().unwrap().key();

        assert_eq!(keys_in(tree.as_ref(), WalkOrder::InOrder), [10, 20, 25, 30, 50, 70, 80, 90], "{strategy}");
        assert_eq!(keys_in(tree.as_ref(), WalkOrder::PreOrder)[0], root, "{strategy}");
        assert_eq!(keys_in(tree.as_ref(), WalkOrder::LevelOrder)[0], root, "{strategy}");
        assert_eq!(*keys_in(tree.as_ref(), WalkOrder::PostOrder).last().unwrap(), root, "{strategy}");
    }
}

#[test]
fn walking_an_empty_tree_visits_nothing() {
    for strategy in Strategy::ALL {
        let tree = create(strategy, 4);
        assert!(keys_in(tree.as_ref(), WalkOrder::LevelOrder).is_empty());
    }
}

#[test]
fn btree_rejects_depth_first_walks() {
    let tree = create(Strategy::BTree, 4);
    let error = tree.walk(WalkOrder::PreOrder, &mut |_| {}).unwrap_err();
    assert_eq!(error.to_string(), "btree trees do not support pre-order traversal");
}

// ─── Node views ──────────────────────────────────────────────────────────────

#[test]
fn node_views_expose_structure() {
    for strategy in Strategy::ALL {
        let mut tree = create(strategy, 3);
        for key in 0..40 {
            tree.insert(key, key).unwrap();
        }
        let root = tree.root().unwrap();
        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.subtree_len(), 40, "{strategy}");

        let mut child_total = 0;
        for child in root.children() {
            assert_eq!(child.parent().map(|parent| parent.id()), Some(root.id()));
            assert_eq!(child.depth(), 1);
            child_total += child.subtree_len();
        }
        assert_eq!(child_total + root.keys().len(), 40, "{strategy}");

        let expected_balance = match strategy {
            Strategy::Avl => matches!(root.balance(), Balance::Height(h) if h > 0),
            Strategy::RedBlack => matches!(root.balance(), Balance::RedBlack { color: Color::Black, .. }),
            Strategy::Splay => root.balance() == Balance::Unannotated,
            Strategy::BTree => root.balance() == Balance::Multiway,
        };
        assert!(expected_balance, "{strategy}: {:?}", root.balance());
    }
}

#[test]
fn binary_leaves_have_no_children() {
    for strategy in [Strategy::Avl, Strategy::RedBlack, Strategy::Splay] {
        let mut tree = create(strategy, 4);
        for key in 0..10 {
            tree.insert(key, key).unwrap();
        }
        let mut leaves = 0;
        tree.walk(WalkOrder::PreOrder, &mut |node| {
            if node.is_leaf() {
                assert!(!node.has_left() && !node.has_right());
                assert_eq!(node.left().map(|n| n.id()), None);
                leaves += 1;
            }
        })
        .unwrap();
        assert!(leaves > 0, "{strategy}");
    }
}

// ─── Owned keys ──────────────────────────────────────────────────────────────

#[test]
fn owned_string_keys() {
    let registry = Registry::<String, Vec<u8>>::with_builtin();
    for strategy in Strategy::ALL {
        let mut tree = registry.create(strategy, &TreeConfig::default(), Natural).unwrap();
        for word in ["pear", "apple", "fig", "kiwi", "date", "lime"] {
            tree.insert(word.to_owned(), word.as_bytes().to_vec()).unwrap();
        }
        assert_eq!(tree.remove_entry(&"fig".to_owned()), Some(("fig".to_owned(), b"fig".to_vec())));
        assert_eq!(tree.get(&"kiwi".to_owned()).map(Vec::len), Some(4));
        assert!(!tree.contains_key(&"fig".to_owned()));
        tree.validate().unwrap();
    }
}

#[test]
fn name_lookup_is_case_insensitive() {
    let registry = Registry::<i64, i64>::with_builtin();
    for (name, strategy) in [("AVL", Strategy::Avl), ("RedBlack", Strategy::RedBlack), ("Splay", Strategy::Splay), ("B-Tree", Strategy::BTree)] {
        let tree = registry.create_by_name(name, &TreeConfig::default(), Natural).unwrap();
        assert_eq!(tree.strategy(), strategy);
    }
}
