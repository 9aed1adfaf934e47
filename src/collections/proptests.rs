use super::*;
use crate::error::TreeError;

use proptest::prelude::*;
use std::collections::BTreeMap;

fn validate_tree(t: &AVLTree<u16, u64>, m: &BTreeMap<u16, u64>) {
    t.check().expect("tree must pass the structural check");
    assert_eq!(t.len(), m.len(), "node count must match the model");
    assert_eq!(t.is_empty(), m.is_empty());

    let mut previous: Option<u16> = None;
    for node in t.iter() {
        if let Some(previous) = previous {
            assert!(previous < *node.key(), "keys must be strictly increasing");
        }
        previous = Some(*node.key());
    }

    let entries: Vec<(u16, u64)> = t.iter().map(|node| (*node.key(), *node.value())).collect();
    let expected: Vec<(u16, u64)> = m.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(entries, expected, "payloads must stay attached to their keys");
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u16),
    Remove(u16),
    SafeInsert(u16),
    SafeRemove(u16),
    Get(u16),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    // a narrow key range makes duplicates and misses frequent
    let key = 0u16..256;
    let op = prop_oneof![
        30 => key.clone().prop_map(Op::Insert),
        25 => key.clone().prop_map(Op::Remove),
        15 => key.clone().prop_map(Op::SafeInsert),
        15 => key.clone().prop_map(Op::SafeRemove),
        15 => key.prop_map(Op::Get),
    ];
    prop::collection::vec(op, 0..=1000)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t: AVLTree<u16, u64> = AVLTree::new();
        let mut m: BTreeMap<u16, u64> = BTreeMap::new();
        // every inserted node gets a distinct payload
        let mut sequence = 0u64;

        for op in ops {
            match op {
                Op::Insert(key) => {
                    sequence += 1;
                    match t.insert(key) {
                        Ok(mut node) => {
                            prop_assert!(!m.contains_key(&key));
                            *node.value_mut() = sequence;
                            m.insert(key, sequence);
                        }
                        Err(error) => {
                            prop_assert_eq!(error, TreeError::DuplicateKey);
                            prop_assert!(m.contains_key(&key));
                        }
                    }
                }
                Op::Remove(key) => {
                    prop_assert_eq!(t.remove(&key).ok(), m.remove(&key));
                    prop_assert!(t.find(&key).is_none());
                }
                Op::SafeInsert(key) => {
                    sequence += 1;
                    let value = t.safe_insert(key).into_value_mut();
                    if *value == 0 {
                        *value = sequence;
                    }
                    let expected = *m.entry(key).or_insert(sequence);
                    prop_assert_eq!(*value, expected);
                }
                Op::SafeRemove(key) => {
                    prop_assert_eq!(t.safe_remove(&key), m.remove(&key));
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key));
                    prop_assert_eq!(t.find(&key).map(|node| *node.key()), m.get(&key).map(|_| key));
                }
            }

            validate_tree(&t, &m);
        }
    }

    #[test]
    fn prop_height_is_logarithmic(keys in prop::collection::btree_set(any::<u32>(), 1..2000)) {
        let mut t: AVLTree<u32> = AVLTree::new();

        for key in &keys {
            t.insert(*key).unwrap();
        }
        t.check().unwrap();

        // an AVL tree with n nodes is lower than 1.45 * log2(n + 2)
        let n = keys.len() as f64;
        let bound = 1.45 * (n + 2.0).log2();
        prop_assert!((t.height() as f64) < bound);

        let height = t.height();
        for key in keys.iter().step_by(2) {
            t.remove(key).unwrap();
        }
        t.check().unwrap();
        prop_assert!(t.height() <= height);
    }
}
