#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can reach the
// arena-level checks without widening the public surface.

use crate::error::{GrowError, InsertError};
use crate::hash_table::{Handle, IntHashTable, SetOutcome, StrHashTable, TableConfig};
use crate::value::Value;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations so shrinking moves toward earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Add(usize, u32),
    Set(usize, u32),
    Delete(usize),
    DeleteHandle(usize),
    Get(usize),
    Iterate,
    DrainWithCursor,
}

fn arb_config() -> impl Strategy<Value = TableConfig> {
    (0usize..6, prop_oneof![Just(0usize), 4usize..16], 0usize..5, 0usize..10).prop_map(
        |(initial, max, growth, buckets)| TableConfig::new(initial, max, growth, buckets),
    )
}

fn arb_scenario() -> impl Strategy<Value = (TableConfig, Vec<u32>, Vec<Op>)> {
    (arb_config(), proptest::collection::btree_set(any::<u32>(), 1..=12)).prop_flat_map(
        |(config, keys)| {
            let pool: Vec<u32> = keys.into_iter().collect();
            let idx = 0..pool.len();
            let op = prop_oneof![
                4 => (idx.clone(), any::<u32>()).prop_map(|(i, v)| Op::Add(i, v)),
                3 => (idx.clone(), any::<u32>()).prop_map(|(i, v)| Op::Set(i, v)),
                2 => idx.clone().prop_map(Op::Delete),
                1 => idx.clone().prop_map(Op::DeleteHandle),
                2 => idx.prop_map(Op::Get),
                1 => Just(Op::Iterate),
                1 => Just(Op::DrainWithCursor),
            ];
            proptest::collection::vec(op, 1..80)
                .prop_map(move |ops| (config, pool.clone(), ops))
        },
    )
}

// Exhaustion is only legal when the freelist is dry and growth is refused.
fn exhaustion_is_legal(t: &IntHashTable, err: GrowError) -> bool {
    if t.free_count() != 0 {
        return false;
    }
    match err {
        GrowError::ZeroIncrement => t.growth_increment() == 0,
        GrowError::CapExceeded { .. } => {
            t.max_entries() != 0 && t.len() + t.growth_increment() > t.max_entries()
        }
        GrowError::AllocFailed { .. } => false,
    }
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised after every operation:
// - Every list is a valid circular list and each slot sits in exactly one
//   of them; chained slots hash to the bucket that holds them.
// - `len` matches the model and never exceeds a nonzero cap.
// - Bucket count is odd.
// - Inserts fail only as duplicates or under legal exhaustion, with no
//   state change either way.
// - Full traversals visit each live entry exactly once with the values
//   `get` returns.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((config, pool, ops) in arb_scenario()) {
        let mut sut = IntHashTable::new("prop", config).unwrap();
        let mut model: HashMap<u32, u32> = HashMap::new();
        let mut handles: HashMap<u32, Handle> = HashMap::new();
        let mut stale: Vec<Handle> = Vec::new();

        prop_assert_eq!(sut.bucket_count() % 2, 1);

        for op in ops {
            match op {
                Op::Add(i, v) => {
                    let k = pool[i];
                    let before = sut.len();
                    match sut.add_if_absent(k, Value::from(v)) {
                        Ok(h) => {
                            prop_assert!(!model.contains_key(&k));
                            model.insert(k, v);
                            handles.insert(k, h);
                        }
                        Err(InsertError::DuplicateKey) => {
                            prop_assert!(model.contains_key(&k));
                            prop_assert_eq!(sut.len(), before);
                        }
                        Err(InsertError::Exhausted(err)) => {
                            prop_assert!(!model.contains_key(&k));
                            prop_assert!(exhaustion_is_legal(&sut, err), "{err:?}");
                            prop_assert!(!sut.contains_key(&k));
                        }
                    }
                }
                Op::Set(i, v) => {
                    let k = pool[i];
                    match sut.set_or_insert(k, Value::from(v)) {
                        Ok(SetOutcome::Updated(prev)) => {
                            let old = model.insert(k, v);
                            prop_assert_eq!(old.map(Value::from), Some(prev));
                        }
                        Ok(SetOutcome::Inserted) => {
                            prop_assert!(model.insert(k, v).is_none());
                            let h = sut.find(&k).expect("inserted key is findable");
                            handles.insert(k, h);
                        }
                        Err(err) => {
                            prop_assert!(!model.contains_key(&k));
                            prop_assert!(exhaustion_is_legal(&sut, err), "{err:?}");
                        }
                    }
                }
                Op::Delete(i) => {
                    let k = pool[i];
                    let got = sut.delete(&k);
                    let expected = model.remove(&k);
                    prop_assert_eq!(got, expected.map(|v| (k, Value::from(v))));
                    if let Some(h) = handles.remove(&k) {
                        stale.push(h);
                    }
                }
                Op::DeleteHandle(i) => {
                    let k = pool[i];
                    if let Some(h) = handles.remove(&k) {
                        let v = model.remove(&k).expect("tracked handle has model entry");
                        prop_assert_eq!(sut.delete_entry(h), Some((k, Value::from(v))));
                        stale.push(h);
                    }
                }
                Op::Get(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.get(&k).copied(), model.get(&k).map(|&v| Value::from(v)));
                    if let Some(&h) = handles.get(&k) {
                        prop_assert_eq!(sut.find(&k), Some(h));
                    }
                }
                Op::Iterate => {
                    let mut seen = BTreeSet::new();
                    for (h, k, v) in sut.iter() {
                        prop_assert!(seen.insert(*k), "key {} visited twice", k);
                        prop_assert_eq!(Some(v), sut.get(k));
                        prop_assert_eq!(h.key(&sut), Some(k));
                    }
                    let expected: BTreeSet<u32> = model.keys().copied().collect();
                    prop_assert_eq!(seen, expected);
                }
                Op::DrainWithCursor => {
                    let mut cursor = sut.cursor();
                    let mut visited = 0;
                    while let Some(h) = cursor.next(&sut) {
                        let (k, _) = sut.delete_entry(h).expect("cursor yields live entries");
                        prop_assert!(model.remove(&k).is_some());
                        if let Some(h) = handles.remove(&k) {
                            stale.push(h);
                        }
                        visited += 1;
                    }
                    prop_assert!(model.is_empty());
                    prop_assert!(sut.is_empty());
                    prop_assert!(visited <= pool.len());
                }
            }

            if let Err(err) = sut.verify_links() {
                prop_assert!(false, "link invariant broken: {err}");
            }
            prop_assert_eq!(sut.len(), model.len());
            if sut.max_entries() != 0 {
                prop_assert!(sut.len() <= sut.max_entries());
            }
            for &h in &stale {
                prop_assert!(h.value(&sut).is_none());
            }
        }
    }
}

// Property: string tables agree with a HashSet of the distinct tokens, and
// lookups through freshly allocated query strings hit.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_str_table_distinct_tokens(tokens in proptest::collection::vec("[a-zA-Z]{0,6}", 0..60), buckets in 0usize..20) {
        let mut sut: StrHashTable<'_> =
            StrHashTable::new("tokens", TableConfig::new(4, 0, 5, buckets)).unwrap();
        let mut distinct: BTreeSet<&str> = BTreeSet::new();
        for t in &tokens {
            let added = sut.add_if_absent(t.as_str(), Value::NULL).is_ok();
            prop_assert_eq!(added, distinct.insert(t.as_str()));
        }
        prop_assert_eq!(sut.len(), distinct.len());
        for t in &distinct {
            let query = (*t).to_owned();
            prop_assert!(sut.contains_key(query.as_str()));
        }
        if let Err(err) = sut.verify_links() {
            prop_assert!(false, "link invariant broken: {err}");
        }
    }
}
