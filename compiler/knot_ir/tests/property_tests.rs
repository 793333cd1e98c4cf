//! Property-based tests for the pool and dict.
//!
//! - `Dict` agrees with an `FxHashMap` model under random insert/remove
//! - reversing a list twice reproduces it without touching the original

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use knot_ir::{Dict, Pool, Sym, SymbolTable, Value};
use proptest::prelude::*;
use rustc_hash::FxHashMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(u8, i64),
    Remove(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..32, any::<i64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        (0u8..32).prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn dict_matches_hashmap_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut table = SymbolTable::new();
        let keys: Vec<Sym> = (0..32).map(|i| table.intern(&format!("k{i}"))).collect();
        let mut dict = Dict::new();
        let mut model: FxHashMap<Sym, i64> = FxHashMap::default();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    let key = keys[usize::from(k)];
                    prop_assert_eq!(dict.insert(key, v), model.insert(key, v));
                }
                Op::Remove(k) => {
                    let key = keys[usize::from(k)];
                    prop_assert_eq!(dict.remove(key), model.remove(&key));
                }
            }
        }

        prop_assert_eq!(dict.len(), model.len());
        for key in &keys {
            prop_assert_eq!(dict.get(*key), model.get(key).copied());
        }
        let live = (0..dict.capacity()).filter(|&i| dict.slot(i).is_some()).count();
        prop_assert_eq!(live, model.len());
    }

    #[test]
    fn rev_twice_is_identity(items in prop::collection::vec(any::<i64>(), 0..64)) {
        let mut pool = Pool::new();
        let list = pool.list_from(items.iter().copied().map(Value::Int));
        let rev = pool.rev_list(list);
        let back = pool.rev_list(rev);
        let expected: Vec<Value> = items.iter().copied().map(Value::Int).collect();
        prop_assert_eq!(pool.list_to_vec(back), expected.clone());
        prop_assert_eq!(pool.list_to_vec(list), expected);
    }
}
