#![cfg(test)]

// Property tests for Hashtable kept inside the crate so they can inspect the
// arena's free list directly.

use crate::entry::EntryId;
use crate::hashtable::Hashtable;
use crate::mem_tag::MemTag;
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(u32),
    InsertShared(u32),
    Free(usize),
    Resize(usize),
    MaybeGrow(usize, usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u32>().prop_map(Op::Insert),
        1 => any::<u32>().prop_map(Op::InsertShared),
        2 => any::<usize>().prop_map(Op::Free),
        1 => (1usize..40).prop_map(Op::Resize),
        1 => (1usize..64, 0usize..4).prop_map(|(m, lf)| Op::MaybeGrow(m, lf)),
    ]
}

#[derive(Debug)]
struct Model {
    hash: u32,
    literal: u64,
    shared: bool,
}

// Property: state-machine equivalence against a HashMap of live entries.
// Invariants exercised across random operation sequences:
// - number_of_entries equals the model size and the number of linked entries.
// - Every live entry sits in bucket `hash mod table_size`, including after
//   resize and maybe_grow.
// - Shared entries keep their flag; literals and hashes are untouched by moves.
// - Allocation reuses the most recently freed slot first.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(initial in 1usize..16, ops in proptest::collection::vec(arb_op(), 1..120)) {
        let mut sut: Hashtable<u64> = Hashtable::new(initial, MemTag::SYMBOL);
        let mut model: HashMap<EntryId, Model> = HashMap::new();
        let mut live: Vec<EntryId> = Vec::new();
        let mut freed: Vec<EntryId> = Vec::new();
        let mut next_literal = 0u64;

        for op in ops {
            match op {
                Op::Insert(hash) | Op::InsertShared(hash) => {
                    let shared = matches!(op, Op::InsertShared(_));
                    next_literal += 1;
                    let id = if shared {
                        sut.new_shared_entry(hash, next_literal)
                    } else {
                        sut.new_entry(hash, next_literal)
                    };
                    if let Some(expected) = freed.pop() {
                        prop_assert_eq!(id, expected, "free list must be last-freed-first-reused");
                    }
                    let index = sut.hash_to_index(hash);
                    sut.add_entry(index, id);
                    let fresh = model
                        .insert(id, Model { hash, literal: next_literal, shared })
                        .is_none();
                    prop_assert!(fresh);
                    live.push(id);
                }
                Op::Free(pick) => {
                    if live.is_empty() {
                        continue;
                    }
                    let id = live[pick % live.len()];
                    if model[&id].shared {
                        continue;
                    }
                    live.retain(|&l| l != id);
                    let index = sut.hash_to_index(model[&id].hash);
                    prop_assert!(sut.unlink_entry(index, id));
                    let literal = sut.free_entry(id);
                    let m = model.remove(&id).unwrap();
                    prop_assert_eq!(literal, m.literal);
                    freed.push(id);
                }
                Op::Resize(size) => {
                    prop_assert!(sut.resize(size).is_ok());
                    prop_assert_eq!(sut.table_size(), size);
                }
                Op::MaybeGrow(max_size, load_factor) => {
                    let before = sut.table_size();
                    let should = before < max_size
                        && sut.number_of_entries() / before > load_factor;
                    let grew = sut.maybe_grow(max_size, load_factor);
                    prop_assert_eq!(grew, should);
                    if grew {
                        prop_assert_eq!(sut.table_size(), (before * 2).min(max_size));
                    } else {
                        prop_assert_eq!(sut.table_size(), before);
                    }
                }
            }

            prop_assert_eq!(sut.number_of_entries(), model.len());
            prop_assert_eq!(sut.entries().count(), model.len());
            for (&id, m) in &model {
                let e = sut.entry(id);
                prop_assert_eq!(e.hash(), m.hash);
                prop_assert_eq!(*e.literal(), m.literal);
                prop_assert_eq!(e.is_shared(), m.shared);
                prop_assert_eq!(sut.bucket_index_of(id), Some(m.hash as usize % sut.table_size()));
            }
            prop_assert_eq!(sut.arena().free_list().collect::<Vec<_>>(),
                            freed.iter().rev().copied().collect::<Vec<_>>());
        }
    }
}
