#![cfg(test)]

// Property tests for SeqHashMap kept inside the crate so they can assert
// internals like bucket_count without feature gates.

use crate::seq_hash_map::{InvalidCursor, SeqHashMap};
use crate::CursorMut;
use proptest::prelude::*;
use std::fmt;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    GetOrInsert(usize, i32),
    Erase(usize),
    RemoveKey(usize),
    Find(usize),
    Contains(String),
    Mutate(usize, i32),
    At(usize),
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::GetOrInsert(i, v)),
            idx.clone().prop_map(OpI::Erase),
            idx.clone().prop_map(OpI::RemoveKey),
            idx.clone().prop_map(OpI::Find),
            prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            idx.clone().prop_map(OpI::At),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn model_pos(model: &[(Key, i32)], k: &Key) -> Option<usize> {
    model.iter().position(|(mk, _)| mk == k)
}

fn run_scenario<S>(sut: &mut SeqHashMap<Key, i32, S>, pool: Vec<String>, ops: Vec<OpI>) -> Result<(), TestCaseError>
where
    S: std::hash::BuildHasher,
{
    // Ordered model: the map must behave exactly like a Vec of unique
    // key/value pairs in first-insertion order.
    let mut model: Vec<(Key, i32)> = Vec::new();
    let mut stale: Vec<CursorMut> = Vec::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(&pool, i);
                let already = model_pos(&model, &k);
                let (c, created) = sut.insert(k.clone(), v);
                prop_assert_eq!(created, already.is_none(), "created iff key was absent");
                prop_assert_eq!(c.key(sut), Some(&k));
                match already {
                    // A hit must leave the stored value untouched.
                    Some(p) => prop_assert_eq!(c.value(sut), Some(&model[p].1)),
                    None => {
                        prop_assert_eq!(c.value(sut), Some(&v));
                        model.push((k, v));
                    }
                }
            }
            OpI::GetOrInsert(i, v) => {
                let k = key_from(&pool, i);
                let already = model_pos(&model, &k);
                let got = *sut.get_or_insert_with(k.clone(), || v);
                match already {
                    Some(p) => prop_assert_eq!(got, model[p].1),
                    None => {
                        prop_assert_eq!(got, v);
                        model.push((k, v));
                    }
                }
            }
            OpI::Erase(i) => {
                let k = key_from(&pool, i);
                let c = sut.find_mut(k.0.as_str());
                match model_pos(&model, &k) {
                    Some(p) => {
                        let (ek, ev) = sut.erase(c).expect("live cursor erases");
                        prop_assert_eq!(&ek, &k);
                        prop_assert_eq!(ev, model[p].1);
                        model.remove(p);
                        stale.push(c);
                    }
                    None => {
                        prop_assert!(c.is_end());
                        prop_assert_eq!(sut.erase(c), Err(InvalidCursor));
                    }
                }
            }
            OpI::RemoveKey(i) => {
                let k = key_from(&pool, i);
                let removed = sut.remove(k.0.as_str());
                match model_pos(&model, &k) {
                    Some(p) => {
                        prop_assert_eq!(removed, Some(model[p].1));
                        model.remove(p);
                    }
                    None => prop_assert_eq!(removed, None),
                }
            }
            OpI::Find(i) => {
                let k = key_from(&pool, i);
                let c = sut.find(k.0.as_str());
                match model_pos(&model, &k) {
                    Some(p) => {
                        prop_assert_eq!(c.key(sut), Some(&k));
                        prop_assert_eq!(c.value(sut), Some(&model[p].1));
                    }
                    None => prop_assert!(c.is_end()),
                }
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.iter().any(|(mk, _)| mk.0 == s);
                prop_assert_eq!(has, has_model);
                prop_assert_eq!(sut.count(s.as_str()), usize::from(has_model));
            }
            OpI::Mutate(i, d) => {
                let k = key_from(&pool, i);
                let c = sut.find_mut(k.0.as_str());
                match model_pos(&model, &k) {
                    Some(p) => {
                        let vr = c.value_mut(sut).expect("live cursor resolves");
                        *vr = vr.saturating_add(d);
                        model[p].1 = model[p].1.saturating_add(d);
                    }
                    None => prop_assert!(c.value_mut(sut).is_none()),
                }
            }
            OpI::At(i) => {
                let k = key_from(&pool, i);
                match model_pos(&model, &k) {
                    Some(p) => prop_assert_eq!(sut.at(k.0.as_str()), Ok(&model[p].1)),
                    None => prop_assert!(sut.at(k.0.as_str()).is_err()),
                }
            }
            OpI::Iterate => {
                // Checked again below, but also exercise the reverse walk.
                let back: Vec<(Key, i32)> =
                    sut.iter().rev().map(|(k, v)| (k.clone(), *v)).collect();
                let mut expect = model.clone();
                expect.reverse();
                prop_assert_eq!(back, expect);
            }
        }

        // Post-conditions after each op
        // 1) Size parity.
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        // 2) Exact order parity, head to tail.
        let got: Vec<(Key, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(&got, &model);
        // 3) Load bound: never more than 3/4 full.
        prop_assert!(sut.len() * 4 <= sut.bucket_count() * 3);
        // 4) Stale cursors must never resolve.
        for c in &stale {
            prop_assert!(c.value(sut).is_none());
        }
    }
    Ok(())
}

// Property: state-machine equivalence against an insertion-ordered model.
// Invariants exercised across random operation sequences:
// - Re-inserting a present key changes neither value nor position.
// - Erase/remove delete from both structures; order closes over the gap.
// - find/contains/count/at parity for present and absent keys.
// - Iteration (both directions) equals the model after every op.
// - Stale cursors never resolve; len and the load bound hold throughout.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: SeqHashMap<Key, i32> = SeqHashMap::new();
        run_scenario(&mut sut, pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress chain handling: all
// keys share one bucket, so every probe, unlink, and rehash walks the
// same chain.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl std::hash::BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl std::hash::Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: SeqHashMap<Key, i32, ConstBuildHasher> =
            SeqHashMap::with_hasher(ConstBuildHasher);
        run_scenario(&mut sut, pool, ops)?;
    }
}
