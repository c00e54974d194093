//! Bucket index: a chaining hash table over the entry pool.
//!
//! Each bucket holds the head of a doubly linked collision chain; the
//! chain links live in the entries themselves, next to (but independent
//! of) the order links. Lookup and the duplicate probe of an insertion
//! share the same walk. Growth doubles the bucket array and relinks every
//! entry at the head of its new chain using the stored hash; entry
//! identity and the order list are untouched.

use slotmap::DefaultKey;

use crate::slots::Slots;

/// Buckets allocated up front; the array only ever doubles from here.
const INITIAL_BUCKETS: usize = 16;

// Maximum load factor of 3/4, kept in integer form.
const LOAD_NUM: usize = 3;
const LOAD_DEN: usize = 4;

#[derive(Debug)]
pub(crate) struct BucketIndex {
    heads: Vec<Option<DefaultKey>>,
}

impl BucketIndex {
    pub(crate) fn new() -> Self {
        BucketIndex {
            heads: vec![None; INITIAL_BUCKETS],
        }
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.heads.len() as u64) as usize
    }

    /// Walk the chain for `hash`, returning the first entry for which
    /// `eq` accepts the stored key. Amortized O(1) under the load bound.
    pub(crate) fn find<K, V>(
        &self,
        slots: &Slots<K, V>,
        hash: u64,
        mut eq: impl FnMut(&K) -> bool,
    ) -> Option<DefaultKey> {
        let mut cur = self.heads[self.bucket_of(hash)];
        while let Some(k) = cur {
            let e = &slots[k];
            if eq(&e.key) {
                return Some(k);
            }
            cur = e.bucket_next;
        }
        None
    }

    /// Link `k` at the head of the chain its stored hash selects. The
    /// caller guarantees no equal key is already chained.
    pub(crate) fn link<K, V>(&mut self, slots: &mut Slots<K, V>, k: DefaultKey) {
        let b = self.bucket_of(slots[k].hash);
        let old_head = self.heads[b];
        {
            let e = &mut slots[k];
            e.bucket_next = old_head;
            e.bucket_prev = None;
        }
        if let Some(h) = old_head {
            slots[h].bucket_prev = Some(k);
        }
        self.heads[b] = Some(k);
    }

    /// Unlink `k` from its chain, patching neighbors or the bucket head.
    /// O(1); `k` must be live.
    pub(crate) fn unlink<K, V>(&mut self, slots: &mut Slots<K, V>, k: DefaultKey) {
        let (b, prev, next) = {
            let e = &slots[k];
            (self.bucket_of(e.hash), e.bucket_prev, e.bucket_next)
        };
        match prev {
            Some(p) => slots[p].bucket_next = next,
            None => self.heads[b] = next,
        }
        if let Some(n) = next {
            slots[n].bucket_prev = prev;
        }
        let e = &mut slots[k];
        e.bucket_next = None;
        e.bucket_prev = None;
    }

    /// Whether inserting on top of `len` live entries requires growth.
    /// Checked before the duplicate probe of every insertion attempt, so
    /// an insert that resolves to an existing key can still grow the
    /// table.
    pub(crate) fn should_grow(&self, len: usize) -> bool {
        len * LOAD_DEN >= self.heads.len() * LOAD_NUM
    }

    /// Double the bucket array and redistribute every chained entry into
    /// its new chain. Entries are relinked in place at the new chain
    /// heads; the traversal order over old buckets is not observable.
    pub(crate) fn grow<K, V>(&mut self, slots: &mut Slots<K, V>) {
        let new_count = self.heads.len() * 2;
        let old_heads = core::mem::replace(&mut self.heads, vec![None; new_count]);
        for old_head in old_heads {
            let mut cur = old_head;
            while let Some(k) = cur {
                cur = slots[k].bucket_next;
                self.link(slots, k);
            }
        }
    }

    /// Empty every chain without shrinking the array.
    pub(crate) fn clear(&mut self) {
        for head in &mut self.heads {
            *head = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use slotmap::DefaultKey;

    use super::{BucketIndex, INITIAL_BUCKETS};
    use crate::slots::{Entry, Slots};

    fn add(
        slots: &mut Slots<u64, ()>,
        index: &mut BucketIndex,
        key: u64,
        hash: u64,
    ) -> DefaultKey {
        let k = slots.insert(Entry::new(key, (), hash));
        index.link(slots, k);
        k
    }

    fn chain_keys(slots: &Slots<u64, ()>, index: &BucketIndex, hash: u64) -> Vec<u64> {
        let mut out = Vec::new();
        let mut cur = index.heads[(hash % index.heads.len() as u64) as usize];
        while let Some(k) = cur {
            out.push(slots[k].key);
            cur = slots[k].bucket_next;
        }
        out
    }

    /// Invariant: colliding entries chain at the head, and the shared walk
    /// resolves each key by equality, not by hash alone.
    #[test]
    fn collision_chain_links_at_head() {
        let mut slots = Slots::with_key();
        let mut index = BucketIndex::new();
        add(&mut slots, &mut index, 1, 7);
        add(&mut slots, &mut index, 2, 7);
        add(&mut slots, &mut index, 3, 7);

        assert_eq!(chain_keys(&slots, &index, 7), [3, 2, 1]);
        for key in [1, 2, 3] {
            let found = index.find(&slots, 7, |k| *k == key).expect("chained key");
            assert_eq!(slots[found].key, key);
        }
        assert!(index.find(&slots, 7, |k| *k == 9).is_none());
    }

    /// Invariant: unlinking works at the chain head, interior, and tail,
    /// and leaves the remaining chain reachable.
    #[test]
    fn unlink_each_chain_position() {
        let mut slots = Slots::with_key();
        let mut index = BucketIndex::new();
        let a = add(&mut slots, &mut index, 1, 3);
        let b = add(&mut slots, &mut index, 2, 3);
        let c = add(&mut slots, &mut index, 3, 3);

        index.unlink(&mut slots, b); // interior
        assert_eq!(chain_keys(&slots, &index, 3), [3, 1]);

        index.unlink(&mut slots, c); // head
        assert_eq!(chain_keys(&slots, &index, 3), [1]);

        index.unlink(&mut slots, a); // tail / last
        assert_eq!(chain_keys(&slots, &index, 3), Vec::<u64>::new());
    }

    /// Invariant: the growth trigger fires exactly at the 3/4 load bound
    /// (12 live entries on the initial 16 buckets).
    #[test]
    fn growth_threshold() {
        let index = BucketIndex::new();
        assert_eq!(index.bucket_count(), INITIAL_BUCKETS);
        assert!(!index.should_grow(11));
        assert!(index.should_grow(12));
    }

    /// Invariant: growing doubles the array and every entry remains
    /// findable through its stored hash afterwards.
    #[test]
    fn grow_redistributes_entries() {
        let mut slots = Slots::with_key();
        let mut index = BucketIndex::new();
        // Spread across buckets, including a deliberate collision pair
        // (hashes 5 and 21 share bucket 5 at 16 buckets, split at 32).
        for (key, hash) in [(1u64, 5u64), (2, 21), (3, 0), (4, 31), (5, 16)] {
            add(&mut slots, &mut index, key, hash);
        }
        assert_eq!(chain_keys(&slots, &index, 5), [2, 1]);

        index.grow(&mut slots);
        assert_eq!(index.bucket_count(), 32);
        for (key, hash) in [(1u64, 5u64), (2, 21), (3, 0), (4, 31), (5, 16)] {
            let found = index.find(&slots, hash, |k| *k == key).expect("still indexed");
            assert_eq!(slots[found].key, key);
        }
        // The collision pair now lives in separate chains.
        assert_eq!(chain_keys(&slots, &index, 5), [1]);
        assert_eq!(chain_keys(&slots, &index, 21), [2]);
    }
}
