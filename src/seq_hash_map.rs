//! SeqHashMap: the insertion-ordered hash map.
//!
//! One pool of entries, two structures over it: the bucket index resolves
//! keys, the order list remembers first-insertion order. Every operation
//! goes key → bucket chain first and touches the order list only when an
//! entry is actually created or destroyed. Re-inserting a present key
//! changes nothing: not the value, not the position.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use core::ops::Index;
use std::collections::hash_map::RandomState;

use slotmap::DefaultKey;

use crate::buckets::BucketIndex;
use crate::cursor::{Cursor, CursorMut, MapId};
use crate::iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::order::OrderList;
use crate::reentrancy::DebugReentrancy;
use crate::slots::{Entry, Slots};

/// Checked key access (`at`, `at_mut`) failed: the key is absent.
///
/// Callers for whom absence is a normal case should probe with `find`,
/// `get`, or `count` instead of handling this error.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OutOfBounds;

impl fmt::Display for OutOfBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("key not present in map")
    }
}

impl std::error::Error for OutOfBounds {}

/// `erase` was given a cursor that does not reference a live entry of
/// this map: the past-the-end cursor, a cursor minted by a different map,
/// or a cursor whose entry was already erased.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InvalidCursor;

impl fmt::Display for InvalidCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cursor does not reference a live entry of this map")
    }
}

impl std::error::Error for InvalidCursor {}

/// A hash map that iterates in first-insertion order.
///
/// Lookup, insertion, and erasure are amortized O(1); iteration and
/// cursor traversal follow the order in which keys were first inserted.
/// Inserting a key that is already present neither replaces its value nor
/// moves it; erasing and re-inserting a key sends it to the back.
///
/// Buckets start at 16 and double whenever the load factor would exceed
/// 3/4; growth is checked before the duplicate probe of every insertion
/// attempt. Erasure never shrinks the table.
///
/// Single-threaded by design: the map is `!Send`/`!Sync`, and in debug
/// builds reentering it from user code running inside an operation
/// (`Hash`/`Eq` during probes, `get_or_insert_with` constructors) panics.
pub struct SeqHashMap<K, V, S = RandomState> {
    slots: Slots<K, V>,
    buckets: BucketIndex,
    order: OrderList,
    hasher: S,
    id: MapId,
    reentrancy: DebugReentrancy,
}

impl<K, V> SeqHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V, S> Default for SeqHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> SeqHashMap<K, V, S> {
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current bucket-array capacity. Starts at 16, only ever doubles,
    /// and bounds the load factor: `len() <= bucket_count() * 3 / 4`
    /// holds immediately after every insertion.
    pub fn bucket_count(&self) -> usize {
        self.buckets.bucket_count()
    }

    /// Drop every entry. Buckets are emptied but keep their capacity.
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter();
        self.slots.clear();
        self.buckets.clear();
        self.order.clear();
    }

    /// Cursor to the earliest-inserted entry, or past-the-end if empty.
    pub fn head_cursor(&self) -> Cursor {
        Cursor {
            slot: self.order.head(),
            owner: self.id,
        }
    }

    pub fn head_cursor_mut(&mut self) -> CursorMut {
        CursorMut {
            slot: self.order.head(),
            owner: self.id,
        }
    }

    /// Cursor to the most recently inserted entry, or past-the-end if
    /// empty. Backward walks start here; retreating from past-the-end is
    /// a no-op.
    pub fn tail_cursor(&self) -> Cursor {
        Cursor {
            slot: self.order.tail(),
            owner: self.id,
        }
    }

    pub fn tail_cursor_mut(&mut self) -> CursorMut {
        CursorMut {
            slot: self.order.tail(),
            owner: self.id,
        }
    }

    /// The past-the-end cursor.
    pub fn end_cursor(&self) -> Cursor {
        Cursor {
            slot: None,
            owner: self.id,
        }
    }

    pub fn end_cursor_mut(&mut self) -> CursorMut {
        CursorMut {
            slot: None,
            owner: self.id,
        }
    }

    /// Iterate `(&K, &V)` in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            fwd: self.order.head(),
            rev: self.order.tail(),
            remaining: self.slots.len(),
        }
    }

    /// Iterate `(&K, &mut V)` in insertion order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            fwd: self.order.head(),
            rev: self.order.tail(),
            remaining: self.slots.len(),
            slots: &mut self.slots,
            _marker: PhantomData,
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { iter: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { iter: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            iter: self.iter_mut(),
        }
    }

    // Cursor plumbing. Owner mismatch resolves to nothing rather than
    // touching another map's slot space.

    pub(crate) fn cursor_key(&self, slot: Option<DefaultKey>, owner: MapId) -> Option<&K> {
        let _g = self.reentrancy.enter();
        if owner != self.id {
            return None;
        }
        self.slots.get(slot?).map(|e| &e.key)
    }

    pub(crate) fn cursor_value(&self, slot: Option<DefaultKey>, owner: MapId) -> Option<&V> {
        let _g = self.reentrancy.enter();
        if owner != self.id {
            return None;
        }
        self.slots.get(slot?).map(|e| &e.value)
    }

    pub(crate) fn cursor_value_mut(
        &mut self,
        slot: Option<DefaultKey>,
        owner: MapId,
    ) -> Option<&mut V> {
        let _g = self.reentrancy.enter();
        if owner != self.id {
            return None;
        }
        self.slots.get_mut(slot?).map(|e| &mut e.value)
    }

    // Navigation is a no-op for past-the-end, stale, and foreign cursors;
    // the head's predecessor is past-the-end.

    pub(crate) fn cursor_next(
        &self,
        cur: Option<DefaultKey>,
        owner: MapId,
    ) -> Option<DefaultKey> {
        let _g = self.reentrancy.enter();
        if owner != self.id {
            return cur;
        }
        match cur.and_then(|k| self.slots.get(k)) {
            Some(e) => e.order_next,
            None => cur,
        }
    }

    pub(crate) fn cursor_prev(
        &self,
        cur: Option<DefaultKey>,
        owner: MapId,
    ) -> Option<DefaultKey> {
        let _g = self.reentrancy.enter();
        if owner != self.id {
            return cur;
        }
        match cur.and_then(|k| self.slots.get(k)) {
            Some(e) => e.order_prev,
            None => cur,
        }
    }

    fn cursor_to(&self, slot: Option<DefaultKey>) -> Cursor {
        Cursor {
            slot,
            owner: self.id,
        }
    }

    fn cursor_mut_to(&self, slot: Option<DefaultKey>) -> CursorMut {
        CursorMut {
            slot,
            owner: self.id,
        }
    }
}

impl<K, V, S> SeqHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            slots: Slots::with_key(),
            buckets: BucketIndex::new(),
            order: OrderList::new(),
            hasher,
            id: MapId::fresh(),
            reentrancy: DebugReentrancy::new(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    // Shared chain walk behind every keyed operation. Unguarded so the
    // guarded entry points never nest.
    fn lookup<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.buckets.find(&self.slots, hash, |k| k.borrow() == q)
    }

    /// Insert `key` → `value` at the back of the order.
    ///
    /// Returns a cursor to the live entry for `key` and whether it was
    /// newly created. If the key is already present the map is left
    /// untouched: the existing value and the entry's position both stand,
    /// and the given `key`/`value` are dropped.
    pub fn insert(&mut self, key: K, value: V) -> (CursorMut, bool) {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        // Growth runs before the duplicate probe, so an insert that
        // resolves to an existing key still grows the table once the
        // load bound is hit.
        if self.buckets.should_grow(self.slots.len()) {
            self.buckets.grow(&mut self.slots);
        }
        if let Some(k) = self.buckets.find(&self.slots, hash, |stored| *stored == key) {
            return (self.cursor_mut_to(Some(k)), false);
        }
        let k = self.slots.insert(Entry::new(key, value, hash));
        self.buckets.link(&mut self.slots, k);
        self.order.push_back(&mut self.slots, k);
        (self.cursor_mut_to(Some(k)), true)
    }

    /// Mutable reference to the value for `key`, inserting one built by
    /// `default` if the key is absent. `default` runs only on actual
    /// insertion.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        if self.buckets.should_grow(self.slots.len()) {
            self.buckets.grow(&mut self.slots);
        }
        let k = match self.buckets.find(&self.slots, hash, |stored| *stored == key) {
            Some(k) => k,
            None => {
                let k = self.slots.insert(Entry::new(key, default(), hash));
                self.buckets.link(&mut self.slots, k);
                self.order.push_back(&mut self.slots, k);
                k
            }
        };
        &mut self.slots[k].value
    }

    /// Mutable reference to the value for `key`, inserting `V::default()`
    /// if the key is absent — mutable index access.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Cursor to the entry for `q`, or past-the-end if absent.
    pub fn find<Q>(&self, q: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.cursor_to(self.lookup(q))
    }

    /// Mutable-flavor cursor to the entry for `q`, or past-the-end.
    pub fn find_mut<Q>(&mut self, q: &Q) -> CursorMut
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.cursor_mut_to(self.lookup(q))
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let k = self.lookup(q)?;
        Some(&self.slots[k].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let k = self.lookup(q)?;
        Some(&mut self.slots[k].value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.lookup(q).is_some()
    }

    /// Number of entries for `q`: 0 or 1, since keys are unique.
    pub fn count<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        usize::from(self.lookup(q).is_some())
    }

    /// Checked access to the value for `q`.
    pub fn at<Q>(&self, q: &Q) -> Result<&V, OutOfBounds>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let k = self.lookup(q).ok_or(OutOfBounds)?;
        Ok(&self.slots[k].value)
    }

    /// Checked mutable access to the value for `q`.
    pub fn at_mut<Q>(&mut self, q: &Q) -> Result<&mut V, OutOfBounds>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let k = self.lookup(q).ok_or(OutOfBounds)?;
        Ok(&mut self.slots[k].value)
    }

    /// Remove the entry for `q`, returning its value.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let k = self.lookup(q)?;
        self.buckets.unlink(&mut self.slots, k);
        self.order.unlink(&mut self.slots, k);
        self.slots.remove(k).map(|e| e.value)
    }

    /// Remove the entry the cursor references, unlinking it from both the
    /// bucket chain and the order list, and return its key and value.
    ///
    /// Accepts either cursor flavor. Rejects the past-the-end cursor, a
    /// cursor minted by a different map, and a cursor whose entry was
    /// already erased.
    pub fn erase<C: Into<Cursor>>(&mut self, pos: C) -> Result<(K, V), InvalidCursor> {
        let _g = self.reentrancy.enter();
        let pos: Cursor = pos.into();
        let k = match pos.slot {
            Some(k) if pos.owner == self.id && self.slots.contains_key(k) => k,
            _ => return Err(InvalidCursor),
        };
        self.buckets.unlink(&mut self.slots, k);
        self.order.unlink(&mut self.slots, k);
        let e = self.slots.remove(k).ok_or(InvalidCursor)?;
        Ok((e.key, e.value))
    }
}

/// Read-only index access. Panics on an absent key; use [`SeqHashMap::at`]
/// for the checked form.
impl<K, V, S, Q> Index<&Q> for SeqHashMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, q: &Q) -> &V {
        self.get(q).expect("no entry found for key")
    }
}

impl<K, V, S> Clone for SeqHashMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// An independent copy: entries are re-inserted in the source's
    /// iteration order, never by duplicating link structure, and the copy
    /// mints its own identity, so cursors do not transfer between the
    /// two maps.
    fn clone(&self) -> Self {
        let mut copy = Self::with_hasher(self.hasher.clone());
        for (k, v) in self.iter() {
            copy.insert(k.clone(), v.clone());
        }
        copy
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for SeqHashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Order-sensitive equality: maps are equal iff they hold the same
/// key/value pairs in the same insertion order.
impl<K, V, S> PartialEq for SeqHashMap<K, V, S>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K, V, S> Eq for SeqHashMap<K, V, S>
where
    K: Eq,
    V: Eq,
{
}

impl<K, V, S> FromIterator<(K, V)> for SeqHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

/// First insertion wins, like [`SeqHashMap::insert`]: a pair whose key is
/// already present is dropped.
impl<K, V, S> Extend<(K, V)> for SeqHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a SeqHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut SeqHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for SeqHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        let fwd = self.order.head();
        let rev = self.order.tail();
        let remaining = self.slots.len();
        IntoIter {
            slots: self.slots,
            fwd,
            rev,
            remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use core::hash::{BuildHasher, Hasher};
    use std::cell::Cell;

    use super::{InvalidCursor, OutOfBounds, SeqHashMap};

    fn keys_in_order<V>(m: &SeqHashMap<String, V>) -> Vec<String> {
        m.keys().cloned().collect()
    }

    /// Invariant: duplicate insertion reports `false`, keeps the original
    /// value, and does not move the entry in the order.
    #[test]
    fn duplicate_insert_is_a_noop() {
        let mut m: SeqHashMap<String, i32> = SeqHashMap::new();
        m.insert("a".to_string(), 1);
        m.insert("b".to_string(), 2);

        let (c, created) = m.insert("a".to_string(), 99);
        assert!(!created);
        assert_eq!(c.value(&m), Some(&1));
        assert_eq!(m.len(), 2);
        assert_eq!(keys_in_order(&m), ["a", "b"]);
    }

    /// Invariant: `find(k)` round-trips to the inserted pair, and
    /// `find`/`contains_key`/`count` agree for present and absent keys.
    #[test]
    fn find_contains_count_parity() {
        let mut m: SeqHashMap<String, i32> = SeqHashMap::new();
        for (i, k) in ["a", "b", "c"].iter().enumerate() {
            m.insert((*k).to_string(), i as i32);
        }

        for (i, k) in ["a", "b", "c"].iter().enumerate() {
            let c = m.find(&k.to_string());
            assert!(!c.is_end());
            assert_eq!(c.key(&m).map(String::as_str), Some(*k));
            assert_eq!(c.value(&m), Some(&(i as i32)));
            assert!(m.contains_key(&k.to_string()));
            assert_eq!(m.count(&k.to_string()), 1);
        }

        for k in ["x", "y"] {
            assert!(m.find(&k.to_string()).is_end());
            assert_eq!(m.find(&k.to_string()), m.end_cursor());
            assert!(!m.contains_key(&k.to_string()));
            assert_eq!(m.count(&k.to_string()), 0);
        }
    }

    /// Invariant: borrowed lookup works (store `String`, query `&str`).
    #[test]
    fn borrowed_lookup_with_str() {
        let mut m: SeqHashMap<String, i32> = SeqHashMap::new();
        m.insert("hello".to_string(), 1);
        assert!(m.contains_key("hello"));
        assert!(!m.contains_key("world"));
        assert!(!m.find("hello").is_end());
        assert!(m.find("world").is_end());
        assert_eq!(m.get("hello"), Some(&1));
    }

    /// Invariant: iteration follows insertion order; erasing a key and
    /// re-inserting it moves it to the back.
    #[test]
    fn iteration_order_and_reinsert_position() {
        let mut m: SeqHashMap<String, i32> = SeqHashMap::new();
        for k in ["a", "b", "c"] {
            m.insert(k.to_string(), 0);
        }
        assert_eq!(keys_in_order(&m), ["a", "b", "c"]);

        let b = m.find_mut(&"b".to_string());
        m.erase(b).unwrap();
        assert_eq!(keys_in_order(&m), ["a", "c"]);

        m.insert("b".to_string(), 1);
        assert_eq!(keys_in_order(&m), ["a", "c", "b"]);
    }

    /// Invariant: erasing an entry removes it from both structures; `find`
    /// then yields past-the-end and the stale cursor never resolves.
    #[test]
    fn erase_then_find_is_end() {
        let mut m: SeqHashMap<String, i32> = SeqHashMap::new();
        m.insert("k".to_string(), 5);
        let c = m.find_mut(&"k".to_string());

        let (key, value) = m.erase(c).unwrap();
        assert_eq!(key, "k");
        assert_eq!(value, 5);
        assert!(m.find(&"k".to_string()).is_end());
        assert_eq!(m.len(), 0);
        assert_eq!(c.value(&m), None, "stale cursor must not resolve");
    }

    /// Invariant: a stale cursor does not alias a later entry even if the
    /// physical slot is reused (generational keys).
    #[test]
    fn stale_cursor_does_not_alias_new_entry() {
        let mut m: SeqHashMap<String, i32> = SeqHashMap::new();
        let (old, _) = m.insert("old".to_string(), 1);
        m.erase(old).unwrap();
        let (new, _) = m.insert("new".to_string(), 2);
        assert!(old != new, "cursors must differ across generations");
        assert_eq!(old.value(&m), None);
        assert_eq!(m.erase(old), Err(InvalidCursor));
        assert_eq!(new.value(&m), Some(&2));
    }

    /// Invariant: `erase` rejects past-the-end and foreign cursors, and
    /// the rejected map is left untouched.
    #[test]
    fn erase_validation() {
        let mut m1: SeqHashMap<String, i32> = SeqHashMap::new();
        let mut m2: SeqHashMap<String, i32> = SeqHashMap::new();
        m1.insert("a".to_string(), 1);
        let foreign = m2.insert("a".to_string(), 1).0;

        assert_eq!(m1.erase(m1.end_cursor()), Err(InvalidCursor));
        assert_eq!(m1.erase(foreign), Err(InvalidCursor));
        assert_eq!(m1.len(), 1);
        assert_eq!(m2.len(), 1);
    }

    /// Invariant: `at` errors on absent keys, including on an empty map;
    /// `at_mut` writes through to the stored value.
    #[test]
    fn at_checked_access() {
        let mut m: SeqHashMap<String, i32> = SeqHashMap::new();
        assert_eq!(m.at("missing"), Err(OutOfBounds));

        m.insert("k".to_string(), 10);
        assert_eq!(m.at("k"), Ok(&10));
        *m.at_mut("k").unwrap() += 5;
        assert_eq!(m.at("k"), Ok(&15));
        assert_eq!(m.at_mut("missing"), Err(OutOfBounds));
    }

    /// Invariant: read-only index access panics on an absent key.
    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn index_panics_on_missing() {
        let m: SeqHashMap<String, i32> = SeqHashMap::new();
        let _ = m["missing"];
    }

    /// Invariant: `get_or_insert_with` runs the constructor only on
    /// actual insertion and appends new keys at the back.
    #[test]
    fn get_or_insert_with_is_lazy() {
        let mut m: SeqHashMap<String, i32> = SeqHashMap::new();
        let calls = Cell::new(0);

        let v = m.get_or_insert_with("k".to_string(), || {
            calls.set(calls.get() + 1);
            7
        });
        assert_eq!(*v, 7);
        assert_eq!(calls.get(), 1);

        let v = m.get_or_insert_with("k".to_string(), || {
            calls.set(calls.get() + 1);
            8
        });
        assert_eq!(*v, 7, "present key keeps its value");
        assert_eq!(calls.get(), 1, "constructor must not run on a hit");

        *m.get_or_insert_default("z".to_string()) += 1;
        assert_eq!(m.get("z"), Some(&1));
        assert_eq!(keys_in_order(&m), ["k", "z"]);
    }

    /// Invariant: the load bound holds right after every insertion —
    /// growth must already have happened whenever an insert would push
    /// the table past 3/4 full.
    #[test]
    fn load_factor_bound_after_each_insert() {
        let mut m: SeqHashMap<String, usize> = SeqHashMap::new();
        assert_eq!(m.bucket_count(), 16);
        for i in 0..100 {
            m.insert(format!("k{i}"), i);
            assert!(
                m.len() * 4 <= m.bucket_count() * 3,
                "load bound violated at len {}",
                m.len()
            );
        }
        assert_eq!(keys_in_order(&m), (0..100).map(|i| format!("k{i}")).collect::<Vec<_>>());
    }

    /// Invariant: the growth check runs before the duplicate probe, so a
    /// duplicate insert at the threshold still grows the table while
    /// leaving contents and order untouched.
    #[test]
    fn duplicate_insert_still_grows_table() {
        let mut m: SeqHashMap<String, usize> = SeqHashMap::new();
        for i in 0..12 {
            m.insert(format!("k{i}"), i);
        }
        assert_eq!(m.len(), 12);
        assert_eq!(m.bucket_count(), 16);

        let (_, created) = m.insert("k0".to_string(), 999);
        assert!(!created);
        assert_eq!(m.bucket_count(), 32);
        assert_eq!(m.len(), 12);
        assert_eq!(m.get("k0"), Some(&0));
        assert_eq!(keys_in_order(&m), (0..12).map(|i| format!("k{i}")).collect::<Vec<_>>());
    }

    /// Invariant: rehashing redistributes chains only; iteration order and
    /// every mapping survive repeated growth.
    #[test]
    fn rehash_preserves_order_and_contents() {
        let mut m: SeqHashMap<String, usize> = SeqHashMap::new();
        for i in 0..200 {
            m.insert(format!("k{i}"), i);
        }
        assert!(m.bucket_count() > 16);
        for i in 0..200 {
            assert_eq!(m.get(&format!("k{i}")), Some(&i));
        }
        assert_eq!(
            keys_in_order(&m),
            (0..200).map(|i| format!("k{i}")).collect::<Vec<_>>()
        );
    }

    /// Invariant: lookups, erasure, and ordering survive worst-case
    /// collisions (constant hasher forces a single chain).
    #[test]
    fn collision_chains_with_const_hasher() {
        #[derive(Clone, Default)]
        struct ConstBuildHasher;
        struct ConstHasher;
        impl BuildHasher for ConstBuildHasher {
            type Hasher = ConstHasher;
            fn build_hasher(&self) -> Self::Hasher {
                ConstHasher
            }
        }
        impl Hasher for ConstHasher {
            fn write(&mut self, _bytes: &[u8]) {}
            fn finish(&self) -> u64 {
                0
            }
        }

        let mut m: SeqHashMap<String, i32, ConstBuildHasher> =
            SeqHashMap::with_hasher(ConstBuildHasher);
        for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
            m.insert((*k).to_string(), i as i32);
        }
        assert_eq!(
            m.keys().map(String::as_str).collect::<Vec<_>>(),
            ["a", "b", "c", "d"]
        );

        // Erase from the middle of the one shared chain.
        m.erase(m.find(&"b".to_string())).unwrap();
        assert!(m.find(&"b".to_string()).is_end());
        for k in ["a", "c", "d"] {
            assert!(m.contains_key(&k.to_string()));
        }
        assert_eq!(
            m.keys().map(String::as_str).collect::<Vec<_>>(),
            ["a", "c", "d"]
        );
    }

    /// Invariant: `clear` drops everything, keeps capacity, and the map
    /// remains fully usable.
    #[test]
    fn clear_then_reuse() {
        let mut m: SeqHashMap<String, i32> = SeqHashMap::new();
        for i in 0..50 {
            m.insert(format!("k{i}"), i);
        }
        let buckets_before = m.bucket_count();
        m.clear();
        assert_eq!(m.len(), 0);
        assert!(m.is_empty());
        assert_eq!(m.bucket_count(), buckets_before);
        assert!(m.find(&"k0".to_string()).is_end());

        m.insert("fresh".to_string(), 1);
        assert_eq!(keys_in_order(&m), ["fresh"]);
    }

    /// Invariant: a clone is independent in both directions and preserves
    /// the source's order exactly.
    #[test]
    fn clone_is_independent() {
        let mut x: SeqHashMap<String, i32> = SeqHashMap::new();
        for k in ["a", "b", "c"] {
            x.insert(k.to_string(), 1);
        }
        let mut y = x.clone();
        assert_eq!(keys_in_order(&y), ["a", "b", "c"]);
        assert!(x == y);

        y.erase(y.find(&"a".to_string())).unwrap();
        y.insert("d".to_string(), 4);
        *y.get_mut("b").unwrap() = 99;

        assert_eq!(keys_in_order(&x), ["a", "b", "c"]);
        assert_eq!(x.get("b"), Some(&1));
        assert_eq!(keys_in_order(&y), ["b", "c", "d"]);

        x.erase(x.find(&"c".to_string())).unwrap();
        assert_eq!(keys_in_order(&y), ["b", "c", "d"]);
    }

    /// Invariant: cursors minted by the source do not operate on a clone.
    #[test]
    fn clone_does_not_inherit_cursors() {
        let mut x: SeqHashMap<String, i32> = SeqHashMap::new();
        let (c, _) = x.insert("a".to_string(), 1);
        let mut y = x.clone();
        assert_eq!(c.value(&y), None);
        assert_eq!(y.erase(c), Err(InvalidCursor));
        assert_eq!(y.len(), 1);
    }

    /// Invariant: forward and backward iteration agree; `into_iter`
    /// drains in insertion order.
    #[test]
    fn iteration_directions_and_drain() {
        let mut m: SeqHashMap<String, i32> = SeqHashMap::new();
        for (i, k) in ["a", "b", "c"].iter().enumerate() {
            m.insert((*k).to_string(), i as i32);
        }

        let fwd: Vec<_> = m.iter().map(|(k, _)| k.clone()).collect();
        let mut rev: Vec<_> = m.iter().rev().map(|(k, _)| k.clone()).collect();
        rev.reverse();
        assert_eq!(fwd, rev);

        for v in m.values_mut() {
            *v += 10;
        }
        let drained: Vec<_> = m.into_iter().collect();
        assert_eq!(
            drained,
            [
                ("a".to_string(), 10),
                ("b".to_string(), 11),
                ("c".to_string(), 12)
            ]
        );
    }

    /// Invariant: `len`/`is_empty` track live entries only; duplicate
    /// inserts and failed erases leave them unchanged.
    #[test]
    fn len_and_is_empty_behaviors() {
        let mut m: SeqHashMap<String, i32> = SeqHashMap::new();
        assert_eq!(m.len(), 0);
        assert!(m.is_empty());

        m.insert("a".to_string(), 1);
        m.insert("a".to_string(), 2);
        assert_eq!(m.len(), 1);

        let _ = m.erase(m.end_cursor());
        assert_eq!(m.len(), 1);

        m.erase(m.find(&"a".to_string())).unwrap();
        assert_eq!(m.len(), 0);
        assert!(m.is_empty());
    }

    /// Invariant: `remove` by key erases from both structures and returns
    /// the value; absent keys return `None`.
    #[test]
    fn remove_by_key() {
        let mut m: SeqHashMap<String, i32> = SeqHashMap::new();
        for (i, k) in ["a", "b", "c"].iter().enumerate() {
            m.insert((*k).to_string(), i as i32);
        }
        assert_eq!(m.remove("b"), Some(1));
        assert_eq!(m.remove("b"), None);
        assert_eq!(keys_in_order(&m), ["a", "c"]);
    }

    /// Invariant: `FromIterator`/`Extend` keep first insertion per key and
    /// overall order; equality is order-sensitive.
    #[test]
    fn from_iter_extend_and_eq() {
        let m: SeqHashMap<String, i32> = [("a", 1), ("b", 2), ("a", 3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(m.get("a"), Some(&1), "first insertion wins");
        assert_eq!(keys_in_order(&m), ["a", "b"]);

        let mut n: SeqHashMap<String, i32> = SeqHashMap::new();
        n.insert("b".to_string(), 2);
        n.insert("a".to_string(), 1);
        assert!(m != n, "same pairs, different order");
    }
}
