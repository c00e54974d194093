//! Bidirectional cursors over the insertion-order list.
//!
//! Cursors are small `Copy` tokens, detached from the map the way handles
//! are: they hold the entry's slot key (or nothing, for past-the-end) plus
//! the owner token of the map that minted them, and every accessor takes
//! the map explicitly. The owner token is what lets `erase` reject a
//! cursor minted by a different map, without comparing container
//! addresses.
//!
//! Navigation is saturating rather than checked: advancing the
//! past-the-end cursor or retreating past the head leaves the cursor
//! where it is. Callers that want the last entry start from
//! [`SeqHashMap::tail_cursor`], not from decrementing past-the-end. This
//! no-op behavior is a non-guarantee kept for compatibility with the
//! container's traversal conventions, not a contract worth relying on.

use core::hash::{Hash, Hasher};
use core::sync::atomic::{AtomicU64, Ordering};

use slotmap::DefaultKey;

use crate::seq_hash_map::SeqHashMap;

/// Identity token for one map instance. Minted from a process-wide
/// counter, so two maps never share a token and a clone gets a fresh one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct MapId(u64);

impl MapId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        MapId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Read-only cursor: references one live entry or past-the-end.
///
/// Obtained from [`SeqHashMap::find`], [`SeqHashMap::head_cursor`], and
/// friends, or by converting a [`CursorMut`]. Accessors return `None` for
/// past-the-end, for a cursor whose entry has been erased, and for a
/// cursor shown to a map that did not mint it.
#[derive(Copy, Clone, Debug)]
pub struct Cursor {
    pub(crate) slot: Option<DefaultKey>,
    pub(crate) owner: MapId,
}

/// Mutable-flavor cursor: everything [`Cursor`] offers plus
/// [`value_mut`](CursorMut::value_mut). A `Cursor` can be made from a
/// `CursorMut`; there is no conversion back.
#[derive(Copy, Clone, Debug)]
pub struct CursorMut {
    pub(crate) slot: Option<DefaultKey>,
    pub(crate) owner: MapId,
}

// Two cursors are equal iff both are past-the-end, or they reference the
// same entry of the same map. End cursors compare equal across maps.
fn cursor_eq(a: (Option<DefaultKey>, MapId), b: (Option<DefaultKey>, MapId)) -> bool {
    match (a.0, b.0) {
        (None, None) => true,
        (Some(x), Some(y)) => x == y && a.1 == b.1,
        _ => false,
    }
}

fn cursor_hash<H: Hasher>(slot: Option<DefaultKey>, owner: MapId, state: &mut H) {
    slot.hash(state);
    if slot.is_some() {
        owner.hash(state);
    }
}

impl Cursor {
    /// Whether this is the past-the-end cursor.
    pub fn is_end(&self) -> bool {
        self.slot.is_none()
    }

    /// Borrow the entry's key from its owning map.
    pub fn key<'a, K, V, S>(&self, map: &'a SeqHashMap<K, V, S>) -> Option<&'a K> {
        map.cursor_key(self.slot, self.owner)
    }

    /// Borrow the entry's value from its owning map.
    pub fn value<'a, K, V, S>(&self, map: &'a SeqHashMap<K, V, S>) -> Option<&'a V> {
        map.cursor_value(self.slot, self.owner)
    }

    /// The cursor one step toward the tail. Saturates at past-the-end.
    #[must_use]
    pub fn next<K, V, S>(self, map: &SeqHashMap<K, V, S>) -> Cursor {
        Cursor {
            slot: map.cursor_next(self.slot, self.owner),
            owner: self.owner,
        }
    }

    /// The cursor one step toward the head; the head's predecessor is
    /// past-the-end. Saturates there.
    #[must_use]
    pub fn prev<K, V, S>(self, map: &SeqHashMap<K, V, S>) -> Cursor {
        Cursor {
            slot: map.cursor_prev(self.slot, self.owner),
            owner: self.owner,
        }
    }
}

impl CursorMut {
    /// Whether this is the past-the-end cursor.
    pub fn is_end(&self) -> bool {
        self.slot.is_none()
    }

    /// Borrow the entry's key from its owning map. Keys are immutable for
    /// the lifetime of the entry; there is no `key_mut`.
    pub fn key<'a, K, V, S>(&self, map: &'a SeqHashMap<K, V, S>) -> Option<&'a K> {
        map.cursor_key(self.slot, self.owner)
    }

    /// Borrow the entry's value from its owning map.
    pub fn value<'a, K, V, S>(&self, map: &'a SeqHashMap<K, V, S>) -> Option<&'a V> {
        map.cursor_value(self.slot, self.owner)
    }

    /// Mutably borrow the entry's value from its owning map.
    pub fn value_mut<'a, K, V, S>(&self, map: &'a mut SeqHashMap<K, V, S>) -> Option<&'a mut V> {
        map.cursor_value_mut(self.slot, self.owner)
    }

    /// The read-only view of this cursor.
    pub fn as_cursor(&self) -> Cursor {
        Cursor {
            slot: self.slot,
            owner: self.owner,
        }
    }

    /// The cursor one step toward the tail. Saturates at past-the-end.
    #[must_use]
    pub fn next<K, V, S>(self, map: &SeqHashMap<K, V, S>) -> CursorMut {
        CursorMut {
            slot: map.cursor_next(self.slot, self.owner),
            owner: self.owner,
        }
    }

    /// The cursor one step toward the head; the head's predecessor is
    /// past-the-end. Saturates there.
    #[must_use]
    pub fn prev<K, V, S>(self, map: &SeqHashMap<K, V, S>) -> CursorMut {
        CursorMut {
            slot: map.cursor_prev(self.slot, self.owner),
            owner: self.owner,
        }
    }
}

impl From<CursorMut> for Cursor {
    fn from(c: CursorMut) -> Cursor {
        c.as_cursor()
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        cursor_eq((self.slot, self.owner), (other.slot, other.owner))
    }
}

impl Eq for Cursor {}

impl PartialEq for CursorMut {
    fn eq(&self, other: &Self) -> bool {
        cursor_eq((self.slot, self.owner), (other.slot, other.owner))
    }
}

impl Eq for CursorMut {}

impl PartialEq<CursorMut> for Cursor {
    fn eq(&self, other: &CursorMut) -> bool {
        cursor_eq((self.slot, self.owner), (other.slot, other.owner))
    }
}

impl PartialEq<Cursor> for CursorMut {
    fn eq(&self, other: &Cursor) -> bool {
        cursor_eq((self.slot, self.owner), (other.slot, other.owner))
    }
}

impl Hash for Cursor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        cursor_hash(self.slot, self.owner, state);
    }
}

impl Hash for CursorMut {
    fn hash<H: Hasher>(&self, state: &mut H) {
        cursor_hash(self.slot, self.owner, state);
    }
}
