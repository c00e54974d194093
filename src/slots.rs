//! Entry pool: the slot map that owns every live entry.
//!
//! An entry is created exactly once per successful insertion and removed
//! exactly once per erase, clear, or drop of the map. The generational
//! keys handed out by the slot map double as entry identity: a key minted
//! for an erased entry never resolves again, even if the physical slot is
//! reused.

use slotmap::{DefaultKey, SlotMap};

/// One live key/value pair plus its membership links.
///
/// `bucket_next`/`bucket_prev` thread the entry into its collision chain;
/// `order_next`/`order_prev` thread it into the global insertion-order
/// list. The two link pairs are independent: rehashing rewrites the
/// bucket links and never touches the order links.
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Hash of `key` under the map's hasher, computed once at insertion.
    /// Indexing always uses this stored hash, so `K: Hash` is never
    /// invoked again after the entry exists (rehashing runs no user code).
    pub(crate) hash: u64,
    pub(crate) bucket_next: Option<DefaultKey>,
    pub(crate) bucket_prev: Option<DefaultKey>,
    pub(crate) order_next: Option<DefaultKey>,
    pub(crate) order_prev: Option<DefaultKey>,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V, hash: u64) -> Self {
        Entry {
            key,
            value,
            hash,
            bucket_next: None,
            bucket_prev: None,
            order_next: None,
            order_prev: None,
        }
    }
}

/// Storage using generational keys; the map is its sole owner.
pub(crate) type Slots<K, V> = SlotMap<DefaultKey, Entry<K, V>>;
