//! seq-hashmap: A single-threaded hash map that iterates its entries in
//! the order their keys were first inserted.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: combine hash-table lookup cost with a stable, observable
//!   insertion order, in safe, verifiable layers so each piece can be
//!   reasoned about independently.
//! - One pool of entries, two structures over it:
//!   - slots: a `SlotMap` owning every live entry (key, value, stored
//!     hash, four link slots). Generational keys give entry identity;
//!     a key for an erased entry never resolves again.
//!   - `BucketIndex`: chaining hash table mapping `hash % capacity` to a
//!     chain of entries. Capacity starts at 16 and doubles whenever the
//!     load factor would pass 3/4; growth relinks chains from the stored
//!     hashes and never calls back into `K: Hash`.
//!   - `OrderList`: a doubly linked list threading all live entries in
//!     first-insertion order. Rehashing never touches it, which is what
//!     makes iteration order survive growth.
//! - Cursors: detached `Copy` tokens (`Cursor`/`CursorMut`) carrying a
//!   slot key plus the owner map's identity token; accessors take the map
//!   and return `Option`, `erase` validates ownership and rejects
//!   past-the-end, foreign, and stale cursors.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by design (no atomics in the hot
//!   path; the identity mint is the only atomic).
//! - Unique keys under `K: Eq`; inserting a present key is a no-op that
//!   neither replaces the value nor moves the entry.
//! - O(1) average lookups; O(1) erase given a cursor; iteration walks the
//!   order list, never the buckets.
//! - Reentrancy: disallowed while an operation may observe half-patched
//!   links (probes run `K: Hash`/`K: Eq`; `get_or_insert_with` runs a
//!   user constructor). Enforced by a debug-only guard, free in release.
//!
//! Growth policy
//! - The capacity check runs before the duplicate probe of every
//!   insertion attempt, so an insert that turns out to be a duplicate can
//!   still grow the table. `bucket_count()` makes the policy observable.
//!
//! Hasher and rehashing invariants
//! - Each entry stores a precomputed `u64` hash and indexing always uses
//!   the stored hash; `K: Hash` is never invoked after insertion. This
//!   avoids rehash-time calls into user code.
//!
//! Notes and non-goals
//! - Not an LRU: order is first-insertion order, never access recency.
//!   Erasing and re-inserting a key sends it to the back.
//! - No shrinking: erase and clear keep the bucket capacity.
//! - Keys are immutable post-insert; there is no `key_mut`.
//! - Copying (`Clone`) re-inserts entries in order into a fresh map with
//!   its own identity token; cursors never transfer between maps.

mod buckets;
mod cursor;
mod iter;
mod order;
mod reentrancy;
pub mod seq_hash_map;
mod seq_hash_map_proptest;
mod slots;

// Public surface
pub use cursor::{Cursor, CursorMut};
pub use iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
pub use reentrancy::{DebugReentrancy, ReentrancyGuard};
pub use seq_hash_map::{InvalidCursor, OutOfBounds, SeqHashMap};
