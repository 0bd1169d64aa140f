//! chained-hashtab: a single-threaded, separately-chained hash table for
//! integer or string keys, with freelist recycling of entry slots.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: predictable memory behavior for small and real-time systems.
//!   The bucket array is sized once; entry slots are allocated in blocks
//!   and recycled through a freelist instead of being freed one by one.
//! - Layers:
//!   - `list`: circular doubly-linked lists whose links live in an index
//!     arena. An empty head points at itself; splice and unlink are O(1).
//!   - `HashTable<K, V>`: one arena holding the freelist head, the bucket
//!     heads and every entry slot. Each bucket chain and the freelist is a
//!     `list` over that arena.
//!   - `Cursor`/`Iter`: traversal in bucket order that steps past an entry
//!     before returning it.
//!   - `Pool<T>`: explicitly constructed store for table headers, with a
//!     print helper used to report statistics for every table it holds.
//!
//! Constraints
//! - Single-threaded: no locks or atomics. Callers sharing a table across
//!   threads wrap every call, iteration included, in their own lock.
//! - Bucket count is forced odd and never changes.
//! - `live <= max_entries` whenever a cap is set; growth is refused
//!   rather than exceeding it.
//! - A slot is either on one bucket chain (live) or on the freelist
//!   (free). Growth only adds free slots.
//!
//! Keys and values
//! - Keys are `u32` or `&str`, selected by the `TableKey` type parameter
//!   (`IntHashTable`, `StrHashTable`). String keys are borrowed; the table
//!   never copies or frees them. Comparison is exact and case-sensitive.
//! - Values default to `Value`, a pointer-sized payload readable as an
//!   unsigned integer, a signed integer or a raw pointer.
//!
//! Hashing
//! - Integer: `278 * k + 12345`. String: `h = (h >> 16) + ((h << 5) ^ b)`
//!   over the bytes, from zero. Both are 32-bit wrapping; the bucket is
//!   `hash % bucket_count`.
//!
//! Failure model
//! - Missing keys and duplicate inserts are ordinary results, not errors
//!   that unwind. Allocation failure is detected through fallible
//!   reservation and reported as `GrowError`; a failed insert leaves the
//!   table unchanged.
//! - With the `link-check` feature every splice re-walks the touched list
//!   and the process aborts on a broken link, since a corrupted arena
//!   cannot be repaired. `HashTable::verify_links` runs the same checks on
//!   demand and returns the problem instead.
//!
//! Handles
//! - `Handle` is an arena index plus a generation bumped whenever the slot
//!   returns to the freelist, so a handle to a deleted entry never
//!   resolves to whatever reuses its slot.

pub mod error;
pub mod hash_table;
#[cfg(test)]
mod hash_table_proptest;
pub mod iter;
pub mod key;
pub mod list;
pub mod pool;
pub mod stats;
pub mod value;

pub(crate) const LOG_TARGET: &str = "hashtab";

// Public surface
pub use error::{CreateError, GrowError, InsertError, LinkError, PoolError};
pub use hash_table::{
    Handle, HashTable, IntHashTable, SetOutcome, StrHashTable, TableConfig, TablePool,
    MAX_GROWTH_INCREMENT,
};
pub use iter::{Cursor, Iter};
pub use key::TableKey;
pub use pool::{Pool, PoolHandle};
pub use stats::{TableStats, MAX_CHAIN_LEN};
pub use value::Value;
