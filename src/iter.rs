//! Traversal over every live entry, bucket by bucket.
//!
//! Buckets are visited in index order and each chain front to back, so
//! within a bucket the most recently inserted entry comes first. The cursor
//! always holds the entry it will return *next*; it advances past that
//! entry before handing it out, which is what makes deleting the returned
//! entry safe. Entries inserted mid-traversal may or may not be seen.

use crate::hash_table::{Handle, HashTable};
use crate::key::TableKey;
use core::iter::FusedIterator;

/// Resumable position in a table traversal.
///
/// Holds no borrow of the table, so the table can be mutated between
/// steps. Pass the same table to every call of [`Cursor::next`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cursor {
    bucket: usize,
    pending: Option<Handle>,
}

impl Cursor {
    /// Position at the first live entry, or exhausted if there is none.
    pub fn new<K: TableKey, V>(table: &HashTable<K, V>) -> Self {
        match table.first_from(0) {
            Some((bucket, handle)) => Cursor {
                bucket,
                pending: Some(handle),
            },
            None => Cursor::exhausted(),
        }
    }

    fn exhausted() -> Self {
        Cursor {
            bucket: 0,
            pending: None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.pending.is_none()
    }

    /// Return the current entry and step past it.
    #[allow(clippy::should_implement_trait)]
    pub fn next<K: TableKey, V>(&mut self, table: &HashTable<K, V>) -> Option<Handle> {
        let mut current = self.pending?;
        if !table.is_live(current) {
            // Removed behind our back: its links now belong to the freelist.
            match table.first_from(self.bucket + 1) {
                Some((bucket, handle)) => {
                    self.bucket = bucket;
                    current = handle;
                }
                None => {
                    *self = Cursor::exhausted();
                    return None;
                }
            }
        }
        match table.successor(self.bucket, current) {
            Some((bucket, handle)) => {
                self.bucket = bucket;
                self.pending = Some(handle);
            }
            None => *self = Cursor::exhausted(),
        }
        Some(current)
    }
}

/// Borrowing iterator over `(handle, key, value)` of every live entry.
pub struct Iter<'a, K, V> {
    table: &'a HashTable<K, V>,
    cursor: Cursor,
}

impl<'a, K: TableKey, V> Iter<'a, K, V> {
    pub(crate) fn new(table: &'a HashTable<K, V>) -> Self {
        Self {
            table,
            cursor: Cursor::new(table),
        }
    }
}

impl<'a, K: TableKey, V> Iterator for Iter<'a, K, V> {
    type Item = (Handle, &'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor.next(self.table)?;
        let slot = self.table.slot_of(handle)?;
        Some((handle, &slot.key, &slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.cursor.is_exhausted() {
            (0, Some(0))
        } else {
            (1, Some(self.table.len()))
        }
    }
}

impl<'a, K: TableKey, V> FusedIterator for Iter<'a, K, V> {}
