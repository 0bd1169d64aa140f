//! The two key kinds a table can be built over, and their bucket hashes.
//!
//! Both hashes are fixed and non-cryptographic; they are part of the
//! table's observable layout (bucket order drives iteration order), so
//! they must not change.

/// Hash of an integer key: `278 * key + 12345`, wrapping.
#[inline]
pub const fn hash_int(key: u32) -> u32 {
    key.wrapping_mul(278).wrapping_add(12345)
}

/// Rolling hash of a string key's bytes, seeded at zero.
#[inline]
pub fn hash_str(key: &str) -> u32 {
    key.bytes()
        .fold(0u32, |hash, b| (hash >> 16).wrapping_add((hash << 5) ^ u32::from(b)))
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u32 {}
    impl<'a> Sealed for &'a str {}
}

/// A key kind accepted by [`HashTable`](crate::HashTable).
///
/// Implemented for `u32` (integer keys) and `&str` (string keys borrowed
/// from the caller). Lookups take the borrowed `Query` form so a string
/// table can be probed with any `&str`, whatever its lifetime.
pub trait TableKey: Copy + sealed::Sealed {
    type Query: ?Sized + Eq;

    fn as_query(&self) -> &Self::Query;

    fn hash_query(query: &Self::Query) -> u32;
}

impl TableKey for u32 {
    type Query = u32;

    #[inline]
    fn as_query(&self) -> &u32 {
        self
    }

    #[inline]
    fn hash_query(query: &u32) -> u32 {
        hash_int(*query)
    }
}

impl<'a> TableKey for &'a str {
    type Query = str;

    #[inline]
    fn as_query(&self) -> &str {
        self
    }

    #[inline]
    fn hash_query(query: &str) -> u32 {
        hash_str(query)
    }
}
