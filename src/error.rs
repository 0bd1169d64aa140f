//! Error types for table creation, growth, insertion and the pool.

use thiserror::Error;

/// Why the freelist could not be grown.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum GrowError {
    /// The table was configured with a growth increment of zero.
    #[error("growth increment is zero")]
    ZeroIncrement,

    /// Adding `requested` entries on top of `live` would exceed the cap.
    #[error("growing by {requested} entries with {live} live would exceed the cap of {max_entries}")]
    CapExceeded {
        requested: usize,
        live: usize,
        max_entries: usize,
    },

    /// Storage for `requested` more entries could not be obtained.
    #[error("unable to allocate storage for {requested} entries")]
    AllocFailed { requested: usize },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum InsertError {
    #[error("an entry with this key is already present")]
    DuplicateKey,

    #[error("no free entry available: {0}")]
    Exhausted(#[from] GrowError),
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CreateError {
    #[error("unable to allocate {bucket_count} buckets for table '{name}'")]
    BucketAlloc {
        name: String,
        bucket_count: usize,
    },

    #[error(transparent)]
    Pool(#[from] PoolError),
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PoolError {
    #[error("pool '{pool}' is full ({capacity} objects)")]
    Full { pool: &'static str, capacity: usize },
}

/// A broken invariant found while walking a circular list.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum LinkError {
    #[error("node {node} is detached while reachable from a list head")]
    Detached { node: u32 },

    #[error("node {node} points back to {found} instead of {expected}")]
    BackLink { node: u32, expected: u32, found: u32 },

    #[error("list walk from head {head} did not return within {limit} steps")]
    Unterminated { head: u32, limit: usize },

    #[error("entry {node} is chained under bucket {bucket} but is empty or hashes elsewhere")]
    Misplaced { node: u32, bucket: usize },

    #[error("{chained} chained and {free} free entries disagree with {live} live of {allocated} allocated")]
    Membership {
        chained: usize,
        free: usize,
        live: usize,
        allocated: usize,
    },
}
