//! HashTable: separately-chained buckets over an index arena, with a
//! freelist of recycled entry slots.

use crate::error::{CreateError, GrowError, InsertError, LinkError};
use crate::iter::{Cursor, Iter};
use crate::key::TableKey;
use crate::list::{self, Link, LinkArena, NodeId};
use crate::pool::{Pool, PoolHandle};
use crate::value::Value;
use crate::LOG_TARGET;
use core::fmt;
use std::borrow::Cow;
use tracing::{debug, trace};

/// Largest number of entries added to the freelist in one growth event.
pub const MAX_GROWTH_INCREMENT: usize = 0xffff;

// Node 0 heads the freelist; nodes 1..=bucket_count head the buckets.
const FREELIST: NodeId = NodeId::new(0);

/// Stable reference to one entry, valid until that entry is deleted.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle {
    node: NodeId,
    generation: u32,
}

impl Handle {
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn key<'t, K, V>(&self, table: &'t HashTable<K, V>) -> Option<&'t K>
    where
        K: TableKey,
    {
        table.handle_slot(*self).map(|s| &s.key)
    }

    pub fn value<'t, K, V>(&self, table: &'t HashTable<K, V>) -> Option<&'t V>
    where
        K: TableKey,
    {
        table.handle_slot(*self).map(|s| &s.value)
    }

    pub fn value_mut<'t, K, V>(&self, table: &'t mut HashTable<K, V>) -> Option<&'t mut V>
    where
        K: TableKey,
    {
        table.handle_slot_mut(*self).map(|s| &mut s.value)
    }
}

/// Parameters for [`HashTable::new`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TableConfig {
    /// Entries placed on the freelist at creation.
    pub initial_entries: usize,
    /// Cap on live entries; 0 means unbounded.
    pub max_entries: usize,
    /// Entries added per growth event, clamped to [`MAX_GROWTH_INCREMENT`].
    pub growth_increment: usize,
    /// Requested bucket count; forced odd.
    pub bucket_hint: usize,
}

impl TableConfig {
    pub const fn new(
        initial_entries: usize,
        max_entries: usize,
        growth_increment: usize,
        bucket_hint: usize,
    ) -> Self {
        Self {
            initial_entries,
            max_entries,
            growth_increment,
            bucket_hint,
        }
    }

    pub const fn with_initial_entries(mut self, n: usize) -> Self {
        self.initial_entries = n;
        self
    }

    pub const fn with_max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    pub const fn with_growth_increment(mut self, n: usize) -> Self {
        self.growth_increment = n;
        self
    }

    pub const fn with_bucket_hint(mut self, n: usize) -> Self {
        self.bucket_hint = n;
        self
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new(16, 0, 16, 31)
    }
}

/// What [`HashTable::set_or_insert`] did.
#[derive(Debug, Eq, PartialEq)]
pub enum SetOutcome<V> {
    /// The key was present; carries the value it replaced.
    Updated(V),
    Inserted,
}

#[derive(Debug)]
pub(crate) struct Slot<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

#[derive(Debug)]
struct Node<K, V> {
    link: Link,
    // Bumped each time the slot returns to the freelist.
    generation: u32,
    slot: Option<Slot<K, V>>,
}

impl<K, V> Node<K, V> {
    fn head(at: NodeId) -> Self {
        Self {
            link: Link::empty(at),
            generation: 0,
            slot: None,
        }
    }

    fn detached() -> Self {
        Self {
            link: Link::DETACHED,
            generation: 0,
            slot: None,
        }
    }
}

struct Nodes<K, V>(Vec<Node<K, V>>);

impl<K, V> Nodes<K, V> {
    #[inline]
    fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.0[id.index()]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        &mut self.0[id.index()]
    }

    #[inline]
    fn slot(&self, id: NodeId) -> Option<&Slot<K, V>> {
        self.node(id).slot.as_ref()
    }

    #[inline]
    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot<K, V>> {
        self.node_mut(id).slot.as_mut()
    }
}

impl<K, V> LinkArena for Nodes<K, V> {
    #[inline]
    fn link(&self, node: NodeId) -> Link {
        self.node(node).link
    }

    #[inline]
    fn link_mut(&mut self, node: NodeId) -> &mut Link {
        &mut self.node_mut(node).link
    }

    fn node_count(&self) -> usize {
        self.0.len()
    }
}

/// A hash table keyed by `u32` or by caller-owned `&str`.
///
/// The bucket array is sized once at creation. Entry slots come from a
/// freelist that grows by `growth_increment` slots whenever it runs dry;
/// deleted entries go back to the freelist and are never deallocated
/// individually.
pub struct HashTable<K, V = Value> {
    name: Cow<'static, str>,
    nodes: Nodes<K, V>,
    bucket_count: usize,
    max_entries: usize,
    live: usize,
    growth_increment: u16,
}

/// Table with integer keys.
pub type IntHashTable<V = Value> = HashTable<u32, V>;

/// Table with string keys borrowed from the caller for `'a`.
pub type StrHashTable<'a, V = Value> = HashTable<&'a str, V>;

/// Pool that hands out table headers.
pub type TablePool<K, V = Value> = Pool<HashTable<K, V>>;

impl<K, V> fmt::Debug for HashTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTable")
            .field("name", &self.name)
            .field("bucket_count", &self.bucket_count)
            .field("max_entries", &self.max_entries)
            .field("live", &self.live)
            .field("growth_increment", &self.growth_increment)
            .finish_non_exhaustive()
    }
}

impl<K> HashTable<K, Value>
where
    K: TableKey,
{
    /// Create a table holding [`Value`] payloads.
    ///
    /// See [`HashTable::with_value_type`] for tables over another value
    /// type.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        config: TableConfig,
    ) -> Result<Self, CreateError> {
        Self::with_value_type(name, config)
    }
}

impl<K, V> HashTable<K, V>
where
    K: TableKey,
{
    /// Create a table and eagerly fill its freelist with
    /// `config.initial_entries` slots.
    ///
    /// Fails only when the bucket array cannot be allocated. A refused
    /// initial growth is logged and leaves the freelist empty; the first
    /// insert will try to grow again.
    pub fn with_value_type(
        name: impl Into<Cow<'static, str>>,
        config: TableConfig,
    ) -> Result<Self, CreateError> {
        let name = name.into();
        let bucket_count = config.bucket_hint | 1;
        let alloc_failed = |name: &str| CreateError::BucketAlloc {
            name: name.to_owned(),
            bucket_count,
        };
        let heads = match bucket_count.checked_add(1) {
            Some(n) if n <= NodeId::MAX_NODES => n,
            _ => return Err(alloc_failed(&*name)),
        };
        let mut nodes = Vec::new();
        if nodes.try_reserve_exact(heads).is_err() {
            return Err(alloc_failed(&*name));
        }
        nodes.extend((0..heads).map(|i| Node::head(NodeId::from_index(i))));

        let mut table = Self {
            name,
            nodes: Nodes(nodes),
            bucket_count,
            max_entries: config.max_entries,
            live: 0,
            growth_increment: config.growth_increment.min(MAX_GROWTH_INCREMENT) as u16,
        };
        if config.initial_entries > 0 {
            if let Err(err) = table.grow(config.initial_entries) {
                debug!(target: LOG_TARGET, table = %table.name, %err, "initial growth refused");
            }
        }
        debug!(
            target: LOG_TARGET,
            table = %table.name,
            bucket_count,
            capacity = table.capacity(),
            "created hash table"
        );
        Ok(table)
    }

    /// Create a table whose header lives in `pool`.
    ///
    /// The first table created in a pool installs the stats printer as the
    /// pool's print helper.
    pub fn create_in(
        pool: &mut TablePool<K, V>,
        name: impl Into<Cow<'static, str>>,
        config: TableConfig,
    ) -> Result<PoolHandle, CreateError> {
        if !pool.has_print_helper() {
            pool.set_print_helper(Self::print_stats);
        }
        let name = name.into();
        let table = Self::with_value_type(name.clone(), config)?;
        Ok(pool.allocate(name, table)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn growth_increment(&self) -> usize {
        usize::from(self.growth_increment)
    }

    /// Entry slots allocated so far, live or free.
    pub fn capacity(&self) -> usize {
        self.nodes.0.len() - self.first_entry_index()
    }

    /// Slots waiting on the freelist.
    pub fn free_count(&self) -> usize {
        self.capacity() - self.live
    }

    #[inline]
    fn first_entry_index(&self) -> usize {
        self.bucket_count + 1
    }

    #[inline]
    pub(crate) fn bucket_head(&self, bucket: usize) -> NodeId {
        NodeId::from_index(bucket + 1)
    }

    #[inline]
    fn bucket_of(&self, query: &K::Query) -> usize {
        K::hash_query(query) as usize % self.bucket_count
    }

    /// Bucket head for `query`, and the matching entry if present.
    fn lookup(&self, query: &K::Query) -> (NodeId, Option<NodeId>) {
        let head = self.bucket_head(self.bucket_of(query));
        let found = list::walk(&self.nodes, head).find(|&id| {
            self.nodes
                .slot(id)
                .is_some_and(|s| s.key.as_query() == query)
        });
        (head, found)
    }

    pub fn find(&self, query: &K::Query) -> Option<Handle> {
        let (_, found) = self.lookup(query);
        found.map(|id| self.handle_of(id))
    }

    pub fn contains_key(&self, query: &K::Query) -> bool {
        self.lookup(query).1.is_some()
    }

    pub fn get(&self, query: &K::Query) -> Option<&V> {
        let (_, found) = self.lookup(query);
        self.nodes.slot(found?).map(|s| &s.value)
    }

    pub fn get_mut(&mut self, query: &K::Query) -> Option<&mut V> {
        let (_, found) = self.lookup(query);
        self.nodes.slot_mut(found?).map(|s| &mut s.value)
    }

    /// Insert `key` unless it is already present.
    ///
    /// On any error the table is unchanged.
    pub fn add_if_absent(&mut self, key: K, value: V) -> Result<Handle, InsertError> {
        let (head, found) = self.lookup(key.as_query());
        if found.is_some() {
            return Err(InsertError::DuplicateKey);
        }
        Ok(self.insert_at(head, key, value)?)
    }

    /// Overwrite the value of `key` if present, insert it otherwise.
    ///
    /// An overwrite leaves the stored key untouched.
    pub fn set_or_insert(&mut self, key: K, value: V) -> Result<SetOutcome<V>, GrowError> {
        let (head, found) = self.lookup(key.as_query());
        if let Some(slot) = found.and_then(|id| self.nodes.slot_mut(id)) {
            return Ok(SetOutcome::Updated(core::mem::replace(&mut slot.value, value)));
        }
        self.insert_at(head, key, value)?;
        Ok(SetOutcome::Inserted)
    }

    /// Remove `query`'s entry and recycle its slot, handing back the
    /// caller-owned key and value.
    pub fn delete(&mut self, query: &K::Query) -> Option<(K, V)> {
        let (_, found) = self.lookup(query);
        self.recycle(found?)
    }

    /// Remove the entry `handle` refers to; `None` if the handle is stale.
    pub fn delete_entry(&mut self, handle: Handle) -> Option<(K, V)> {
        if !self.is_live(handle) {
            return None;
        }
        self.recycle(handle.node)
    }

    /// Start a traversal that tolerates deleting the entry it just returned.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Walk the freelist and every bucket chain, checking link integrity
    /// and that each slot is in exactly one collection.
    pub fn verify_links(&self) -> Result<(), LinkError> {
        let free = list::verify(&self.nodes, FREELIST)?;
        let mut chained = 0;
        for bucket in 0..self.bucket_count {
            let head = self.bucket_head(bucket);
            chained += list::verify(&self.nodes, head)?;
            for id in list::walk(&self.nodes, head) {
                let placed = self
                    .nodes
                    .slot(id)
                    .is_some_and(|s| self.bucket_of(s.key.as_query()) == bucket);
                if !placed {
                    return Err(LinkError::Misplaced {
                        node: id.raw(),
                        bucket,
                    });
                }
            }
        }
        if chained != self.live || chained + free != self.capacity() {
            return Err(LinkError::Membership {
                chained,
                free,
                live: self.live,
                allocated: self.capacity(),
            });
        }
        Ok(())
    }

    pub(crate) fn is_live(&self, handle: Handle) -> bool {
        self.handle_slot(handle).is_some()
    }

    fn handle_slot(&self, h: Handle) -> Option<&Slot<K, V>> {
        let index = h.node.index();
        if index < self.first_entry_index() {
            return None;
        }
        self.nodes
            .0
            .get(index)
            .filter(|n| n.generation == h.generation)
            .and_then(|n| n.slot.as_ref())
    }

    fn handle_slot_mut(&mut self, h: Handle) -> Option<&mut Slot<K, V>> {
        let index = h.node.index();
        if index < self.first_entry_index() {
            return None;
        }
        self.nodes
            .0
            .get_mut(index)
            .filter(|n| n.generation == h.generation)
            .and_then(|n| n.slot.as_mut())
    }

    pub(crate) fn handle_of(&self, id: NodeId) -> Handle {
        Handle {
            node: id,
            generation: self.nodes.node(id).generation,
        }
    }

    pub(crate) fn slot_of(&self, h: Handle) -> Option<&Slot<K, V>> {
        self.handle_slot(h)
    }

    /// First entry of the first non-empty bucket at or after `bucket`.
    pub(crate) fn first_from(&self, bucket: usize) -> Option<(usize, Handle)> {
        (bucket..self.bucket_count).find_map(|b| {
            list::first(&self.nodes, self.bucket_head(b)).map(|id| (b, self.handle_of(id)))
        })
    }

    /// Entry after `current`, which must be live in `bucket`.
    pub(crate) fn successor(&self, bucket: usize, current: Handle) -> Option<(usize, Handle)> {
        match list::next_after(&self.nodes, self.bucket_head(bucket), current.node) {
            Some(id) => Some((bucket, self.handle_of(id))),
            None => self.first_from(bucket + 1),
        }
    }

    pub(crate) fn chain_len(&self, bucket: usize) -> usize {
        list::walk(&self.nodes, self.bucket_head(bucket)).count()
    }

    fn insert_at(&mut self, head: NodeId, key: K, value: V) -> Result<Handle, GrowError> {
        let id = self.take_free()?;
        let node = self.nodes.node_mut(id);
        node.slot = Some(Slot { key, value });
        let handle = Handle {
            node: id,
            generation: node.generation,
        };
        list::insert_front(&mut self.nodes, head, id);
        self.live += 1;
        Ok(handle)
    }

    fn recycle(&mut self, id: NodeId) -> Option<(K, V)> {
        list::unlink(&mut self.nodes, id)?;
        let node = self.nodes.node_mut(id);
        node.generation = node.generation.wrapping_add(1);
        let slot = node.slot.take();
        list::insert_front(&mut self.nodes, FREELIST, id);
        self.live -= 1;
        slot.map(|s| (s.key, s.value))
    }

    /// Pop a free slot, growing the freelist once if it is empty.
    fn take_free(&mut self) -> Result<NodeId, GrowError> {
        if let Some(id) = list::remove_first(&mut self.nodes, FREELIST) {
            return Ok(id);
        }
        self.grow(self.growth_increment())?;
        list::remove_first(&mut self.nodes, FREELIST).ok_or(GrowError::ZeroIncrement)
    }

    /// Allocate `count` slots and put them on the freelist.
    fn grow(&mut self, count: usize) -> Result<usize, GrowError> {
        if count == 0 {
            return Err(GrowError::ZeroIncrement);
        }
        if self.max_entries != 0 && self.live.saturating_add(count) > self.max_entries {
            return Err(GrowError::CapExceeded {
                requested: count,
                live: self.live,
                max_entries: self.max_entries,
            });
        }
        let start = self.nodes.0.len();
        let end = match start.checked_add(count) {
            Some(end) if end <= NodeId::MAX_NODES => end,
            _ => return Err(GrowError::AllocFailed { requested: count }),
        };
        self.nodes
            .0
            .try_reserve(count)
            .map_err(|_| GrowError::AllocFailed { requested: count })?;
        for index in start..end {
            self.nodes.0.push(Node::detached());
            list::insert_front(&mut self.nodes, FREELIST, NodeId::from_index(index));
        }
        trace!(
            target: LOG_TARGET,
            table = %self.name,
            added = count,
            capacity = self.capacity(),
            "grew freelist"
        );
        Ok(count)
    }
}

impl<'a, K, V> IntoIterator for &'a HashTable<K, V>
where
    K: TableKey,
{
    type Item = (Handle, &'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}
