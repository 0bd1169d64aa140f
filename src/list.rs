//! Circular doubly-linked lists threaded through an index arena.
//!
//! A list head is an ordinary node whose links point at itself while the
//! list is empty. The last entry's `next` is the head and the head's `prev`
//! is the last entry, so both ends are reachable in O(1). Nodes are named
//! by `NodeId` indices into whatever storage implements [`LinkArena`]; the
//! same node can serve as a head or be linked into another head's list,
//! never both.
//!
//! A node that belongs to no list carries [`Link::DETACHED`]. Splicing a
//! node that is still linked elsewhere corrupts both lists; callers unlink
//! first. None of these operations allocate.

use crate::error::LinkError;

/// Index of a node inside a [`LinkArena`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(u32);

impl NodeId {
    /// Stored in both links of a node that belongs to no list.
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Number of addressable nodes; `NONE` is excluded.
    pub const MAX_NODES: usize = u32::MAX as usize;

    pub const fn new(raw: u32) -> Self {
        NodeId(raw)
    }

    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < Self::MAX_NODES, "node index {index} out of range");
        NodeId(index as u32)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Forward and backward links of one node.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Link {
    prev: NodeId,
    next: NodeId,
}

impl Link {
    pub const DETACHED: Link = Link {
        prev: NodeId::NONE,
        next: NodeId::NONE,
    };

    /// Links of an empty head located at `at`.
    pub const fn empty(at: NodeId) -> Link {
        Link { prev: at, next: at }
    }

    #[inline]
    pub const fn prev(&self) -> NodeId {
        self.prev
    }

    #[inline]
    pub const fn next(&self) -> NodeId {
        self.next
    }

    #[inline]
    pub fn is_detached(&self) -> bool {
        self.prev == NodeId::NONE || self.next == NodeId::NONE
    }
}

/// Storage that holds one [`Link`] per node.
pub trait LinkArena {
    fn link(&self, node: NodeId) -> Link;
    fn link_mut(&mut self, node: NodeId) -> &mut Link;
    fn node_count(&self) -> usize;
}

impl LinkArena for [Link] {
    #[inline]
    fn link(&self, node: NodeId) -> Link {
        self[node.index()]
    }

    #[inline]
    fn link_mut(&mut self, node: NodeId) -> &mut Link {
        &mut self[node.index()]
    }

    fn node_count(&self) -> usize {
        self.len()
    }
}

impl LinkArena for Vec<Link> {
    #[inline]
    fn link(&self, node: NodeId) -> Link {
        self.as_slice().link(node)
    }

    #[inline]
    fn link_mut(&mut self, node: NodeId) -> &mut Link {
        self.as_mut_slice().link_mut(node)
    }

    fn node_count(&self) -> usize {
        self.len()
    }
}

/// Make `node` an empty, self-referential head.
pub fn init<A: LinkArena + ?Sized>(arena: &mut A, node: NodeId) {
    *arena.link_mut(node) = Link::empty(node);
}

pub fn is_empty<A: LinkArena + ?Sized>(arena: &A, head: NodeId) -> bool {
    arena.link(head).next == head
}

pub fn first<A: LinkArena + ?Sized>(arena: &A, head: NodeId) -> Option<NodeId> {
    let front = arena.link(head).next;
    (front != head).then_some(front)
}

pub fn last<A: LinkArena + ?Sized>(arena: &A, head: NodeId) -> Option<NodeId> {
    let back = arena.link(head).prev;
    (back != head).then_some(back)
}

/// The entry following `node` in the list headed by `head`, if any.
pub fn next_after<A: LinkArena + ?Sized>(arena: &A, head: NodeId, node: NodeId) -> Option<NodeId> {
    let next = arena.link(node).next;
    (next != head).then_some(next)
}

/// Splice `entry` immediately after `head`.
pub fn insert_front<A: LinkArena + ?Sized>(arena: &mut A, head: NodeId, entry: NodeId) {
    let old_front = arena.link(head).next;
    *arena.link_mut(entry) = Link {
        prev: head,
        next: old_front,
    };
    arena.link_mut(old_front).prev = entry;
    arena.link_mut(head).next = entry;
    debug_check(arena, head);
}

/// Splice `entry` immediately before `head`, making it the last entry.
pub fn append_back<A: LinkArena + ?Sized>(arena: &mut A, head: NodeId, entry: NodeId) {
    let old_back = arena.link(head).prev;
    *arena.link_mut(entry) = Link {
        prev: old_back,
        next: head,
    };
    arena.link_mut(old_back).next = entry;
    arena.link_mut(head).prev = entry;
    debug_check(arena, head);
}

/// Pop the first entry; `None` when the list is empty.
pub fn remove_first<A: LinkArena + ?Sized>(arena: &mut A, head: NodeId) -> Option<NodeId> {
    let front = first(arena, head)?;
    let after = arena.link(front).next;
    arena.link_mut(head).next = after;
    arena.link_mut(after).prev = head;
    *arena.link_mut(front) = Link::DETACHED;
    debug_check(arena, head);
    Some(front)
}

/// Pop the last entry; `None` when the list is empty.
pub fn remove_last<A: LinkArena + ?Sized>(arena: &mut A, head: NodeId) -> Option<NodeId> {
    let back = last(arena, head)?;
    let before = arena.link(back).prev;
    arena.link_mut(head).prev = before;
    arena.link_mut(before).next = head;
    *arena.link_mut(back) = Link::DETACHED;
    debug_check(arena, head);
    Some(back)
}

/// Remove `entry` from whichever list holds it.
///
/// Returns `None` without touching anything when `entry` is already
/// detached or links only to itself (an empty head).
pub fn unlink<A: LinkArena + ?Sized>(arena: &mut A, entry: NodeId) -> Option<NodeId> {
    let link = arena.link(entry);
    if link.is_detached() || link.next == entry {
        return None;
    }
    arena.link_mut(link.prev).next = link.next;
    arena.link_mut(link.next).prev = link.prev;
    *arena.link_mut(entry) = Link::DETACHED;
    debug_check(arena, link.prev);
    Some(entry)
}

/// Walk the list from `head` and back, checking every back-link.
///
/// Returns the number of nodes passed other than `head`.
pub fn verify<A: LinkArena + ?Sized>(arena: &A, head: NodeId) -> Result<usize, LinkError> {
    let head_link = arena.link(head);
    if head_link.is_detached() {
        return Err(LinkError::Detached { node: head.raw() });
    }

    let limit = arena.node_count();
    let mut prev = head;
    let mut node = head_link.next;
    let mut len = 0;
    while node != head {
        if len >= limit {
            return Err(LinkError::Unterminated {
                head: head.raw(),
                limit,
            });
        }
        let link = arena.link(node);
        if link.is_detached() {
            return Err(LinkError::Detached { node: node.raw() });
        }
        if link.prev != prev {
            return Err(LinkError::BackLink {
                node: node.raw(),
                expected: prev.raw(),
                found: link.prev.raw(),
            });
        }
        prev = node;
        node = link.next;
        len += 1;
    }

    if head_link.prev != prev {
        return Err(LinkError::BackLink {
            node: head.raw(),
            expected: prev.raw(),
            found: head_link.prev.raw(),
        });
    }
    Ok(len)
}

/// Fail-fast consistency walk, compiled in with the `link-check` feature.
#[inline]
pub(crate) fn debug_check<A: LinkArena + ?Sized>(arena: &A, head: NodeId) {
    #[cfg(feature = "link-check")]
    if let Err(err) = verify(arena, head) {
        tracing::error!(target: crate::LOG_TARGET, %err, "list corruption detected, aborting");
        std::process::abort();
    }

    #[cfg(not(feature = "link-check"))]
    let _ = (arena, head);
}

/// Iterator over the entries of one list, front to back.
pub struct Walk<'a, A: ?Sized> {
    arena: &'a A,
    head: NodeId,
    cursor: NodeId,
}

/// Walk the entries linked behind `head`. `head` must not be detached.
pub fn walk<A: LinkArena + ?Sized>(arena: &A, head: NodeId) -> Walk<'_, A> {
    Walk {
        arena,
        head,
        cursor: arena.link(head).next,
    }
}

impl<'a, A: LinkArena + ?Sized> Iterator for Walk<'a, A> {
    type Item = NodeId;

    #[inline]
    fn next(&mut self) -> Option<NodeId> {
        if self.cursor == self.head {
            return None;
        }
        let node = self.cursor;
        self.cursor = self.arena.link(node).next;
        Some(node)
    }
}
