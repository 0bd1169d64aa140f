//! Pool: named store of fixed-type objects behind stable handles.
//!
//! Tables are created through [`HashTable::create_in`](crate::HashTable::create_in)
//! against a pool the caller constructs and owns; there is no process-wide
//! pool. A pool may carry a print helper that [`Pool::print_all`] runs for
//! every object, which is how table statistics are reported generically.

use crate::error::PoolError;
use crate::LOG_TARGET;
use core::fmt;
use std::borrow::Cow;
use slotmap::{DefaultKey, SlotMap};
use tracing::info;

/// Stable reference to an object in a [`Pool`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PoolHandle(DefaultKey);

impl PoolHandle {
    pub fn get<'p, T>(&self, pool: &'p Pool<T>) -> Option<&'p T> {
        pool.get(*self)
    }

    pub fn get_mut<'p, T>(&self, pool: &'p mut Pool<T>) -> Option<&'p mut T> {
        pool.get_mut(*self)
    }
}

struct Pooled<T> {
    name: Cow<'static, str>,
    body: T,
}

pub struct Pool<T> {
    name: &'static str,
    // 0 means unbounded.
    capacity: usize,
    objects: SlotMap<DefaultKey, Pooled<T>>,
    print_helper: Option<fn(&T)>,
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("len", &self.objects.len())
            .field("has_print_helper", &self.print_helper.is_some())
            .finish()
    }
}

impl<T> Pool<T> {
    /// An unbounded pool.
    pub fn new(name: &'static str) -> Self {
        Self::with_capacity_limit(name, 0)
    }

    /// A pool that refuses allocations beyond `capacity` live objects;
    /// 0 means unbounded.
    pub fn with_capacity_limit(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity,
            objects: SlotMap::with_key(),
            print_helper: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn allocate(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        body: T,
    ) -> Result<PoolHandle, PoolError> {
        if self.capacity != 0 && self.objects.len() >= self.capacity {
            return Err(PoolError::Full {
                pool: self.name,
                capacity: self.capacity,
            });
        }
        let name = name.into();
        Ok(PoolHandle(self.objects.insert(Pooled { name, body })))
    }

    /// Release an object, handing it back; `None` for a stale handle.
    pub fn free(&mut self, handle: PoolHandle) -> Option<T> {
        self.objects.remove(handle.0).map(|p| p.body)
    }

    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.objects.get(handle.0).map(|p| &p.body)
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.objects.get_mut(handle.0).map(|p| &mut p.body)
    }

    /// Name the object was allocated under.
    pub fn object_name(&self, handle: PoolHandle) -> Option<&str> {
        self.objects.get(handle.0).map(|p| &*p.name)
    }

    pub fn has_print_helper(&self) -> bool {
        self.print_helper.is_some()
    }

    pub fn set_print_helper(&mut self, helper: fn(&T)) {
        self.print_helper = Some(helper);
    }

    /// Log the pool summary, then run the print helper on every object.
    pub fn print_all(&self) {
        info!(
            target: LOG_TARGET,
            pool = self.name,
            objects = self.objects.len(),
            capacity = self.capacity,
            "pool summary"
        );
        let Some(helper) = self.print_helper else {
            return;
        };
        for (_, pooled) in self.objects.iter() {
            helper(&pooled.body);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoolHandle, &str, &T)> {
        self.objects
            .iter()
            .map(|(k, p)| (PoolHandle(k), &*p.name, &p.body))
    }
}
