//! # IDs
//! Every node of a document graph is named by a [`StableID<T>`], unique within this execution of the
//! program and namespaced by the type T. IDs are never recycled, so a node detached from the graph keeps
//! its identity for as long as an undo step may bring it back.
//!
//! To get a new ID, use `StableID<YourNamespaceTy>`'s `Default` impl. To eagerly acquire many ids,
//! use `StableID::many`.

use std::sync::atomic::{AtomicU64, Ordering};

// Next free value per namespace.
static COUNTERS: parking_lot::RwLock<
    std::collections::BTreeMap<std::any::TypeId, AtomicU64>,
> = parking_lot::const_rwlock(std::collections::BTreeMap::new());

pub struct StableID<T: std::any::Any> {
    id: std::num::NonZeroU64,
    _namespace: std::marker::PhantomData<fn() -> T>,
}
impl<T: std::any::Any> Clone for StableID<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: std::any::Any> Copy for StableID<T> {}
impl<T: std::any::Any> PartialEq for StableID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl<T: std::any::Any> Eq for StableID<T> {}
impl<T: std::any::Any> PartialOrd for StableID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: std::any::Any> Ord for StableID<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}
impl<T: std::any::Any> std::hash::Hash for StableID<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: std::any::Any> StableID<T> {
    /// Raw numeric value. IDs from differing namespaces may share a value!
    #[must_use]
    pub fn get(&self) -> u64 {
        self.id.get()
    }
    /// Allocate `count` consecutive IDs with a single trip to the counter.
    ///
    /// # Panics
    /// When the namespace runs out of IDs. At one billion allocations per second that takes
    /// several centuries.
    pub fn many(count: usize) -> impl ExactSizeIterator<Item = Self> {
        let count_u64 = count as u64;
        let ty = std::any::TypeId::of::<T>();

        let start = {
            let read = COUNTERS.upgradable_read();
            if let Some(counter) = read.get(&ty) {
                counter.fetch_add(count_u64, Ordering::Relaxed)
            } else {
                // First allocation in this namespace.
                let mut write = parking_lot::RwLockUpgradableReadGuard::upgrade(read);
                // Another thread may have won the race between the two locks.
                write
                    .entry(ty)
                    .or_insert_with(|| AtomicU64::new(1))
                    .fetch_add(count_u64, Ordering::Relaxed)
            }
        };
        assert!(
            start.checked_add(count_u64).is_some(),
            "{} ID space exhausted",
            std::any::type_name::<T>()
        );

        (0..count).map(move |offset| Self {
            // start >= 1, so never zero.
            id: std::num::NonZeroU64::new(start + offset as u64)
                .unwrap_or(std::num::NonZeroU64::MIN),
            _namespace: std::marker::PhantomData,
        })
    }
}
impl<T: std::any::Any> Default for StableID<T> {
    fn default() -> Self {
        let start = Self::many(1).next();
        // `many(1)` always yields exactly one.
        start.unwrap_or(Self {
            id: std::num::NonZeroU64::MIN,
            _namespace: std::marker::PhantomData,
        })
    }
}
impl<T: std::any::Any> std::fmt::Display for StableID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = std::any::type_name::<T>();
        let short = name.rsplit("::").next().unwrap_or(name);
        write!(f, "{short}#{}", self.id)
    }
}
impl<T: std::any::Any> std::fmt::Debug for StableID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
