//! Name-keyed instance caches backing the `singleton` and `state` lifetimes.
//!
//! Each entry moves through a small state machine: vacant, `Building`
//! (owned by the thread running the factory), then `Built`. A built entry is
//! never replaced until [`InstanceCache::reset`] clears the cache.

use std::sync::Arc;
use std::thread::{self, ThreadId};

use once_cell::sync::Lazy;
use parking_lot::{Condvar, Mutex};

use crate::descriptors::AnyArc;
use crate::internal::FastMap;

static PROCESS_CACHE: Lazy<Arc<InstanceCache>> = Lazy::new(|| Arc::new(InstanceCache::new()));

enum Slot {
    Building(ThreadId),
    Built(AnyArc),
}

/// Build-once cache of shared instances.
///
/// The check-then-install sequence is guarded: a caller finding an entry in
/// `Building` state on another thread waits for it to be installed, while
/// the same thread finding its own `Building` entry is told it re-entered
/// (a dependency cycle).
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{CacheEntry, InstanceCache};
/// use std::sync::Arc;
///
/// let cache = InstanceCache::new();
/// let built = match cache.begin("config") {
///     CacheEntry::Vacant(guard) => guard.complete(Arc::new(42u32)),
///     _ => unreachable!(),
/// };
/// match cache.begin("config") {
///     CacheEntry::Built(value) => assert!(Arc::ptr_eq(&value, &built)),
///     _ => unreachable!(),
/// }
/// assert_eq!(cache.reset(), 1);
/// assert!(cache.is_empty());
/// ```
#[derive(Default)]
pub struct InstanceCache {
    slots: Mutex<FastMap<String, Slot>>,
    ready: Condvar,
}

/// Outcome of [`InstanceCache::begin`].
pub enum CacheEntry<'a> {
    /// The shared instance
    Built(AnyArc),
    /// Nobody built the instance yet; the caller now owns the build
    Vacant(BuildGuard<'a>),
    /// The current thread is already building this key
    Reentrant,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every container that opts into process-wide singletons.
    pub fn process() -> Arc<InstanceCache> {
        PROCESS_CACHE.clone()
    }

    /// Looks `key` up, claiming the build when the entry is vacant.
    pub fn begin(&self, key: &str) -> CacheEntry<'_> {
        let me = thread::current().id();
        let mut slots = self.slots.lock();
        loop {
            match slots.get(key) {
                Some(Slot::Built(value)) => return CacheEntry::Built(value.clone()),
                Some(Slot::Building(owner)) if *owner == me => return CacheEntry::Reentrant,
                Some(Slot::Building(_)) => self.ready.wait(&mut slots),
                None => {
                    slots.insert(key.to_owned(), Slot::Building(me));
                    return CacheEntry::Vacant(BuildGuard {
                        cache: self,
                        key: key.to_owned(),
                        completed: false,
                    });
                }
            }
        }
    }

    /// Built instance for `key`, if any.
    pub fn get(&self, key: &str) -> Option<AnyArc> {
        match self.slots.lock().get(key) {
            Some(Slot::Built(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of built entries.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Built(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of built entries, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .slots
            .lock()
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Built(_)))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Invalidates every built instance and returns how many were dropped.
    ///
    /// Builds in flight are left alone and install their value when done.
    pub fn reset(&self) -> usize {
        let mut slots = self.slots.lock();
        let before = slots.len();
        slots.retain(|_, slot| matches!(slot, Slot::Building(_)));
        let dropped = before - slots.len();
        tracing::debug!(dropped, "instance cache reset");
        dropped
    }
}

/// Exclusive right to build one cache entry.
///
/// Dropping the guard without [`complete`](BuildGuard::complete) (a failed
/// build) returns the entry to vacant and wakes waiting threads.
pub struct BuildGuard<'a> {
    cache: &'a InstanceCache,
    key: String,
    completed: bool,
}

impl BuildGuard<'_> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Installs `value` and returns the instance now held by the cache.
    pub fn complete(mut self, value: AnyArc) -> AnyArc {
        let stored = {
            let mut slots = self.cache.slots.lock();
            match slots.get(&self.key) {
                Some(Slot::Built(existing)) => existing.clone(),
                _ => {
                    slots.insert(self.key.clone(), Slot::Built(value.clone()));
                    value
                }
            }
        };
        self.completed = true;
        self.cache.ready.notify_all();
        stored
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        {
            let mut slots = self.cache.slots.lock();
            if matches!(slots.get(&self.key), Some(Slot::Building(_))) {
                slots.remove(&self.key);
            }
        }
        self.cache.ready.notify_all();
    }
}
