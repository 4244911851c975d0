//! Descriptor registry.

use std::sync::Arc;

use crate::descriptors::Descriptor;
use crate::internal::FastMap;

/// Registered descriptors by name.
///
/// The first few registrations live in a `Vec` scanned linearly, which beats
/// hashing for the small containers most applications build; the rest spill
/// into a hash map.
#[derive(Clone)]
pub(crate) struct Registry {
    small: Vec<(String, Arc<Descriptor>)>,
    large: FastMap<String, Arc<Descriptor>>,
    small_threshold: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            small: Vec::new(),
            large: FastMap::default(),
            small_threshold: 16,
        }
    }

    /// Registers `descriptor` under its name, replacing a previous one.
    ///
    /// Returns the replaced descriptor. Anonymous descriptors cannot be looked
    /// up and are not stored.
    pub(crate) fn insert(&mut self, descriptor: Arc<Descriptor>) -> Option<Arc<Descriptor>> {
        let Some(name) = descriptor.name().map(str::to_owned) else {
            tracing::warn!(fingerprint = %descriptor.fingerprint(), "ignoring anonymous descriptor registration");
            return None;
        };

        if let Some(slot) = self.small.iter_mut().find(|(n, _)| *n == name) {
            return Some(std::mem::replace(&mut slot.1, descriptor));
        }
        if self.small.len() < self.small_threshold && !self.large.contains_key(&name) {
            self.small.push((name, descriptor));
            return None;
        }
        self.large.insert(name, descriptor)
    }

    #[inline]
    pub(crate) fn get(&self, name: &str) -> Option<&Arc<Descriptor>> {
        for (n, descriptor) in &self.small {
            if n == name {
                return Some(descriptor);
            }
        }
        self.large.get(name)
    }

    #[inline]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.small.len() + self.large.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<Descriptor>> {
        self.small
            .iter()
            .map(|(_, descriptor)| descriptor)
            .chain(self.large.values())
    }

    /// Descriptors sorted by name, for stable reports and exports.
    pub(crate) fn sorted(&self) -> Vec<&Arc<Descriptor>> {
        let mut all: Vec<_> = self.iter().collect();
        all.sort_by(|a, b| a.name().cmp(&b.name()));
        all
    }
}
