//! Cached lifetimes (`singleton`, `state`): one instance per cache.

use std::sync::Arc;

use crate::cache::{CacheEntry, InstanceCache};
use crate::descriptors::AnyArc;
use crate::error::{DiError, DiResult};
use crate::injector::{NodeId, Resolution};

use super::Resolve;

/// Builds once into an [`InstanceCache`] and hands out the same instance afterwards.
///
/// `singleton` descriptors use the container's cache, `state` descriptors the
/// injector's own.
pub struct CachedResolver {
    key: String,
    cache: Arc<InstanceCache>,
}

impl CachedResolver {
    pub fn new(key: impl Into<String>, cache: Arc<InstanceCache>) -> Self {
        Self {
            key: key.into(),
            cache,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Resolve for CachedResolver {
    fn resolve(&self, cx: &mut Resolution<'_>, node: NodeId) -> DiResult<Option<AnyArc>> {
        match self.cache.begin(&self.key) {
            CacheEntry::Built(value) => {
                tracing::trace!(key = %self.key, "cache hit");
                Ok(Some(value))
            }
            CacheEntry::Reentrant => Err(DiError::Circular(cx.tree().path(node))),
            CacheEntry::Vacant(guard) => {
                tracing::trace!(key = %self.key, "cache miss, building");
                let value = cx.instantiate(node)?;
                Ok(Some(guard.complete(value)))
            }
        }
    }
}
