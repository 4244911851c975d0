//! Transient lifetime: a new instance on every resolution.

use crate::descriptors::AnyArc;
use crate::error::DiResult;
use crate::injector::{NodeId, Resolution};

use super::Resolve;

/// Resolves dependencies and constructs a fresh instance, never caching.
///
/// Every other constructor-based lifetime delegates the actual build to
/// [`Resolution::instantiate`], which is what this strategy calls directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransientResolver;

impl Resolve for TransientResolver {
    fn resolve(&self, cx: &mut Resolution<'_>, node: NodeId) -> DiResult<Option<AnyArc>> {
        cx.instantiate(node).map(Some)
    }
}
