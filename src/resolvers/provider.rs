//! Provider lifetime: plain function invocation, never cached.

use crate::descriptors::AnyArc;
use crate::error::DiResult;
use crate::injector::{NodeId, Resolution};

use super::Resolve;

/// Used for untagged or provider-flagged descriptors. The factory runs as a
/// plain function on every call and its result, possibly nothing, is returned
/// as is.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProviderResolver;

impl Resolve for ProviderResolver {
    fn resolve(&self, cx: &mut Resolution<'_>, node: NodeId) -> DiResult<Option<AnyArc>> {
        cx.invoke(node)
    }
}
