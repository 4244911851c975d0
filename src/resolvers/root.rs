//! Root lifetime: one instance per resolution tree.

use crate::descriptors::AnyArc;
use crate::error::DiResult;
use crate::injector::{NodeId, Resolution};

use super::Resolve;

/// Shares one instance among every node under the same tree root.
pub struct RootResolver {
    key: String,
}

impl RootResolver {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Resolve for RootResolver {
    fn resolve(&self, cx: &mut Resolution<'_>, node: NodeId) -> DiResult<Option<AnyArc>> {
        let root = cx.tree().root(node);
        if let Some(value) = cx.tree().root_value(root, &self.key) {
            return Ok(Some(value.clone()));
        }
        let value = cx.instantiate(node)?;
        Ok(Some(cx.tree_mut().store_root(root, &self.key, value)))
    }
}
