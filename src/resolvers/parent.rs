//! Parent lifetime: one instance per selected ancestor scope.

use crate::descriptors::AnyArc;
use crate::error::{DiError, DiResult};
use crate::injector::{ChildSlot, NodeId, Resolution, ResolutionTree};

use super::Resolve;

/// Picks the node whose `children` scope holds the instance of `name` for `node`.
///
/// Walks the strict ancestors of `node`, nearest first. An ancestor that
/// already holds an entry for `name` ends the walk. Otherwise the outermost
/// ancestor declaring `name` as a dependency wins. With neither, `node`
/// itself is the scope.
pub fn select_scope(tree: &ResolutionTree, node: NodeId, name: &str) -> NodeId {
    let mut declarer = None;
    for ancestor in tree.ancestors(node) {
        if tree.child_slot(ancestor, name).is_some() {
            return ancestor;
        }
        if tree.node(ancestor).descriptor().declares(name) {
            declarer = Some(ancestor);
        }
    }
    declarer.unwrap_or(node)
}

/// Shares one instance among everything below the selected ancestor.
pub struct ParentResolver {
    key: String,
}

impl ParentResolver {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Resolve for ParentResolver {
    fn resolve(&self, cx: &mut Resolution<'_>, node: NodeId) -> DiResult<Option<AnyArc>> {
        let scope = select_scope(cx.tree(), node, &self.key);
        match cx.tree().child_slot(scope, &self.key) {
            Some(ChildSlot::Built(value)) => return Ok(Some(value.clone())),
            Some(ChildSlot::Building) => return Err(DiError::Circular(cx.tree().path(node))),
            None => {}
        }

        tracing::trace!(key = %self.key, scope = scope.index(), "building parent-scoped instance");
        cx.tree_mut().mark_building(scope, &self.key);
        match cx.instantiate(node) {
            Ok(value) => Ok(Some(cx.tree_mut().store_child(scope, &self.key, value))),
            Err(error) => {
                cx.tree_mut().abandon_child(scope, &self.key);
                Err(error)
            }
        }
    }
}
