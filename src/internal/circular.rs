//! Circular dependency and depth detection over the resolution tree.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::injector::{NodeId, ResolutionTree};

/// Default limit on resolution tree depth.
///
/// Every tree level costs several stack frames; this limit is reached well
/// before a 2 MiB thread stack runs out, even in debug builds. Raising
/// `max_depth` far past it needs a larger stack.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Checks that instantiating `node` neither re-enters one of its own
/// ancestors nor exceeds `max_depth`.
///
/// Ancestors are matched by descriptor name; anonymous descriptors match only
/// themselves.
pub(crate) fn guard_instantiation(
    tree: &ResolutionTree,
    node: NodeId,
    max_depth: usize,
) -> DiResult<()> {
    let current = tree.node(node);
    if current.depth() >= max_depth {
        return Err(DiError::DepthExceeded(current.depth()));
    }

    let descriptor = current.descriptor();
    let reentered = tree.ancestors(node).any(|ancestor| {
        let other = tree.node(ancestor).descriptor();
        match (descriptor.name(), other.name()) {
            (Some(a), Some(b)) => a == b,
            _ => Arc::ptr_eq(descriptor, other),
        }
    });

    if reentered {
        return Err(DiError::Circular(tree.path(node)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Descriptor;

    fn named(name: &str) -> Arc<Descriptor> {
        Arc::new(Descriptor::builder(name).constructor(|_| Ok(())))
    }

    #[test]
    fn detects_reentry_by_name() {
        let mut tree = ResolutionTree::new();
        let a = tree.root_node(named("a"));
        let b = tree.child(a, named("b"));
        let a_again = tree.child(b, named("a"));

        assert!(guard_instantiation(&tree, b, DEFAULT_MAX_DEPTH).is_ok());
        assert_eq!(
            guard_instantiation(&tree, a_again, DEFAULT_MAX_DEPTH),
            Err(DiError::Circular(vec!["a".into(), "b".into(), "a".into()]))
        );
    }

    #[test]
    fn enforces_depth_limit() {
        let mut tree = ResolutionTree::new();
        let mut node = tree.root_node(named("n0"));
        for i in 1..4 {
            node = tree.child(node, named(&format!("n{}", i)));
        }
        assert!(guard_instantiation(&tree, node, 4).is_ok());
        assert_eq!(guard_instantiation(&tree, node, 3), Err(DiError::DepthExceeded(3)));
    }
}
