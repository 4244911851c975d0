//! Arena-backed resolution tree.
//!
//! Every top-level resolution call owns one [`ResolutionTree`]. Each object
//! resolved during that call gets a node whose parent is the node of the
//! object that requested it. Per-scope caches live beside the arena and are
//! keyed by `(NodeId, name)`, so the tree itself carries no back-references.

use std::sync::Arc;

use crate::descriptors::{AnyArc, Descriptor};
use crate::internal::FastMap;
use crate::resolvers::LifetimeResolver;

/// Index of a node inside its [`ResolutionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One point of an in-progress resolution.
#[derive(Clone)]
pub struct Node {
    descriptor: Arc<Descriptor>,
    providers: Vec<(String, Option<LifetimeResolver>)>,
    parent: Option<NodeId>,
    root: NodeId,
    depth: usize,
}

impl Node {
    pub fn descriptor(&self) -> &Arc<Descriptor> {
        &self.descriptor
    }

    /// Resolvers for the descriptor's dependencies, filled in once the node instantiates.
    pub fn providers(&self) -> &[(String, Option<LifetimeResolver>)] {
        &self.providers
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("descriptor", &self.descriptor.display_name())
            .field("parent", &self.parent)
            .field("root", &self.root)
            .field("depth", &self.depth)
            .finish()
    }
}

/// Entry of a node's `children` scope.
#[derive(Clone)]
pub enum ChildSlot {
    /// An instance is being built for this scope
    Building,
    /// The instance shared within this scope
    Built(AnyArc),
}

/// Resolution tree arena plus its per-scope caches.
#[derive(Default)]
pub struct ResolutionTree {
    nodes: Vec<Node>,
    children: FastMap<(NodeId, String), ChildSlot>,
    roots: FastMap<(NodeId, String), AnyArc>,
}

impl ResolutionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node without parent. It is its own root.
    pub fn root_node(&mut self, descriptor: Arc<Descriptor>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            descriptor,
            providers: Vec::new(),
            parent: None,
            root: id,
            depth: 0,
        });
        id
    }

    /// Adds a node resolved on behalf of `parent`.
    pub fn child(&mut self, parent: NodeId, descriptor: Arc<Descriptor>) -> NodeId {
        let (root, depth) = {
            let p = self.node(parent);
            (p.root, p.depth + 1)
        };
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            descriptor,
            providers: Vec::new(),
            parent: Some(parent),
            root,
            depth,
        });
        id
    }

    /// # Panics
    ///
    /// Panics if `id` was issued by another tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn root(&self, id: NodeId) -> NodeId {
        self.node(id).root
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Descriptor names from the root down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<String> {
        let mut path: Vec<String> = std::iter::once(id)
            .chain(self.ancestors(id))
            .map(|n| self.node(n).descriptor.display_name().to_owned())
            .collect();
        path.reverse();
        path
    }

    pub(crate) fn set_providers(
        &mut self,
        id: NodeId,
        providers: Vec<(String, Option<LifetimeResolver>)>,
    ) {
        self.nodes[id.0].providers = providers;
    }

    pub fn child_slot(&self, id: NodeId, name: &str) -> Option<&ChildSlot> {
        self.children.get(&(id, name.to_owned()))
    }

    /// Marks `name` as in progress in the `children` scope of `id`.
    pub fn mark_building(&mut self, id: NodeId, name: &str) {
        self.children
            .entry((id, name.to_owned()))
            .or_insert(ChildSlot::Building);
    }

    /// Replaces a `Building` (or vacant) entry with `value`. A built entry is
    /// never overwritten; the value already stored is returned instead.
    pub fn store_child(&mut self, id: NodeId, name: &str, value: AnyArc) -> AnyArc {
        let slot = self
            .children
            .entry((id, name.to_owned()))
            .or_insert(ChildSlot::Building);
        if let ChildSlot::Built(existing) = &*slot {
            return existing.clone();
        }
        *slot = ChildSlot::Built(value.clone());
        value
    }

    /// Drops an in-progress entry after a failed build.
    pub fn abandon_child(&mut self, id: NodeId, name: &str) {
        let key = (id, name.to_owned());
        if matches!(self.children.get(&key), Some(ChildSlot::Building)) {
            self.children.remove(&key);
        }
    }

    pub fn root_value(&self, root: NodeId, name: &str) -> Option<&AnyArc> {
        self.roots.get(&(root, name.to_owned()))
    }

    /// Stores a root-scoped instance unless one exists; returns the stored instance.
    pub fn store_root(&mut self, root: NodeId, name: &str, value: AnyArc) -> AnyArc {
        self.roots
            .entry((root, name.to_owned()))
            .or_insert(value)
            .clone()
    }
}

/// Iterator over strict ancestors, see [`ResolutionTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a ResolutionTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Arc<Descriptor> {
        Arc::new(Descriptor::builder(name).constructor(|_| Ok(())))
    }

    #[test]
    fn links_parent_and_root() {
        let mut tree = ResolutionTree::new();
        let a = tree.root_node(named("a"));
        let b = tree.child(a, named("b"));
        let c = tree.child(b, named("c"));

        assert_eq!(tree.root(c), a);
        assert_eq!(tree.parent(c), Some(b));
        assert_eq!(tree.ancestors(c).collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(tree.ancestors(a).count(), 0);
        assert_eq!(tree.node(c).depth(), 2);
        assert_eq!(tree.path(c), ["a", "b", "c"]);
    }

    #[test]
    fn children_entries_are_monotonic() {
        let mut tree = ResolutionTree::new();
        let a = tree.root_node(named("a"));
        tree.mark_building(a, "x");
        assert!(matches!(tree.child_slot(a, "x"), Some(ChildSlot::Building)));

        let first: AnyArc = Arc::new(1u8);
        let second: AnyArc = Arc::new(2u8);
        let stored = tree.store_child(a, "x", first.clone());
        assert!(Arc::ptr_eq(&stored, &first));
        let stored = tree.store_child(a, "x", second);
        assert!(Arc::ptr_eq(&stored, &first));

        tree.abandon_child(a, "x");
        assert!(tree.child_slot(a, "x").is_some());
    }

    #[test]
    fn root_values_keep_first_instance() {
        let mut tree = ResolutionTree::new();
        let a = tree.root_node(named("a"));
        let first: AnyArc = Arc::new("one");
        let kept = tree.store_root(a, "r", first.clone());
        let again = tree.store_root(a, "r", Arc::new("two"));
        assert!(Arc::ptr_eq(&kept, &first));
        assert!(Arc::ptr_eq(&again, &first));
        assert!(tree.root_value(a, "missing").is_none());
    }
}
