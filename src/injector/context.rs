//! State of one top-level resolution call.

use std::sync::Arc;

use crate::dependencies::{Dependencies, Overrides};
use crate::descriptors::{AnyArc, Descriptor};
use crate::error::DiResult;
use crate::internal::guard_instantiation;

use super::mapper;
use super::tree::{NodeId, ResolutionTree};
use super::Injector;

/// Everything a resolver needs while one resolution call is in flight: the
/// injector, the caller's overrides and the resolution tree being grown.
///
/// Custom [`LifetimePolicy`](crate::LifetimePolicy) strategies receive it and
/// call [`instantiate`](Resolution::instantiate) to build a fresh instance.
pub struct Resolution<'a> {
    injector: &'a Injector,
    overrides: &'a Overrides,
    tree: ResolutionTree,
}

impl<'a> Resolution<'a> {
    pub(crate) fn new(injector: &'a Injector, overrides: &'a Overrides) -> Self {
        Self {
            injector,
            overrides,
            tree: ResolutionTree::new(),
        }
    }

    pub fn injector(&self) -> &'a Injector {
        self.injector
    }

    pub fn overrides(&self) -> &'a Overrides {
        self.overrides
    }

    pub fn tree(&self) -> &ResolutionTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ResolutionTree {
        &mut self.tree
    }

    /// Resolves the dependencies of `node` and constructs a new instance.
    pub fn instantiate(&mut self, node: NodeId) -> DiResult<AnyArc> {
        let (descriptor, dependencies) = self.prepare(node)?;
        descriptor
            .factory()
            .construct(descriptor.display_name(), &dependencies)
    }

    /// Resolves the dependencies of `node` and calls its factory as a plain
    /// function, passing its result through.
    pub fn invoke(&mut self, node: NodeId) -> DiResult<Option<AnyArc>> {
        let (descriptor, dependencies) = self.prepare(node)?;
        descriptor.factory().call(&dependencies)
    }

    fn prepare(&mut self, node: NodeId) -> DiResult<(Arc<Descriptor>, Dependencies)> {
        guard_instantiation(&self.tree, node, self.injector.options().max_depth)?;

        let descriptor = self.tree.node(node).descriptor().clone();
        let providers = self.injector.providers_for(&descriptor)?;
        let dependencies = mapper::map_dependencies(self, &providers, node)?;
        self.tree.set_providers(node, providers);
        Ok((descriptor, dependencies))
    }
}
