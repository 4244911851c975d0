//! Maps declared dependency names to resolved values.

use crate::dependencies::Dependencies;
use crate::descriptors::AnyArc;
use crate::error::{DiError, DiResult};
use crate::resolvers::LifetimeResolver;

use super::context::Resolution;
use super::tree::NodeId;

/// Resolves every `(name, resolver)` entry in order, on behalf of `node`.
pub(crate) fn map_dependencies(
    cx: &mut Resolution<'_>,
    providers: &[(String, Option<LifetimeResolver>)],
    node: NodeId,
) -> DiResult<Dependencies> {
    let mut dependencies = Dependencies::with_capacity(providers.len());
    for (name, resolver) in providers {
        let value = resolve_entry(cx, name, resolver.as_ref(), Some(node))?;
        dependencies.push(name.as_str(), value);
    }
    Ok(dependencies)
}

/// Resolves one name.
///
/// A registered resolver always wins and runs on a new node below `parent`
/// (or a new tree root). Without one, an override is returned verbatim; with
/// neither, strict resolution fails and lenient resolution yields nothing.
pub(crate) fn resolve_entry(
    cx: &mut Resolution<'_>,
    name: &str,
    resolver: Option<&LifetimeResolver>,
    parent: Option<NodeId>,
) -> DiResult<Option<AnyArc>> {
    if let Some(resolver) = resolver {
        let descriptor = resolver.descriptor().clone();
        let node = match parent {
            Some(parent) => cx.tree_mut().child(parent, descriptor),
            None => cx.tree_mut().root_node(descriptor),
        };
        return resolver.resolve(cx, node);
    }

    if let Some(value) = cx.overrides().get(name) {
        return Ok(Some(value.clone()));
    }

    let injector = cx.injector();
    if injector.is_strict() {
        return Err(DiError::MissingDependency(name.to_owned()));
    }
    tracing::trace!(name, "no resolver or override, resolving to nothing");
    injector.container().observers().missing(name);
    Ok(None)
}
