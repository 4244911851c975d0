//! Lifetime resolvers and the builder that dispatches to them.
//!
//! A [`LifetimeResolver`] is what the injector memoizes per name: the
//! descriptor it was built from, that descriptor's fingerprint, and the
//! strategy implementing the descriptor's lifetime. Built-in strategies cover
//! transient, singleton/state, root, parent and provider lifetimes; custom
//! lifetime tags are looked up in the container's [`PolicyTable`].

use std::sync::Arc;
use std::time::Instant;

use crate::descriptors::{AnyArc, Descriptor, Fingerprint};
use crate::error::{DiError, DiResult};
use crate::injector::{Injector, NodeId, Resolution};
use crate::internal::FastMap;
use crate::lifetime::Lifetime;

mod cached;
mod parent;
mod provider;
mod root;
mod transient;

pub use cached::CachedResolver;
pub use parent::{select_scope, ParentResolver};
pub use provider::ProviderResolver;
pub use root::RootResolver;
pub use transient::TransientResolver;

/// One caching policy.
///
/// `node` is the node created for the object being resolved; its parent is
/// the node of whoever requested it.
pub trait Resolve: Send + Sync {
    fn resolve(&self, cx: &mut Resolution<'_>, node: NodeId) -> DiResult<Option<AnyArc>>;
}

/// Strategy factory for a custom lifetime tag.
///
/// Registered by name on a [`DescriptorCollection`](crate::DescriptorCollection);
/// a descriptor tagged `Lifetime::Custom(name)` is built by the policy
/// registered under `name`.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{
///     DescriptorCollection, Descriptor, DiResult, Injector, Lifetime, LifetimePolicy,
///     Resolve, Resolver, TransientResolver,
/// };
/// use std::sync::Arc;
///
/// /// Behaves like `transient`, under another name.
/// struct Fresh;
///
/// impl LifetimePolicy for Fresh {
///     fn build(&self, _: &Arc<Descriptor>, _: &Injector) -> DiResult<Arc<dyn Resolve>> {
///         Ok(Arc::new(TransientResolver))
///     }
/// }
///
/// let mut descriptors = DescriptorCollection::new();
/// descriptors.add_lifetime_policy("fresh", Fresh);
/// descriptors.add(
///     Descriptor::builder("token")
///         .lifetime(Lifetime::custom("fresh"))
///         .constructor(|_| Ok(String::from("t"))),
/// );
///
/// let injector = descriptors.build().create_injector();
/// let a = injector.get_required::<String>("token").unwrap();
/// let b = injector.get_required::<String>("token").unwrap();
/// assert!(!Arc::ptr_eq(&a, &b));
/// ```
pub trait LifetimePolicy: Send + Sync {
    fn build(&self, descriptor: &Arc<Descriptor>, injector: &Injector) -> DiResult<Arc<dyn Resolve>>;
}

/// Custom lifetime policies by tag name.
#[derive(Default, Clone)]
pub struct PolicyTable {
    policies: FastMap<String, Arc<dyn LifetimePolicy>>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, policy: Arc<dyn LifetimePolicy>) {
        self.policies.insert(name.into(), policy);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn LifetimePolicy>> {
        self.policies.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }
}

/// A resolver built for one descriptor, stamped with its fingerprint.
#[derive(Clone)]
pub struct LifetimeResolver {
    descriptor: Arc<Descriptor>,
    fingerprint: Fingerprint,
    strategy: Arc<dyn Resolve>,
}

impl LifetimeResolver {
    pub fn new(descriptor: Arc<Descriptor>, strategy: Arc<dyn Resolve>) -> Self {
        Self {
            fingerprint: descriptor.fingerprint(),
            descriptor,
            strategy,
        }
    }

    pub fn descriptor(&self) -> &Arc<Descriptor> {
        &self.descriptor
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Runs the strategy for `node`, reporting to the container's observers.
    pub fn resolve(&self, cx: &mut Resolution<'_>, node: NodeId) -> DiResult<Option<AnyArc>> {
        let observers = cx.injector().container().observers();
        if !observers.has_observers() {
            return self.strategy.resolve(cx, node);
        }

        let name = self.descriptor.display_name();
        observers.resolving(name, self.descriptor.lifetime());
        let start = Instant::now();
        let result = self.strategy.resolve(cx, node);
        match &result {
            Ok(_) => observers.resolved(name, start.elapsed()),
            Err(error) => observers.failed(name, error),
        }
        result
    }
}

impl std::fmt::Debug for LifetimeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifetimeResolver")
            .field("descriptor", &self.descriptor.display_name())
            .field("lifetime", &self.descriptor.lifetime())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Key under which long-lived caches store instances of `descriptor`.
///
/// Anonymous descriptors are keyed by identity, so two of the same shape
/// never share an entry.
pub(crate) fn cache_key(descriptor: &Descriptor) -> String {
    match descriptor.name() {
        Some(name) => name.to_owned(),
        None => format!("#{}", descriptor.id()),
    }
}

/// Builds the resolver for `descriptor` on behalf of `injector`.
///
/// Untagged and provider-flagged descriptors get the provider strategy;
/// every other tag maps to its built-in strategy or, for custom tags, to the
/// registered [`LifetimePolicy`]. Named non-provider resolvers are memoized
/// on the injector.
pub(crate) fn build(injector: &Injector, descriptor: &Arc<Descriptor>) -> DiResult<LifetimeResolver> {
    let strategy: Arc<dyn Resolve> = match descriptor.lifetime() {
        None => Arc::new(ProviderResolver),
        Some(_) if descriptor.is_provider() => Arc::new(ProviderResolver),
        Some(Lifetime::Transient) => Arc::new(TransientResolver),
        Some(Lifetime::Singleton) => Arc::new(CachedResolver::new(
            cache_key(descriptor),
            injector.container().singletons().clone(),
        )),
        Some(Lifetime::State) => Arc::new(CachedResolver::new(
            cache_key(descriptor),
            injector.state().clone(),
        )),
        Some(Lifetime::Root) => Arc::new(RootResolver::new(cache_key(descriptor))),
        Some(Lifetime::Parent) => Arc::new(ParentResolver::new(cache_key(descriptor))),
        Some(Lifetime::Custom(tag)) => {
            let policy = injector
                .container()
                .policy(tag)
                .ok_or_else(|| DiError::UnknownLifetime(tag.to_string()))?;
            policy.build(descriptor, injector)?
        }
    };

    let resolver = LifetimeResolver::new(descriptor.clone(), strategy);
    tracing::trace!(
        name = descriptor.display_name(),
        lifetime = ?descriptor.lifetime(),
        fingerprint = %resolver.fingerprint(),
        "built resolver"
    );

    if let (Some(name), false) = (descriptor.name(), descriptor.is_provider()) {
        injector.memoize(name, resolver.clone());
    }
    Ok(resolver)
}
