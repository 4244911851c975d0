//! Containers and the injectors they mint.
//!
//! A [`Container`] is the immutable result of building a
//! [`DescriptorCollection`](crate::DescriptorCollection): descriptors, custom
//! lifetime policies, observers, default options and the singleton cache.
//! Every [`Injector`] created from it shares that singleton cache and owns
//! its own `state` cache and by-name resolver memo.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::InstanceCache;
use crate::config::InjectorOptions;
use crate::dependencies::Overrides;
use crate::descriptors::{AnyArc, Descriptor};
use crate::error::DiResult;
use crate::internal::FastMap;
use crate::observer::Observers;
use crate::registration::Registry;
use crate::resolvers::{self, LifetimePolicy, LifetimeResolver, PolicyTable};
use crate::traits::{Resolver, ResolverCore};

mod context;
mod mapper;
mod tree;

pub use context::Resolution;
pub use tree::{Ancestors, ChildSlot, Node, NodeId, ResolutionTree};

/// Built registry of descriptors.
///
/// Cloning is cheap; clones share everything, including the singleton cache.
///
/// # Examples
///
/// ```
/// use ferrous_injector::{DescriptorCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Logger;
///
/// let mut descriptors = DescriptorCollection::new();
/// descriptors.add_singleton("logger", Vec::<String>::new(), |_| Ok(Logger));
/// let container = descriptors.build();
///
/// let a = container.create_injector().get_required::<Logger>("logger").unwrap();
/// let b = container.create_injector().get_required::<Logger>("logger").unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// assert_eq!(container.reset_singletons(), 1);
/// let c = container.create_injector().get_required::<Logger>("logger").unwrap();
/// assert!(!Arc::ptr_eq(&a, &c));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    registry: Registry,
    policies: PolicyTable,
    observers: Observers,
    options: InjectorOptions,
    singletons: Arc<InstanceCache>,
}

impl Container {
    pub(crate) fn new(
        registry: Registry,
        policies: PolicyTable,
        observers: Observers,
        options: InjectorOptions,
        singletons: Arc<InstanceCache>,
    ) -> Self {
        tracing::debug!(
            descriptors = registry.len(),
            observers = observers.len(),
            strict = options.strict,
            "container built"
        );
        Self {
            inner: Arc::new(ContainerInner {
                registry,
                policies,
                observers,
                options,
                singletons,
            }),
        }
    }

    /// New injector with the container's default options.
    pub fn create_injector(&self) -> Injector {
        self.create_injector_with(self.inner.options)
    }

    /// New injector with explicit options.
    pub fn create_injector_with(&self, options: InjectorOptions) -> Injector {
        Injector {
            container: self.clone(),
            state: Arc::new(InstanceCache::new()),
            resolvers: Mutex::new(FastMap::default()),
            options,
        }
    }

    pub fn descriptor(&self, name: &str) -> Option<&Arc<Descriptor>> {
        self.inner.registry.get(name)
    }

    /// Registered descriptors, sorted by name.
    pub fn descriptors(&self) -> Vec<&Arc<Descriptor>> {
        self.inner.registry.sorted()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.registry.contains(name)
    }

    pub fn len(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn options(&self) -> InjectorOptions {
        self.inner.options
    }

    /// Cache holding `singleton` instances.
    pub fn singletons(&self) -> &Arc<InstanceCache> {
        &self.inner.singletons
    }

    /// Invalidates every cached singleton; the next resolution of each builds
    /// it again. Returns how many instances were dropped.
    ///
    /// Containers sharing the process-wide cache reset it for all of them.
    pub fn reset_singletons(&self) -> usize {
        let dropped = self.inner.singletons.reset();
        self.inner.observers.cache_reset(dropped);
        dropped
    }

    /// Policy registered for a custom lifetime tag.
    pub fn policy(&self, tag: &str) -> Option<&Arc<dyn LifetimePolicy>> {
        self.inner.policies.get(tag)
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.inner.policies
    }

    pub(crate) fn observers(&self) -> &Observers {
        &self.inner.observers
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        for descriptor in self.descriptors() {
            let lifetime = descriptor
                .lifetime()
                .map(|l| l.as_str().to_owned())
                .unwrap_or_else(|| "provider".to_owned());
            s.push_str(&format!(
                "  {} [{}{}] -> {:?} ({})\n",
                descriptor.display_name(),
                lifetime,
                if descriptor.is_provider() { ", provider" } else { "" },
                descriptor.dependencies(),
                descriptor.fingerprint(),
            ));
        }
        s.push_str(&format!("Cached singletons: {:?}\n", self.singletons().keys()));
        s
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("descriptors", &self.len())
            .field("options", &self.inner.options)
            .field("singletons", &self.inner.singletons.len())
            .finish()
    }
}

/// Resolves names against a [`Container`].
///
/// Owns the `state` cache (one instance per injector) and memoizes one
/// resolver per registered name. Every top-level call grows a fresh
/// [`ResolutionTree`], so `root` and `parent` instances never outlive it.
///
/// # Examples
///
/// ```
/// use ferrous_injector::{DescriptorCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Session(u32);
///
/// let mut descriptors = DescriptorCollection::new();
/// descriptors.add_state("session", Vec::<String>::new(), |_| Ok(Session(1)));
/// let container = descriptors.build();
///
/// let first = container.create_injector();
/// let second = container.create_injector();
/// let a = first.get_required::<Session>("session").unwrap();
/// let b = first.get_required::<Session>("session").unwrap();
/// let c = second.get_required::<Session>("session").unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert!(!Arc::ptr_eq(&a, &c));
/// ```
pub struct Injector {
    container: Container,
    state: Arc<InstanceCache>,
    resolvers: Mutex<FastMap<String, LifetimeResolver>>,
    options: InjectorOptions,
}

impl Injector {
    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn options(&self) -> InjectorOptions {
        self.options
    }

    pub fn is_strict(&self) -> bool {
        self.options.strict
    }

    /// Cache holding this injector's `state` instances.
    pub fn state(&self) -> &Arc<InstanceCache> {
        &self.state
    }

    /// Resolves `name` with no overrides.
    pub fn resolve(&self, name: &str) -> DiResult<Option<AnyArc>> {
        self.resolve_with(name, &Overrides::default())
    }

    /// Resolves `name`, consulting `overrides` for every name without a resolver.
    pub fn resolve_with(&self, name: &str, overrides: &Overrides) -> DiResult<Option<AnyArc>> {
        let resolver = self.resolver_for(name)?;
        let mut cx = Resolution::new(self, overrides);
        mapper::resolve_entry(&mut cx, name, resolver.as_ref(), None)
    }

    /// Resolves a descriptor that need not be registered.
    ///
    /// A named, non-provider descriptor is memoized like a registered one.
    pub fn resolve_descriptor(
        &self,
        descriptor: Arc<Descriptor>,
        overrides: &Overrides,
    ) -> DiResult<Option<AnyArc>> {
        let resolver = self.build_resolver(&descriptor)?;
        let mut cx = Resolution::new(self, overrides);
        let node = cx.tree_mut().root_node(descriptor);
        resolver.resolve(&mut cx, node)
    }

    /// Resolver for `name`: the memoized one while its fingerprint still
    /// matches the registry, otherwise a freshly built one.
    pub fn resolver_for(&self, name: &str) -> DiResult<Option<LifetimeResolver>> {
        let registered = self.container.descriptor(name);
        {
            let memo = self.resolvers.lock();
            if let Some(resolver) = memo.get(name) {
                match registered {
                    Some(descriptor) if descriptor.fingerprint() != resolver.fingerprint() => {
                        tracing::debug!(name, "memoized resolver is stale, rebuilding");
                    }
                    _ => return Ok(Some(resolver.clone())),
                }
            }
        }
        registered
            .map(|descriptor| self.build_resolver(descriptor))
            .transpose()
    }

    /// Builds the resolver for `descriptor` according to its lifetime.
    pub fn build_resolver(&self, descriptor: &Arc<Descriptor>) -> DiResult<LifetimeResolver> {
        resolvers::build(self, descriptor)
    }

    /// Resolvers for the declared dependencies of `descriptor`, in order.
    pub fn providers_for(
        &self,
        descriptor: &Descriptor,
    ) -> DiResult<Vec<(String, Option<LifetimeResolver>)>> {
        descriptor
            .dependencies()
            .iter()
            .map(|name| Ok((name.clone(), self.resolver_for(name)?)))
            .collect()
    }

    /// Number of memoized resolvers.
    pub fn cached_resolver_count(&self) -> usize {
        self.resolvers.lock().len()
    }

    pub(crate) fn memoize(&self, name: &str, resolver: LifetimeResolver) {
        self.resolvers.lock().insert(name.to_owned(), resolver);
    }
}

impl ResolverCore for Injector {
    fn resolve_any(&self, name: &str, overrides: &Overrides) -> DiResult<Option<AnyArc>> {
        self.resolve_with(name, overrides)
    }
}

impl Resolver for Injector {}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("options", &self.options)
            .field("state", &self.state.len())
            .field("resolvers", &self.cached_resolver_count())
            .finish()
    }
}
