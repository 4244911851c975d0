//! Descriptor collection: registration and container building.

use std::sync::Arc;

use crate::cache::InstanceCache;
use crate::config::InjectorOptions;
use crate::dependencies::Dependencies;
use crate::descriptors::Descriptor;
use crate::error::DiResult;
use crate::injector::Container;
use crate::lifetime::Lifetime;
use crate::observer::{DiObserver, Observers};
use crate::registration::Registry;
use crate::resolvers::{LifetimePolicy, PolicyTable};

pub mod module_system;
pub use module_system::*;

/// Registration builder for a [`Container`].
///
/// Descriptors are keyed by name; registering a name twice replaces the
/// earlier descriptor. Registration is trusted, call
/// [`Container::validate`] to check the result.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{DescriptorCollection, Resolver};
///
/// struct Config { url: String }
/// struct Database { url: String }
///
/// let mut descriptors = DescriptorCollection::new();
/// descriptors
///     .add_instance("config", Config { url: "postgres://localhost".into() })
///     .add_singleton("database", ["config"], |deps| {
///         Ok(Database { url: deps.required::<Config>("config")?.url.clone() })
///     });
///
/// let injector = descriptors.build().create_injector();
/// let db = injector.get_required::<Database>("database").unwrap();
/// assert_eq!(db.url, "postgres://localhost");
/// ```
pub struct DescriptorCollection {
    registry: Registry,
    policies: PolicyTable,
    observers: Observers,
    options: InjectorOptions,
    singletons: Option<Arc<InstanceCache>>,
}

impl DescriptorCollection {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            policies: PolicyTable::new(),
            observers: Observers::new(),
            options: InjectorOptions::default(),
            singletons: None,
        }
    }

    /// Registers `descriptor`, replacing any descriptor with the same name.
    pub fn add(&mut self, descriptor: Descriptor) -> &mut Self {
        self.add_shared(Arc::new(descriptor))
    }

    /// Registers an already shared descriptor.
    pub fn add_shared(&mut self, descriptor: Arc<Descriptor>) -> &mut Self {
        if let Some(previous) = self.registry.insert(descriptor) {
            tracing::debug!(name = previous.display_name(), "descriptor replaced");
        }
        self
    }

    /// Registers `descriptor` unless its name is taken. Returns whether it was added.
    pub fn try_add(&mut self, descriptor: Descriptor) -> bool {
        match descriptor.name() {
            Some(name) if !self.registry.contains(name) => {
                self.registry.insert(Arc::new(descriptor));
                true
            }
            _ => false,
        }
    }

    /// Registers a constructor with the given lifetime.
    pub fn add_with_lifetime<T, I, S, F>(
        &mut self,
        name: impl Into<String>,
        lifetime: Lifetime,
        dependencies: I,
        ctor: F,
    ) -> &mut Self
    where
        T: Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Dependencies) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add(
            Descriptor::builder(name)
                .lifetime(lifetime)
                .depends_on(dependencies)
                .constructor(ctor),
        )
    }

    /// One instance for every injector of the container, until reset.
    pub fn add_singleton<T, I, S, F>(&mut self, name: impl Into<String>, dependencies: I, ctor: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Dependencies) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_with_lifetime(name, Lifetime::Singleton, dependencies, ctor)
    }

    /// One instance per injector.
    pub fn add_state<T, I, S, F>(&mut self, name: impl Into<String>, dependencies: I, ctor: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Dependencies) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_with_lifetime(name, Lifetime::State, dependencies, ctor)
    }

    /// One instance per resolution tree.
    pub fn add_root<T, I, S, F>(&mut self, name: impl Into<String>, dependencies: I, ctor: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Dependencies) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_with_lifetime(name, Lifetime::Root, dependencies, ctor)
    }

    /// One instance per outermost declaring ancestor.
    pub fn add_parent<T, I, S, F>(&mut self, name: impl Into<String>, dependencies: I, ctor: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Dependencies) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_with_lifetime(name, Lifetime::Parent, dependencies, ctor)
    }

    /// A new instance on every resolution.
    pub fn add_transient<T, I, S, F>(&mut self, name: impl Into<String>, dependencies: I, ctor: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Dependencies) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_with_lifetime(name, Lifetime::Transient, dependencies, ctor)
    }

    /// A plain function called on every resolution; its result may be nothing.
    ///
    /// ```rust
    /// use ferrous_injector::{DescriptorCollection, Resolver};
    ///
    /// let mut descriptors = DescriptorCollection::new();
    /// descriptors.add_provider("feature_flag", ["env"], |deps| {
    ///     Ok(deps.get::<String>("env")?.map(|env| env.as_str() == "prod"))
    /// });
    ///
    /// let injector = descriptors.build().create_injector();
    /// assert!(injector.get::<bool>("feature_flag").unwrap().is_none());
    /// ```
    pub fn add_provider<T, I, S, F>(&mut self, name: impl Into<String>, dependencies: I, func: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Dependencies) -> DiResult<Option<T>> + Send + Sync + 'static,
    {
        self.add(Descriptor::builder(name).depends_on(dependencies).function(func))
    }

    /// A prebuilt value, shared as a singleton.
    pub fn add_instance<T: Send + Sync + 'static>(&mut self, name: impl Into<String>, value: T) -> &mut Self {
        self.add_instance_arc(name, Arc::new(value))
    }

    /// A prebuilt shared value, registered as a singleton.
    pub fn add_instance_arc<T: Send + Sync + 'static>(&mut self, name: impl Into<String>, value: Arc<T>) -> &mut Self {
        self.add(
            Descriptor::builder(name)
                .lifetime(Lifetime::Singleton)
                .factory(crate::Factory::instance(value)),
        )
    }

    /// Registers the strategy for descriptors tagged `Lifetime::Custom(name)`.
    pub fn add_lifetime_policy<P>(&mut self, name: impl Into<String>, policy: P) -> &mut Self
    where
        P: LifetimePolicy + 'static,
    {
        self.policies.insert(name, Arc::new(policy));
        self
    }

    /// Adds a resolution observer.
    ///
    /// ```rust
    /// use ferrous_injector::{DescriptorCollection, MetricsObserver, Resolver};
    /// use std::sync::Arc;
    ///
    /// let metrics = Arc::new(MetricsObserver::new());
    /// let mut descriptors = DescriptorCollection::new();
    /// descriptors.add_transient("n", Vec::<String>::new(), |_| Ok(1u8));
    /// descriptors.add_observer(metrics.clone());
    ///
    /// let injector = descriptors.build().create_injector();
    /// injector.get_required::<u8>("n").unwrap();
    /// assert_eq!(metrics.resolution_count(), 1);
    /// ```
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    /// Default options for injectors created by the container.
    pub fn with_options(&mut self, options: InjectorOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Shares singletons with every other container using the process-wide cache.
    pub fn share_process_singletons(&mut self) -> &mut Self {
        self.singletons = Some(InstanceCache::process());
        self
    }

    /// Uses `cache` for singletons instead of a cache of the container's own.
    pub fn share_singletons(&mut self, cache: Arc<InstanceCache>) -> &mut Self {
        self.singletons = Some(cache);
        self
    }

    /// Registered descriptors, sorted by name.
    pub fn get_descriptors(&self) -> Vec<Arc<Descriptor>> {
        self.registry.sorted().into_iter().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn build(self) -> Container {
        let singletons = self
            .singletons
            .unwrap_or_else(|| Arc::new(InstanceCache::new()));
        Container::new(
            self.registry,
            self.policies,
            self.observers,
            self.options,
            singletons,
        )
    }
}

impl Default for DescriptorCollection {
    fn default() -> Self {
        Self::new()
    }
}
