//! Descriptors: immutable metadata for one injectable.

use std::any::Any;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::dependencies::Dependencies;
use crate::error::{DiError, DiResult};
use crate::lifetime::Lifetime;

/// Type-erased shared instance.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

type ConstructFn = dyn Fn(&Dependencies) -> DiResult<AnyArc> + Send + Sync;
type CallFn = dyn Fn(&Dependencies) -> DiResult<Option<AnyArc>> + Send + Sync;

/// How a descriptor produces its value.
///
/// `Constructor` factories build a fresh instance on every invocation.
/// `Function` factories are plain functions whose return value (possibly
/// nothing) is handed back as is.
#[derive(Clone)]
pub enum Factory {
    /// Builds a new instance from the resolved dependencies
    Constructor(Arc<ConstructFn>),
    /// Returns a value computed from the resolved dependencies
    Function(Arc<CallFn>),
}

impl Factory {
    /// Wraps a constructor producing `T`.
    pub fn constructor<T, F>(ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Dependencies) -> DiResult<T> + Send + Sync + 'static,
    {
        Factory::Constructor(Arc::new(move |deps: &Dependencies| -> DiResult<AnyArc> {
            Ok(Arc::new(ctor(deps)?))
        }))
    }

    /// Wraps a plain function whose result may be absent.
    pub fn function<T, F>(func: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Dependencies) -> DiResult<Option<T>> + Send + Sync + 'static,
    {
        Factory::Function(Arc::new(move |deps: &Dependencies| -> DiResult<Option<AnyArc>> {
            Ok(func(deps)?.map(|value| Arc::new(value) as AnyArc))
        }))
    }

    /// A constructor that always hands out the same prebuilt instance.
    pub fn instance<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Factory::Constructor(Arc::new(move |_: &Dependencies| -> DiResult<AnyArc> {
            Ok(value.clone())
        }))
    }

    /// Invokes the factory as a constructor: a value is mandatory.
    pub(crate) fn construct(&self, name: &str, deps: &Dependencies) -> DiResult<AnyArc> {
        match self {
            Factory::Constructor(ctor) => ctor(deps),
            Factory::Function(func) => {
                func(deps)?.ok_or_else(|| DiError::EmptyInstance(name.to_owned()))
            }
        }
    }

    /// Invokes the factory as a plain function.
    pub(crate) fn call(&self, deps: &Dependencies) -> DiResult<Option<AnyArc>> {
        match self {
            Factory::Constructor(ctor) => ctor(deps).map(Some),
            Factory::Function(func) => func(deps),
        }
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self, Factory::Constructor(_))
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Factory::Constructor(_) => f.write_str("Factory::Constructor"),
            Factory::Function(_) => f.write_str("Factory::Function"),
        }
    }
}

/// Opaque identity of a descriptor.
///
/// Resolvers are stamped with the fingerprint of the descriptor they were
/// built from, which lets an injector detect a memoized resolver that no
/// longer matches its registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "graph-export", derive(serde::Serialize, serde::Deserialize))]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// Derives a fingerprint from a descriptor's authored shape.
    pub fn of(
        name: Option<&str>,
        lifetime: Option<&Lifetime>,
        dependencies: &[String],
        provider: bool,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        lifetime.hash(&mut hasher);
        dependencies.hash(&mut hasher);
        provider.hash(&mut hasher);
        Fingerprint(hasher.finish())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Immutable metadata for one injectable
///
/// Carries the name, factory, lifetime tag, declared dependency names,
/// fingerprint and provider flag. Descriptors are shared through `Arc` and
/// many resolution nodes may point at the same one.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{Descriptor, Lifetime};
///
/// struct Config { url: String }
/// struct Database { url: String }
///
/// let db = Descriptor::builder("database")
///     .lifetime(Lifetime::Singleton)
///     .depends_on(["config"])
///     .constructor(|deps| {
///         let config = deps.required::<Config>("config")?;
///         Ok(Database { url: config.url.clone() })
///     });
///
/// assert_eq!(db.name(), Some("database"));
/// assert!(db.declares("config"));
/// assert!(!db.uses_provider_policy());
/// ```
#[derive(Clone)]
pub struct Descriptor {
    name: Option<String>,
    factory: Factory,
    lifetime: Option<Lifetime>,
    dependencies: Vec<String>,
    fingerprint: Fingerprint,
    provider: bool,
    id: u64,
}

static NEXT_DESCRIPTOR_ID: AtomicU64 = AtomicU64::new(0);

impl Descriptor {
    /// Starts a named descriptor.
    pub fn builder(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(Some(name.into()))
    }

    /// Starts a descriptor without a name. Anonymous descriptors are never memoized.
    pub fn anonymous() -> DescriptorBuilder {
        DescriptorBuilder::new(None)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name used in errors and logs.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn lifetime(&self) -> Option<&Lifetime> {
        self.lifetime.as_ref()
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Whether `name` appears among the declared dependencies.
    pub fn declares(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d == name)
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn is_provider(&self) -> bool {
        self.provider
    }

    /// Process-unique identity, shared by clones of this descriptor.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Untagged and provider-flagged descriptors resolve through the provider policy.
    pub fn uses_provider_policy(&self) -> bool {
        self.provider || self.lifetime.is_none()
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("lifetime", &self.lifetime)
            .field("dependencies", &self.dependencies)
            .field("fingerprint", &self.fingerprint)
            .field("provider", &self.provider)
            .field("factory", &self.factory)
            .finish()
    }
}

/// Fluent builder for [`Descriptor`]. Terminates with the factory.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    name: Option<String>,
    lifetime: Option<Lifetime>,
    dependencies: Vec<String>,
    fingerprint: Option<Fingerprint>,
    provider: bool,
}

impl DescriptorBuilder {
    fn new(name: Option<String>) -> Self {
        Self {
            name,
            lifetime: None,
            dependencies: Vec::new(),
            fingerprint: None,
            provider: false,
        }
    }

    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Sets the lifetime from an authored tag (`""`/`"none"` clears it).
    pub fn lifetime_tag(mut self, tag: &str) -> Self {
        self.lifetime = Lifetime::parse_tag(tag);
        self
    }

    pub fn depends_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    pub fn provider(mut self, provider: bool) -> Self {
        self.provider = provider;
        self
    }

    /// Overrides the derived fingerprint.
    pub fn fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    pub fn factory(self, factory: Factory) -> Descriptor {
        let fingerprint = self.fingerprint.unwrap_or_else(|| {
            Fingerprint::of(
                self.name.as_deref(),
                self.lifetime.as_ref(),
                &self.dependencies,
                self.provider,
            )
        });
        Descriptor {
            name: self.name,
            factory,
            lifetime: self.lifetime,
            dependencies: self.dependencies,
            fingerprint,
            provider: self.provider,
            id: NEXT_DESCRIPTOR_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn constructor<T, F>(self, ctor: F) -> Descriptor
    where
        T: Send + Sync + 'static,
        F: Fn(&Dependencies) -> DiResult<T> + Send + Sync + 'static,
    {
        self.factory(Factory::constructor(ctor))
    }

    pub fn function<T, F>(self, func: F) -> Descriptor
    where
        T: Send + Sync + 'static,
        F: Fn(&Dependencies) -> DiResult<Option<T>> + Send + Sync + 'static,
    {
        self.factory(Factory::function(func))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_tracks_shape() {
        let a = Descriptor::builder("a").lifetime(Lifetime::Root).constructor(|_| Ok(1u8));
        let same = Descriptor::builder("a").lifetime(Lifetime::Root).constructor(|_| Ok(2u8));
        let other = Descriptor::builder("a").lifetime(Lifetime::Parent).constructor(|_| Ok(1u8));
        assert_eq!(a.fingerprint(), same.fingerprint());
        assert_ne!(a.fingerprint(), other.fingerprint());
    }

    #[test]
    fn explicit_fingerprint_wins() {
        let d = Descriptor::builder("a")
            .fingerprint(Fingerprint(7))
            .constructor(|_| Ok(()));
        assert_eq!(d.fingerprint(), Fingerprint(7));
    }

    #[test]
    fn provider_policy_selection() {
        let untagged = Descriptor::builder("id").function(|_| Ok(Some(1u32)));
        let flagged = Descriptor::builder("id")
            .lifetime(Lifetime::Singleton)
            .provider(true)
            .constructor(|_| Ok(1u32));
        let tagged = Descriptor::builder("id").lifetime_tag("state").constructor(|_| Ok(1u32));
        assert!(untagged.uses_provider_policy());
        assert!(flagged.uses_provider_policy());
        assert!(!tagged.uses_provider_policy());
    }

    #[test]
    fn function_factory_must_yield_for_construct() {
        let factory = Factory::function(|_| Ok(None::<u8>));
        let deps = Dependencies::default();
        assert_eq!(
            factory.construct("empty", &deps).err(),
            Some(DiError::EmptyInstance("empty".into()))
        );
        assert!(factory.call(&deps).unwrap().is_none());
    }
}
