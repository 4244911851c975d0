//! Resolved factory arguments and ad-hoc overrides.

use std::any::Any;
use std::sync::Arc;

use crate::descriptors::AnyArc;
use crate::error::{DiError, DiResult};
use crate::internal::FastMap;

/// Resolved arguments handed to a factory, in declaration order.
///
/// Each entry pairs the declared dependency name with its value. A value is
/// `None` when the dependency was not registered, had no override and the
/// injector runs in lenient mode (or when a provider returned nothing).
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{DescriptorCollection, Resolver};
///
/// struct Config { port: u16 }
/// struct Server { port: u16, name: Option<String> }
///
/// let mut descriptors = DescriptorCollection::new();
/// descriptors.add_singleton("config", Vec::<String>::new(), |_| Ok(Config { port: 8080 }));
/// descriptors.add_transient("server", ["config", "name"], |deps| {
///     Ok(Server {
///         port: deps.required::<Config>("config")?.port,
///         name: deps.get::<String>("name")?.map(|n| (*n).clone()),
///     })
/// });
///
/// let injector = descriptors.build().create_injector();
/// let server = injector.get_required::<Server>("server").unwrap();
/// assert_eq!(server.port, 8080);
/// assert!(server.name.is_none());
/// ```
#[derive(Default, Clone)]
pub struct Dependencies {
    entries: Vec<(String, Option<AnyArc>)>,
}

impl Dependencies {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: Option<AnyArc>) {
        self.entries.push((name.into(), value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&AnyArc>)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    /// Raw value for `name`. The first entry wins when a name is declared twice.
    pub fn value(&self, name: &str) -> Option<&AnyArc> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Typed value for `name`, `None` when absent.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Option<Arc<T>>> {
        self.value(name)
            .map(|value| downcast(name, value))
            .transpose()
    }

    /// Typed value for `name`, failing with `MissingDependency` when absent.
    pub fn required<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        self.get(name)?
            .ok_or_else(|| DiError::MissingDependency(name.to_owned()))
    }

    /// Typed value at position `index`.
    pub fn at<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Option<Arc<T>>> {
        match self.entries.get(index) {
            Some((name, Some(value))) => downcast(name, value).map(Some),
            _ => Ok(None),
        }
    }
}

impl std::fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, value)| (name, value.is_some())))
            .finish()
    }
}

fn downcast<T: Any + Send + Sync>(name: &str, value: &AnyArc) -> DiResult<Arc<T>> {
    value
        .clone()
        .downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(format!("{} as {}", name, std::any::type_name::<T>())))
}

/// Caller-supplied values for names that have no registered resolver.
///
/// Overrides travel with a single resolution call and are consulted at every
/// level of the tree. They never shadow a registered descriptor.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{DescriptorCollection, InjectorOptions, Overrides, Resolver};
///
/// struct Greeting(String);
///
/// let mut descriptors = DescriptorCollection::new();
/// descriptors.add_transient("greeting", ["user"], |deps| {
///     Ok(Greeting(format!("hello {}", deps.required::<String>("user")?)))
/// });
///
/// let injector = descriptors.build().create_injector_with(InjectorOptions::strict());
/// let overrides = Overrides::new().with("user", "ada".to_string());
/// let greeting = injector.get_required_with::<Greeting>("greeting", &overrides).unwrap();
/// assert_eq!(greeting.0, "hello ada");
/// ```
#[derive(Default, Clone)]
pub struct Overrides {
    values: FastMap<String, AnyArc>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, builder style.
    pub fn with<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.insert(name, Arc::new(value));
        self
    }

    /// Adds an already shared value, builder style.
    pub fn with_arc<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: Arc<T>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AnyArc) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AnyArc> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for Overrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}
