//! Resolver traits for name-keyed resolution.

use std::any::Any;
use std::sync::Arc;

use crate::dependencies::Overrides;
use crate::descriptors::AnyArc;
use crate::error::{DiError, DiResult};

/// Core resolver trait for object-safe resolution.
///
/// Most users should use the [`Resolver`] trait instead, which adds typed
/// accessors on top of this one.
pub trait ResolverCore: Send + Sync {
    /// Resolves `name` into a type-erased value.
    ///
    /// `Ok(None)` means the name resolved to nothing: a provider returned no
    /// value, or the name is unknown and the resolver is lenient.
    fn resolve_any(&self, name: &str, overrides: &Overrides) -> DiResult<Option<AnyArc>>;
}

/// Typed resolution interface.
///
/// # Examples
///
/// ```
/// use ferrous_injector::{DescriptorCollection, Resolver};
///
/// let mut descriptors = DescriptorCollection::new();
/// descriptors.add_singleton("greeting", Vec::<String>::new(), |_| Ok("hi".to_string()));
///
/// let injector = descriptors.build().create_injector();
/// assert_eq!(*injector.get_required::<String>("greeting").unwrap(), "hi");
/// assert!(injector.get::<String>("unknown").unwrap().is_none());
/// assert!(injector.get::<u32>("greeting").is_err());
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves `name` as `T`, `None` when it resolved to nothing.
    fn get<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Option<Arc<T>>> {
        self.get_with(name, &Overrides::default())
    }

    /// [`get`](Self::get) with ad-hoc overrides.
    fn get_with<T: Any + Send + Sync>(
        &self,
        name: &str,
        overrides: &Overrides,
    ) -> DiResult<Option<Arc<T>>> {
        match self.resolve_any(name, overrides)? {
            Some(value) => value
                .downcast::<T>()
                .map(Some)
                .map_err(|_| DiError::TypeMismatch(format!("{} as {}", name, std::any::type_name::<T>()))),
            None => Ok(None),
        }
    }

    /// Resolves `name` as `T`, failing with `MissingDependency` when nothing came back.
    fn get_required<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        self.get_required_with(name, &Overrides::default())
    }

    /// [`get_required`](Self::get_required) with ad-hoc overrides.
    fn get_required_with<T: Any + Send + Sync>(
        &self,
        name: &str,
        overrides: &Overrides,
    ) -> DiResult<Arc<T>> {
        self.get_with(name, overrides)?
            .ok_or_else(|| DiError::MissingDependency(name.to_owned()))
    }
}
