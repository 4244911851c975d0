//! Modular registration.

use crate::collection::DescriptorCollection;
use crate::error::DiResult;

/// A reusable bundle of registrations.
///
/// # Example
///
/// ```rust
/// use ferrous_injector::{
///     DescriptorCollection, DescriptorCollectionExt, DescriptorModule, DiResult, Resolver,
/// };
///
/// struct UserConfig { table: &'static str }
/// struct UserRepository { table: &'static str }
///
/// struct UserModule;
///
/// impl DescriptorModule for UserModule {
///     fn register(self, descriptors: &mut DescriptorCollection) -> DiResult<()> {
///         descriptors.add_instance("user_config", UserConfig { table: "users" });
///         descriptors.add_state("user_repository", ["user_config"], |deps| {
///             Ok(UserRepository { table: deps.required::<UserConfig>("user_config")?.table })
///         });
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let injector = DescriptorCollection::new()
///     .add_module(UserModule)?
///     .build()
///     .create_injector();
/// assert_eq!(injector.get_required::<UserRepository>("user_repository")?.table, "users");
/// # Ok(())
/// # }
/// ```
pub trait DescriptorModule {
    /// Registers this module's descriptors.
    fn register(self, descriptors: &mut DescriptorCollection) -> DiResult<()>;
}

/// By-value module chaining.
pub trait DescriptorCollectionExt {
    fn add_module<M: DescriptorModule>(self, module: M) -> DiResult<Self>
    where
        Self: Sized;
}

impl DescriptorCollectionExt for DescriptorCollection {
    fn add_module<M: DescriptorModule>(mut self, module: M) -> DiResult<Self> {
        module.register(&mut self)?;
        Ok(self)
    }
}

/// In-place module registration matching the `&mut Self` registration methods.
pub trait DescriptorCollectionModuleExt {
    fn add_module_mut<M: DescriptorModule>(&mut self, module: M) -> DiResult<&mut Self>;
}

impl DescriptorCollectionModuleExt for DescriptorCollection {
    fn add_module_mut<M: DescriptorModule>(&mut self, module: M) -> DiResult<&mut Self> {
        module.register(self)?;
        Ok(self)
    }
}
