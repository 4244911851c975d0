//! # ferrous-injector
//!
//! Name-keyed hierarchical dependency injection. Values are registered as
//! descriptors (a name, a factory, declared dependency names and a lifetime
//! tag) and resolved by name, building whatever they depend on first.
//!
//! ## Features
//!
//! - **Six sharing policies**: transient, singleton, state, root, parent and provider
//! - **Pluggable lifetimes**: custom lifetime tags dispatched to registered policies
//! - **Ad-hoc overrides**: caller-supplied values for names nothing is registered under
//! - **Strict or lenient**: unregistered names fail or resolve to nothing
//! - **Cycle detection**: cycles fail with the offending path instead of recursing
//! - **Thread-safe**: singletons are built once even under concurrent first access
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_injector::{DescriptorCollection, Resolver};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut descriptors = DescriptorCollection::new();
//! descriptors.add_singleton("database", Vec::<String>::new(), |_| {
//!     Ok(Database { url: "postgres://localhost".to_string() })
//! });
//! descriptors.add_transient("users", ["database"], |deps| {
//!     Ok(UserService { db: deps.required::<Database>("database")? })
//! });
//!
//! let injector = descriptors.build().create_injector();
//! let users = injector.get_required::<UserService>("users").unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//! ```
//!
//! ## Lifetimes
//!
//! - **Transient**: a new instance on every resolution
//! - **Singleton**: one instance per container (or process), until reset
//! - **State**: one instance per injector
//! - **Root**: one instance per top-level resolution call
//! - **Parent**: one instance per outermost ancestor declaring the same dependency
//! - **Provider** (no tag): the factory is a plain function called every time
//!
//! ## Parent Scoping
//!
//! ```rust
//! use ferrous_injector::{DescriptorCollection, Resolver};
//! use std::sync::Arc;
//!
//! struct Transaction;
//! struct Repository { tx: Arc<Transaction> }
//! struct UnitOfWork { tx: Arc<Transaction>, repo: Arc<Repository> }
//!
//! let mut descriptors = DescriptorCollection::new();
//! descriptors.add_parent("tx", Vec::<String>::new(), |_| Ok(Transaction));
//! descriptors.add_transient("repo", ["tx"], |deps| {
//!     Ok(Repository { tx: deps.required("tx")? })
//! });
//! descriptors.add_transient("work", ["tx", "repo"], |deps| {
//!     Ok(UnitOfWork { tx: deps.required("tx")?, repo: deps.required("repo")? })
//! });
//!
//! let injector = descriptors.build().create_injector();
//! let work = injector.get_required::<UnitOfWork>("work").unwrap();
//! // "work" declares "tx" itself, so the repository shares its transaction
//! assert!(Arc::ptr_eq(&work.tx, &work.repo.tx));
//! ```

pub mod cache;
pub mod collection;
pub mod config;
pub mod dependencies;
pub mod descriptors;
pub mod error;
pub mod graph_export;
pub mod injector;
pub mod lifetime;
pub mod observer;
pub mod resolvers;
pub mod traits;
pub mod validation;

// Internal modules
mod internal;
mod registration;

pub use cache::{BuildGuard, CacheEntry, InstanceCache};
pub use collection::{
    DescriptorCollection, DescriptorCollectionExt, DescriptorCollectionModuleExt, DescriptorModule,
};
pub use config::{InjectorOptions, DEFAULT_MAX_DEPTH};
pub use dependencies::{Dependencies, Overrides};
pub use descriptors::{AnyArc, Descriptor, DescriptorBuilder, Factory, Fingerprint};
pub use error::{DiError, DiResult};
pub use graph_export::{
    DependencyGraph, DependencyType, ExportFormat, ExportOptions, GraphEdge, GraphMetadata, GraphNode,
};
pub use injector::{ChildSlot, Container, Injector, Node, NodeId, Resolution, ResolutionTree};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, MetricsObserver, TracingObserver};
pub use resolvers::{
    select_scope, CachedResolver, LifetimePolicy, LifetimeResolver, ParentResolver, PolicyTable,
    ProviderResolver, Resolve, RootResolver, TransientResolver,
};
pub use traits::{Resolver, ResolverCore};
pub use validation::{ValidationError, ValidationResult, ValidationWarning};
