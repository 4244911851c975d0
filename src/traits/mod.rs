//! Core traits for resolving values out of an injector.

mod resolver;

pub use resolver::{Resolver, ResolverCore};
