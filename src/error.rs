//! Error types for the injector.

use thiserror::Error;

/// Dependency resolution errors
///
/// Represents the conditions that can stop a resolution call. Every error
/// propagates synchronously through all enclosing resolutions; nothing is
/// recovered internally.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{DescriptorCollection, DiError, InjectorOptions};
///
/// let container = DescriptorCollection::new().build();
/// let injector = container.create_injector_with(InjectorOptions::strict());
///
/// match injector.resolve("logger") {
///     Err(DiError::MissingDependency(name)) => assert_eq!(name, "logger"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_injector::DiError;
///
/// let circular = DiError::Circular(vec!["a".into(), "b".into(), "a".into()]);
/// assert_eq!(circular.to_string(), "Circular dependency: a -> b -> a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    /// No resolver and no override exists for a name (strict mode only)
    #[error("There is no dependency named \"{0}\" registered")]
    MissingDependency(String),
    /// Typed access to a resolved value failed to downcast
    #[error("Type mismatch for: {0}")]
    TypeMismatch(String),
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// Maximum resolution depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// A custom lifetime tag has no registered policy
    #[error("No lifetime policy registered for \"{0}\"")]
    UnknownLifetime(String),
    /// A function-style factory returned nothing where an instance was required
    #[error("Factory for \"{0}\" produced no instance")]
    EmptyInstance(String),
    /// Error raised by user factory code
    #[error("Factory for \"{name}\" failed: {message}")]
    Factory { name: String, message: String },
    /// Invalid injector options
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DiError {
    /// Wraps a factory failure for the descriptor `name`.
    pub fn factory(name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        DiError::Factory {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for injector operations
pub type DiResult<T> = Result<T, DiError>;
