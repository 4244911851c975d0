//! Registration validation.
//!
//! Registration trusts its input. [`Container::validate`] walks the built
//! registry and reports problems that would otherwise only surface when a
//! particular name is resolved: dependencies nobody registered, custom
//! lifetimes without a policy, and dependency cycles.

use std::collections::HashSet;

use crate::error::DiError;
use crate::injector::Container;
use crate::lifetime::Lifetime;

/// Outcome of [`Container::validate`].
///
/// # Validation Rules
///
/// - **Missing dependency**: error for strict containers, warning otherwise
///   (lenient resolution hands the factory nothing)
/// - **Unknown lifetime**: error, resolution would fail with `UnknownLifetime`
/// - **Cycle**: error, resolution would fail with `Circular`
/// - **Long-lived → shorter-lived**: warning, the long-lived instance keeps the
///   first shorter-lived instance it received
/// - **Provider flag with lifetime**: warning, the lifetime is ignored
///
/// # Examples
///
/// ```
/// use ferrous_injector::{DescriptorCollection, InjectorOptions, ValidationError};
///
/// let mut descriptors = DescriptorCollection::new();
/// descriptors.with_options(InjectorOptions::strict());
/// descriptors.add_transient("a", ["b"], |_| Ok(()));
/// descriptors.add_transient("b", ["a", "missing"], |_| Ok(()));
///
/// let result = descriptors.build().validate();
/// assert!(!result.is_valid());
/// assert!(result.errors.iter().any(|e| matches!(e, ValidationError::CircularDependency { .. })));
/// assert!(result.errors.iter().any(|e| matches!(
///     e,
///     ValidationError::MissingDependency { dependency, .. } if dependency == "missing"
/// )));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Problems that make some resolution fail
    pub errors: Vec<ValidationError>,
    /// Configurations that resolve but probably not as intended
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A declared dependency has no descriptor (strict containers)
    MissingDependency { descriptor: String, dependency: String },
    /// A custom lifetime has no registered policy
    UnknownLifetime { descriptor: String, lifetime: String },
    /// Names that depend on each other in a cycle, first name repeated last
    CircularDependency { cycle: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// A declared dependency has no descriptor (lenient containers)
    MissingDependency { descriptor: String, dependency: String },
    /// A long-lived instance depends on a shorter-lived one
    CapturedDependency {
        descriptor: String,
        lifetime: Lifetime,
        dependency: String,
        dependency_lifetime: Lifetime,
    },
    /// The provider flag overrides the declared lifetime
    ProviderWithLifetime { descriptor: String, lifetime: Lifetime },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// The first error as a [`DiError`], for callers that want to bail out.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, DiError> {
        match self.errors.into_iter().next() {
            None => Ok(self.warnings),
            Some(ValidationError::MissingDependency { dependency, .. }) => {
                Err(DiError::MissingDependency(dependency))
            }
            Some(ValidationError::UnknownLifetime { lifetime, .. }) => {
                Err(DiError::UnknownLifetime(lifetime))
            }
            Some(ValidationError::CircularDependency { cycle }) => Err(DiError::Circular(cycle)),
        }
    }

    /// Human-readable listing of every issue.
    pub fn format_issues(&self) -> String {
        let mut output = String::new();
        if !self.errors.is_empty() {
            output.push_str("Errors:\n");
            for error in &self.errors {
                output.push_str(&format!("  - {}\n", format_error(error)));
            }
        }
        if !self.warnings.is_empty() {
            output.push_str("Warnings:\n");
            for warning in &self.warnings {
                output.push_str(&format!("  - {}\n", format_warning(warning)));
            }
        }
        output
    }
}

fn format_error(error: &ValidationError) -> String {
    match error {
        ValidationError::MissingDependency { descriptor, dependency } => {
            format!("'{}' depends on unregistered '{}'", descriptor, dependency)
        }
        ValidationError::UnknownLifetime { descriptor, lifetime } => {
            format!("'{}' uses lifetime '{}' which has no policy", descriptor, lifetime)
        }
        ValidationError::CircularDependency { cycle } => {
            format!("circular dependency: {}", cycle.join(" -> "))
        }
    }
}

fn format_warning(warning: &ValidationWarning) -> String {
    match warning {
        ValidationWarning::MissingDependency { descriptor, dependency } => {
            format!("'{}' depends on unregistered '{}' (resolves to nothing)", descriptor, dependency)
        }
        ValidationWarning::CapturedDependency {
            descriptor,
            lifetime,
            dependency,
            dependency_lifetime,
        } => format!(
            "{} '{}' keeps the first instance of {} '{}'",
            lifetime, descriptor, dependency_lifetime, dependency
        ),
        ValidationWarning::ProviderWithLifetime { descriptor, lifetime } => {
            format!("'{}' is a provider, its '{}' lifetime is ignored", descriptor, lifetime)
        }
    }
}

/// How long instances of a lifetime live, for captured-dependency checks.
/// Custom lifetimes are not ranked.
fn scope_rank(lifetime: &Lifetime) -> Option<u8> {
    match lifetime {
        Lifetime::Transient => Some(1),
        Lifetime::Root | Lifetime::Parent => Some(2),
        Lifetime::State => Some(3),
        Lifetime::Singleton => Some(4),
        Lifetime::Custom(_) => None,
    }
}

impl Container {
    /// Checks every registered descriptor.
    pub fn validate(&self) -> ValidationResult {
        let strict = self.options().strict;
        let mut result = ValidationResult::default();
        let descriptors = self.descriptors();

        for descriptor in &descriptors {
            let name = descriptor.display_name();

            if descriptor.is_provider() {
                if let Some(lifetime) = descriptor.lifetime() {
                    result.warnings.push(ValidationWarning::ProviderWithLifetime {
                        descriptor: name.to_owned(),
                        lifetime: lifetime.clone(),
                    });
                }
            } else if let Some(Lifetime::Custom(tag)) = descriptor.lifetime() {
                if self.policy(tag).is_none() {
                    result.errors.push(ValidationError::UnknownLifetime {
                        descriptor: name.to_owned(),
                        lifetime: tag.to_string(),
                    });
                }
            }

            for dependency in descriptor.dependencies() {
                let Some(target) = self.descriptor(dependency) else {
                    if strict {
                        result.errors.push(ValidationError::MissingDependency {
                            descriptor: name.to_owned(),
                            dependency: dependency.clone(),
                        });
                    } else {
                        result.warnings.push(ValidationWarning::MissingDependency {
                            descriptor: name.to_owned(),
                            dependency: dependency.clone(),
                        });
                    }
                    continue;
                };

                if descriptor.uses_provider_policy() || target.uses_provider_policy() {
                    continue;
                }
                if let (Some(lifetime), Some(dependency_lifetime)) =
                    (descriptor.lifetime(), target.lifetime())
                {
                    let captured = lifetime.is_long_lived()
                        && matches!(
                            (scope_rank(lifetime), scope_rank(dependency_lifetime)),
                            (Some(own), Some(theirs)) if theirs < own
                        );
                    if captured {
                        result.warnings.push(ValidationWarning::CapturedDependency {
                            descriptor: name.to_owned(),
                            lifetime: lifetime.clone(),
                            dependency: dependency.clone(),
                            dependency_lifetime: dependency_lifetime.clone(),
                        });
                    }
                }
            }
        }

        for cycle in self.detect_cycles() {
            result.errors.push(ValidationError::CircularDependency { cycle });
        }

        tracing::debug!(
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "container validated"
        );
        result
    }

    fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        for descriptor in self.descriptors() {
            if let Some(name) = descriptor.name() {
                self.dfs_cycles(name, &mut visited, &mut path, &mut cycles);
            }
        }
        cycles
    }

    fn dfs_cycles<'a>(
        &'a self,
        current: &'a str,
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        if let Some(start) = path.iter().position(|&name| name == current) {
            let cycle = path[start..]
                .iter()
                .chain(std::iter::once(&current))
                .map(|name| name.to_string())
                .collect();
            cycles.push(cycle);
            return;
        }
        if !visited.insert(current) {
            return;
        }

        let Some(descriptor) = self.descriptor(current) else {
            return;
        };
        path.push(current);
        for dependency in descriptor.dependencies() {
            self.dfs_cycles(dependency, visited, path, cycles);
        }
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Descriptor, DescriptorCollection, InjectorOptions};

    #[test]
    fn clean_container_is_valid() {
        let mut descriptors = DescriptorCollection::new();
        descriptors.add_singleton("config", Vec::<String>::new(), |_| Ok(()));
        descriptors.add_transient("service", ["config"], |_| Ok(()));
        let result = descriptors.build().validate();
        assert!(result.is_valid());
        assert!(!result.has_warnings());
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn missing_dependency_severity_follows_strictness() {
        let build = |options: InjectorOptions| {
            let mut descriptors = DescriptorCollection::new();
            descriptors.with_options(options);
            descriptors.add_transient("service", ["ghost"], |_| Ok(()));
            descriptors.build().validate()
        };

        let lenient = build(InjectorOptions::lenient());
        assert!(lenient.is_valid());
        assert_eq!(lenient.warnings.len(), 1);

        let strict = build(InjectorOptions::strict());
        assert_eq!(
            strict.into_result(),
            Err(DiError::MissingDependency("ghost".into()))
        );
    }

    #[test]
    fn reports_unknown_lifetime() {
        let mut descriptors = DescriptorCollection::new();
        descriptors.add(
            Descriptor::builder("pooled")
                .lifetime(Lifetime::custom("pool"))
                .constructor(|_| Ok(())),
        );
        let result = descriptors.build().validate();
        assert_eq!(
            result.errors,
            [ValidationError::UnknownLifetime {
                descriptor: "pooled".into(),
                lifetime: "pool".into(),
            }]
        );
    }

    #[test]
    fn reports_self_cycle_once() {
        let mut descriptors = DescriptorCollection::new();
        descriptors.add_transient("loop", ["loop"], |_| Ok(()));
        let result = descriptors.build().validate();
        assert_eq!(
            result.errors,
            [ValidationError::CircularDependency {
                cycle: vec!["loop".into(), "loop".into()],
            }]
        );
        assert!(result.format_issues().contains("loop -> loop"));
    }

    #[test]
    fn warns_about_captured_and_ignored_lifetimes() {
        let mut descriptors = DescriptorCollection::new();
        descriptors.add_singleton("cache", ["request"], |_| Ok(()));
        descriptors.add_root("request", Vec::<String>::new(), |_| Ok(()));
        descriptors.add(
            Descriptor::builder("id")
                .lifetime(Lifetime::State)
                .provider(true)
                .function(|_| Ok(Some(1u32))),
        );
        let result = descriptors.build().validate();
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 2);
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, ValidationWarning::CapturedDependency { descriptor, .. } if descriptor == "cache")));
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, ValidationWarning::ProviderWithLifetime { descriptor, .. } if descriptor == "id")));
    }
}
