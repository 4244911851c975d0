//! Lifetime tags controlling instance sharing.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Lifetime tags controlling instance caching behavior
///
/// A descriptor without a lifetime tag is a *provider*: its factory runs on
/// every request and the result is never cached. Every other tag names the
/// scope an instance is shared within.
///
/// # Lifetime Characteristics
///
/// - **Transient**: never shared
/// - **Singleton**: shared by every injector of a container until reset
/// - **State**: shared within one injector
/// - **Root**: shared within one resolution tree
/// - **Parent**: shared with the outermost ancestor that also declares it
/// - **Custom**: dispatched to a registered [`LifetimePolicy`](crate::LifetimePolicy)
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::Lifetime;
///
/// assert_eq!("singleton".parse::<Lifetime>().unwrap(), Lifetime::Singleton);
/// assert_eq!("pooled".parse::<Lifetime>().unwrap(), Lifetime::custom("pooled"));
/// assert_eq!(Lifetime::parse_tag(""), None);
/// assert_eq!(Lifetime::parse_tag("none"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// New instance per resolution, never cached
    Transient,
    /// Single instance per container (or per process, when shared), cached until reset
    Singleton,
    /// Single instance per injector
    State,
    /// Single instance per resolution tree
    Root,
    /// Single instance per outermost declaring ancestor
    Parent,
    /// Extension lifetime resolved through the container's policy table
    Custom(Cow<'static, str>),
}

impl Lifetime {
    /// Creates a custom lifetime tag.
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        Lifetime::Custom(name.into())
    }

    /// Parses an authored tag, mapping the empty string and `"none"` to no tag.
    pub fn parse_tag(tag: &str) -> Option<Lifetime> {
        match tag {
            "" | "none" => None,
            other => other.parse().ok(),
        }
    }

    /// Tag name as authored.
    pub fn as_str(&self) -> &str {
        match self {
            Lifetime::Transient => "transient",
            Lifetime::Singleton => "singleton",
            Lifetime::State => "state",
            Lifetime::Root => "root",
            Lifetime::Parent => "parent",
            Lifetime::Custom(name) => name,
        }
    }

    /// Whether instances of this lifetime outlive the resolution call that built them.
    pub fn is_long_lived(&self) -> bool {
        matches!(self, Lifetime::Singleton | Lifetime::State)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lifetime {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "transient" => Lifetime::Transient,
            "singleton" => Lifetime::Singleton,
            "state" => Lifetime::State,
            "root" => Lifetime::Root,
            "parent" => Lifetime::Parent,
            other => Lifetime::Custom(Cow::Owned(other.to_owned())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_builtin_tags() {
        for tag in ["transient", "singleton", "state", "root", "parent"] {
            let lifetime: Lifetime = tag.parse().unwrap();
            assert_eq!(lifetime.as_str(), tag);
            assert!(!matches!(lifetime, Lifetime::Custom(_)));
        }
    }

    #[test]
    fn unknown_tags_become_custom() {
        assert_eq!(Lifetime::parse_tag("request"), Some(Lifetime::custom("request")));
        assert_eq!(Lifetime::custom("request").to_string(), "request");
    }

    #[test]
    fn long_lived_lifetimes() {
        assert!(Lifetime::Singleton.is_long_lived());
        assert!(Lifetime::State.is_long_lived());
        assert!(!Lifetime::Root.is_long_lived());
        assert!(!Lifetime::Parent.is_long_lived());
    }
}
