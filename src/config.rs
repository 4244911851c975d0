//! Injector options and where they come from.
//!
//! Options can be built in code, read from environment variables or, with
//! the `config` feature, parsed from JSON.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};

pub use crate::internal::circular::DEFAULT_MAX_DEPTH;

/// Environment variable toggling strict mode.
pub const ENV_STRICT: &str = "FERROUS_INJECTOR_STRICT";
/// Environment variable setting the maximum resolution depth.
pub const ENV_MAX_DEPTH: &str = "FERROUS_INJECTOR_MAX_DEPTH";

/// Per-injector behavior.
///
/// `strict` decides what happens to a dependency with neither a registered
/// descriptor nor an override: strict injectors fail with
/// [`DiError::MissingDependency`], lenient ones hand the factory nothing.
///
/// # Examples
///
/// ```
/// use ferrous_injector::InjectorOptions;
///
/// let options = InjectorOptions::strict().with_max_depth(64);
/// assert!(options.strict);
/// assert_eq!(options.max_depth, 64);
/// assert!(!InjectorOptions::default().strict);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct InjectorOptions {
    pub strict: bool,
    pub max_depth: usize,
}

impl Default for InjectorOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl InjectorOptions {
    /// Lenient options (the default).
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Strict options.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Reads `FERROUS_INJECTOR_STRICT` and `FERROUS_INJECTOR_MAX_DEPTH`.
    ///
    /// Unset variables keep their defaults; unparseable ones are an error.
    pub fn from_env() -> DiResult<Self> {
        let mut options = Self::default();
        if let Ok(value) = env::var(ENV_STRICT) {
            options.strict = parse_flag(ENV_STRICT, &value)?;
        }
        if let Ok(value) = env::var(ENV_MAX_DEPTH) {
            options.max_depth = value
                .trim()
                .parse()
                .map_err(|_| DiError::Config(format!("{} is not a depth: {:?}", ENV_MAX_DEPTH, value)))?;
        }
        options.validate()?;
        tracing::debug!(strict = options.strict, max_depth = options.max_depth, "injector options from environment");
        Ok(options)
    }

    /// Parses options from a JSON object; absent fields keep their defaults.
    ///
    /// ```
    /// use ferrous_injector::InjectorOptions;
    ///
    /// let options = InjectorOptions::from_json(r#"{ "strict": true }"#).unwrap();
    /// assert_eq!(options, InjectorOptions::strict());
    /// ```
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> DiResult<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| DiError::Config(format!("invalid injector options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Reads [`from_json`](Self::from_json) input from a file.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> DiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DiError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Rejects options no injector can run with.
    pub fn validate(&self) -> DiResult<()> {
        if self.max_depth == 0 {
            return Err(DiError::Config("max_depth must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse_flag(var: &str, value: &str) -> DiResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(DiError::Config(format!("{} is not a flag: {:?}", var, value))),
    }
}
