//! Internal implementation details.

pub(crate) mod circular;

pub(crate) use circular::guard_instantiation;

/// Hash map used for every name-keyed table in the crate.
#[cfg(feature = "ahash")]
pub(crate) type FastMap<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type FastMap<K, V> = std::collections::HashMap<K, V>;
