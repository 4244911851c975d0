//! Diagnostic observers for resolution events.
//!
//! Observers see every resolver invocation, every lenient miss and every
//! singleton cache reset. With no observer registered the resolution path
//! skips all timing and notification work.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::lifetime::Lifetime;

/// Observer trait for resolution events.
///
/// Observer calls are made synchronously during resolution. Keep
/// implementations lightweight.
///
/// # Examples
///
/// ```
/// use ferrous_injector::{DescriptorCollection, DiObserver, Lifetime, Resolver};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder {
///     seen: Mutex<Vec<String>>,
/// }
///
/// impl DiObserver for Recorder {
///     fn resolving(&self, name: &str, _lifetime: Option<&Lifetime>) {
///         self.seen.lock().unwrap().push(name.to_string());
///     }
///
///     fn resolved(&self, _name: &str, _duration: Duration) {}
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let mut descriptors = DescriptorCollection::new();
/// descriptors.add_transient("clock", Vec::<String>::new(), |_| Ok(0u64));
/// descriptors.add_observer(recorder.clone());
///
/// let injector = descriptors.build().create_injector();
/// injector.get_required::<u64>("clock").unwrap();
/// assert_eq!(*recorder.seen.lock().unwrap(), ["clock"]);
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before a resolver runs.
    fn resolving(&self, name: &str, lifetime: Option<&Lifetime>);

    /// Called after a resolver returned successfully.
    ///
    /// `duration` covers the whole resolver call, dependencies included.
    fn resolved(&self, name: &str, duration: Duration);

    /// Called when a resolver returned an error. The error still propagates.
    fn failed(&self, name: &str, error: &DiError) {
        let _ = (name, error);
    }

    /// Called when a lenient injector substitutes nothing for an unregistered name.
    fn missing(&self, name: &str) {
        let _ = name;
    }

    /// Called after the singleton cache was reset.
    fn cache_reset(&self, dropped: usize) {
        let _ = dropped;
    }
}

/// Registered observers of one container.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    pub(crate) fn resolving(&self, name: &str, lifetime: Option<&Lifetime>) {
        for observer in &self.observers {
            observer.resolving(name, lifetime);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, name: &str, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(name, duration);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, name: &str, error: &DiError) {
        for observer in &self.observers {
            observer.failed(name, error);
        }
    }

    #[inline]
    pub(crate) fn missing(&self, name: &str) {
        for observer in &self.observers {
            observer.missing(name);
        }
    }

    pub(crate) fn cache_reset(&self, dropped: usize) {
        for observer in &self.observers {
            observer.cache_reset(dropped);
        }
    }
}

/// Built-in observer emitting `tracing` events.
///
/// Resolution steps are logged at `trace`, misses and resets at `debug`,
/// failures at `warn`.
///
/// # Examples
///
/// ```
/// use ferrous_injector::{DescriptorCollection, TracingObserver};
/// use std::sync::Arc;
///
/// let mut descriptors = DescriptorCollection::new();
/// descriptors.add_observer(Arc::new(TracingObserver::new()));
/// let container = descriptors.build();
/// ```
#[derive(Debug, Clone)]
pub struct TracingObserver {
    label: String,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::with_label("ferrous-injector")
    }

    /// Tags every event with `label`, for telling containers apart.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for TracingObserver {
    fn resolving(&self, name: &str, lifetime: Option<&Lifetime>) {
        let lifetime = lifetime.map(Lifetime::as_str).unwrap_or("provider");
        tracing::trace!(label = %self.label, name, lifetime, "resolving");
    }

    fn resolved(&self, name: &str, duration: Duration) {
        tracing::trace!(label = %self.label, name, ?duration, "resolved");
    }

    fn failed(&self, name: &str, error: &DiError) {
        tracing::warn!(label = %self.label, name, %error, "resolution failed");
    }

    fn missing(&self, name: &str) {
        tracing::debug!(label = %self.label, name, "unregistered dependency resolved to nothing");
    }

    fn cache_reset(&self, dropped: usize) {
        tracing::debug!(label = %self.label, dropped, "singleton cache reset");
    }
}

/// Observer counting resolutions, failures and misses.
#[derive(Debug, Default)]
pub struct MetricsObserver {
    resolution_count: AtomicU64,
    total_resolution_time: AtomicU64,
    failure_count: AtomicU64,
    miss_count: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolution_count(&self) -> u64 {
        self.resolution_count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> u64 {
        self.miss_count.load(Ordering::Relaxed)
    }

    pub fn total_resolution_time(&self) -> Duration {
        Duration::from_nanos(self.total_resolution_time.load(Ordering::Relaxed))
    }

    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolution_count();
        if count == 0 {
            return None;
        }
        Some(self.total_resolution_time() / count as u32)
    }

    pub fn reset(&self) {
        self.resolution_count.store(0, Ordering::Relaxed);
        self.total_resolution_time.store(0, Ordering::Relaxed);
        self.failure_count.store(0, Ordering::Relaxed);
        self.miss_count.store(0, Ordering::Relaxed);
    }
}

impl DiObserver for MetricsObserver {
    fn resolving(&self, _name: &str, _lifetime: Option<&Lifetime>) {}

    fn resolved(&self, _name: &str, duration: Duration) {
        self.resolution_count.fetch_add(1, Ordering::Relaxed);
        self.total_resolution_time
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn failed(&self, _name: &str, _error: &DiError) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    fn missing(&self, _name: &str) {
        self.miss_count.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_observer_counts() {
        let observer = MetricsObserver::new();
        assert!(observer.average_resolution_time().is_none());

        observer.resolved("a", Duration::from_millis(10));
        observer.resolved("b", Duration::from_millis(20));
        observer.failed("c", &DiError::MissingDependency("d".into()));
        observer.missing("d");

        assert_eq!(observer.resolution_count(), 2);
        assert_eq!(observer.failure_count(), 1);
        assert_eq!(observer.miss_count(), 1);
        assert_eq!(observer.average_resolution_time(), Some(Duration::from_millis(15)));

        observer.reset();
        assert_eq!(observer.resolution_count(), 0);
        assert_eq!(observer.total_resolution_time(), Duration::ZERO);
    }

    #[test]
    fn observers_fan_out() {
        let metrics = Arc::new(MetricsObserver::new());
        let mut observers = Observers::new();
        assert!(!observers.has_observers());

        observers.add(metrics.clone());
        observers.add(Arc::new(TracingObserver::new()));
        assert_eq!(observers.len(), 2);

        observers.resolving("a", Some(&Lifetime::Singleton));
        observers.resolved("a", Duration::from_millis(1));
        observers.missing("b");
        observers.cache_reset(3);

        assert_eq!(metrics.resolution_count(), 1);
        assert_eq!(metrics.miss_count(), 1);
    }
}
