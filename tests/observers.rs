/// Resolution observers
///
/// Observers see every resolver invocation, failures, lenient misses and
/// singleton resets.

use ferrous_injector::{
    DescriptorCollection, DiError, DiObserver, Lifetime, MetricsObserver, Resolver, TracingObserver,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Records every callback as a line of text.
#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl DiObserver for Recorder {
    fn resolving(&self, name: &str, lifetime: Option<&Lifetime>) {
        let lifetime = lifetime.map(Lifetime::as_str).unwrap_or("provider");
        self.events.lock().push(format!("resolving {} ({})", name, lifetime));
    }

    fn resolved(&self, name: &str, _duration: Duration) {
        self.events.lock().push(format!("resolved {}", name));
    }

    fn failed(&self, name: &str, error: &DiError) {
        self.events.lock().push(format!("failed {}: {}", name, error));
    }

    fn missing(&self, name: &str) {
        self.events.lock().push(format!("missing {}", name));
    }

    fn cache_reset(&self, dropped: usize) {
        self.events.lock().push(format!("reset {}", dropped));
    }
}

#[test]
fn test_observer_sees_nested_resolutions_in_order() {
    let recorder = Arc::new(Recorder::default());
    let mut descriptors = DescriptorCollection::new();
    descriptors.add_observer(recorder.clone());
    descriptors.add_singleton("config", Vec::<String>::new(), |_| Ok(()));
    descriptors.add_transient("service", ["config", "tenant"], |_| Ok(()));
    let container = descriptors.build();

    container.create_injector().resolve("service").unwrap();
    assert_eq!(
        recorder.events(),
        [
            "resolving service (transient)",
            "resolving config (singleton)",
            "resolved config",
            "missing tenant",
            "resolved service",
        ]
    );

    assert_eq!(container.reset_singletons(), 1);
    assert_eq!(recorder.events().last().map(String::as_str), Some("reset 1"));
}

#[test]
fn test_failures_reported_at_every_level() {
    let recorder = Arc::new(Recorder::default());
    let mut descriptors = DescriptorCollection::new();
    descriptors.add_observer(recorder.clone());
    descriptors.add_transient("broken", Vec::<String>::new(), |_| -> Result<(), DiError> {
        Err(DiError::factory("broken", "boom"))
    });
    descriptors.add_transient("service", ["broken"], |_| Ok(()));

    let injector = descriptors.build().create_injector();
    assert!(injector.resolve("service").is_err());

    let failures: Vec<_> = recorder
        .events()
        .into_iter()
        .filter(|e| e.starts_with("failed"))
        .collect();
    assert_eq!(
        failures,
        [
            "failed broken: Factory for \"broken\" failed: boom",
            "failed service: Factory for \"broken\" failed: boom",
        ]
    );
}

#[test]
fn test_metrics_observer_counts() {
    let metrics = Arc::new(MetricsObserver::new());
    let mut descriptors = DescriptorCollection::new();
    descriptors.add_observer(metrics.clone());
    descriptors.add_state("session", ["user"], |_| Ok(()));
    descriptors.add_transient("broken", ["session"], |_| -> Result<(), DiError> {
        Err(DiError::factory("broken", "boom"))
    });

    let injector = descriptors.build().create_injector();
    injector.resolve("session").unwrap();
    injector.resolve("session").unwrap();
    assert!(injector.resolve("broken").is_err());

    // session twice, then session once more under broken
    assert_eq!(metrics.resolution_count(), 3);
    assert_eq!(metrics.failure_count(), 1);
    assert_eq!(metrics.miss_count(), 1);
    assert!(metrics.average_resolution_time().is_some());
}

#[test]
fn test_tracing_observer_emits_through_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("trace")
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut descriptors = DescriptorCollection::new();
        descriptors.add_observer(Arc::new(TracingObserver::with_label("tests")));
        descriptors.add_singleton("config", Vec::<String>::new(), |_| Ok(1u8));
        let container = descriptors.build();

        let injector = container.create_injector();
        assert_eq!(*injector.get_required::<u8>("config").unwrap(), 1);
        assert!(injector.resolve("unknown").unwrap().is_none());
        container.reset_singletons();
    });
}
