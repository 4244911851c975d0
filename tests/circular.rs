/// Cycle and depth detection
///
/// Cycles fail with the path that closed them, whichever lifetime the
/// participants use, and a failed build never leaves a half-built entry
/// behind.

use ferrous_injector::{DescriptorCollection, DiError, InjectorOptions, Resolver, DEFAULT_MAX_DEPTH};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn path(names: &[&str]) -> DiError {
    DiError::Circular(names.iter().map(|n| n.to_string()).collect())
}

#[test]
fn test_self_dependency() {
    let mut descriptors = DescriptorCollection::new();
    descriptors.add_transient("loop", ["loop"], |_| Ok(()));

    let injector = descriptors.build().create_injector();
    assert_eq!(injector.resolve("loop").unwrap_err(), path(&["loop", "loop"]));
}

#[test]
fn test_transient_cycle() {
    let mut descriptors = DescriptorCollection::new();
    descriptors.add_transient("a", ["b"], |_| Ok(()));
    descriptors.add_transient("b", ["c"], |_| Ok(()));
    descriptors.add_transient("c", ["a"], |_| Ok(()));

    let injector = descriptors.build().create_injector();
    assert_eq!(injector.resolve("a").unwrap_err(), path(&["a", "b", "c", "a"]));
    assert_eq!(injector.resolve("b").unwrap_err(), path(&["b", "c", "a", "b"]));
}

#[test]
fn test_singleton_cycle_leaves_cache_empty() {
    let mut descriptors = DescriptorCollection::new();
    descriptors.add_singleton("s1", ["s2"], |_| Ok(()));
    descriptors.add_singleton("s2", ["s1"], |_| Ok(()));
    let container = descriptors.build();

    let injector = container.create_injector();
    assert_eq!(injector.resolve("s1").unwrap_err(), path(&["s1", "s2", "s1"]));
    assert!(container.singletons().is_empty());

    // Nothing is left marked as in progress
    assert_eq!(injector.resolve("s2").unwrap_err(), path(&["s2", "s1", "s2"]));
}

#[test]
fn test_parent_cycle() {
    let mut descriptors = DescriptorCollection::new();
    descriptors.add_parent("p", ["q"], |_| Ok(()));
    descriptors.add_parent("q", ["p"], |_| Ok(()));

    let injector = descriptors.build().create_injector();
    assert_eq!(injector.resolve("p").unwrap_err(), path(&["p", "q", "p"]));
}

#[test]
fn test_mixed_lifetime_cycle() {
    let mut descriptors = DescriptorCollection::new();
    descriptors.add_state("session", ["handler"], |_| Ok(()));
    descriptors.add_root("handler", ["session"], |_| Ok(()));

    let injector = descriptors.build().create_injector();
    assert!(matches!(injector.resolve("session"), Err(DiError::Circular(_))));
    assert!(injector.state().is_empty());
}

#[test]
fn test_diamond_is_not_a_cycle() {
    let mut descriptors = DescriptorCollection::new();
    descriptors.add_singleton("base", Vec::<String>::new(), |_| Ok(0u8));
    descriptors.add_transient("left", ["base"], |_| Ok(1u8));
    descriptors.add_transient("right", ["base"], |_| Ok(2u8));
    descriptors.add_transient("top", ["left", "right"], |deps| {
        Ok(*deps.required::<u8>("left")? + *deps.required::<u8>("right")?)
    });

    let injector = descriptors.build().create_injector();
    assert_eq!(*injector.get_required::<u8>("top").unwrap(), 3);
}

#[test]
fn test_depth_limit() {
    let mut descriptors = DescriptorCollection::new();
    for i in 0..10 {
        let deps: Vec<String> = if i < 9 { vec![format!("n{}", i + 1)] } else { Vec::new() };
        descriptors.add_transient(format!("n{}", i), deps, |_| Ok(()));
    }
    let container = descriptors.build();

    let shallow = container.create_injector_with(InjectorOptions::default().with_max_depth(5));
    assert_eq!(shallow.resolve("n0").unwrap_err(), DiError::DepthExceeded(5));
    assert!(shallow.resolve("n5").is_ok());

    let deep = container.create_injector_with(InjectorOptions::default().with_max_depth(10));
    assert!(deep.resolve("n0").is_ok());
}

fn chain(len: usize) -> DescriptorCollection {
    let mut descriptors = DescriptorCollection::new();
    for i in 0..len {
        let deps: Vec<String> = if i + 1 < len { vec![format!("n{}", i + 1)] } else { Vec::new() };
        descriptors.add_transient(format!("n{}", i), deps, |_| Ok(()));
    }
    descriptors
}

#[test]
fn test_default_depth_limit_fails_before_stack_does() {
    let injector = chain(DEFAULT_MAX_DEPTH + 1).build().create_injector();
    assert_eq!(
        injector.resolve("n0").unwrap_err(),
        DiError::DepthExceeded(DEFAULT_MAX_DEPTH)
    );

    let injector = chain(DEFAULT_MAX_DEPTH).build().create_injector();
    assert!(injector.resolve("n0").is_ok());
}

#[test]
fn test_failed_singleton_build_can_be_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let mut descriptors = DescriptorCollection::new();
    descriptors.add_singleton("flaky", Vec::<String>::new(), move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(DiError::factory("flaky", "not ready"))
        } else {
            Ok(String::from("ready"))
        }
    });
    let container = descriptors.build();
    let injector = container.create_injector();

    assert!(matches!(injector.resolve("flaky"), Err(DiError::Factory { .. })));
    assert!(container.singletons().is_empty());

    assert_eq!(*injector.get_required::<String>("flaky").unwrap(), "ready");
    assert_eq!(*injector.get_required::<String>("flaky").unwrap(), "ready");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_failed_parent_build_is_not_kept() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let mut descriptors = DescriptorCollection::new();
    descriptors.add_parent("tx", Vec::<String>::new(), move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(DiError::factory("tx", "busy"))
        } else {
            Ok(1u8)
        }
    });
    descriptors.add_transient("work", ["tx"], |deps| deps.required::<u8>("tx").map(|tx| *tx));

    let injector = descriptors.build().create_injector();
    assert_eq!(injector.resolve("work").unwrap_err(), DiError::factory("tx", "busy"));
    assert_eq!(*injector.get_required::<u8>("work").unwrap(), 1);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}
