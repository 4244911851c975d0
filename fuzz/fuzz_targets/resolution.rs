#![no_main]

use ferrous_injector::{DescriptorCollection, DiError, InjectorOptions, Lifetime, Overrides};
use libfuzzer_sys::fuzz_target;

const NAMES: usize = 8;

fn lifetime(byte: u8) -> Option<Lifetime> {
    match byte % 6 {
        0 => Some(Lifetime::Transient),
        1 => Some(Lifetime::Singleton),
        2 => Some(Lifetime::State),
        3 => Some(Lifetime::Root),
        4 => Some(Lifetime::Parent),
        _ => None,
    }
}

// Each chunk of three bytes describes one descriptor: its lifetime, a bitmask
// of dependencies among the eight names, and flags.
fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let mut descriptors = DescriptorCollection::new();
    for (i, chunk) in data.chunks_exact(3).take(NAMES).enumerate() {
        let deps: Vec<String> = (0..NAMES)
            .filter(|bit| chunk[1] & (1 << bit) != 0)
            .map(|bit| format!("n{}", bit))
            .collect();
        let name = format!("n{}", i);
        match lifetime(chunk[0]) {
            Some(lifetime) => {
                descriptors.add_with_lifetime(name, lifetime, deps, |deps| Ok(deps.len()));
            }
            None => {
                let empty = chunk[2] & 1 != 0;
                descriptors.add_provider(name, deps, move |deps| {
                    Ok(if empty { None } else { Some(deps.len()) })
                });
            }
        }
    }

    let strict = data[0] & 0x80 != 0;
    let container = descriptors.build();
    let options = InjectorOptions::default()
        .with_strict(strict)
        .with_max_depth(32);
    let injector = container.create_injector_with(options);
    let overrides = Overrides::new().with("n7", 7usize);
    let validation = container.validate();

    for i in 0..NAMES {
        let name = format!("n{}", i);
        match injector.resolve_with(&name, &overrides) {
            Ok(_) => {}
            Err(DiError::Circular(path)) => {
                assert!(path.len() >= 2);
                assert!(!validation.is_valid());
            }
            Err(DiError::MissingDependency(_)) => assert!(strict),
            Err(DiError::DepthExceeded(depth)) => assert_eq!(depth, 32),
            Err(error) => panic!("unexpected error: {}", error),
        }
    }

    container.reset_singletons();
});
