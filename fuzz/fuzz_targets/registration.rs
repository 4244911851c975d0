#![no_main]

use ferrous_injector::{Descriptor, DescriptorCollection, ExportFormat};
use libfuzzer_sys::fuzz_target;

// Arbitrary names, tags and dependency lists must register, validate and
// export without panicking.
fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut parts = text.split('\n');

    let mut descriptors = DescriptorCollection::new();
    while let (Some(name), Some(tag), Some(deps)) = (parts.next(), parts.next(), parts.next()) {
        descriptors.add(
            Descriptor::builder(name)
                .lifetime_tag(tag)
                .depends_on(deps.split(',').filter(|d| !d.is_empty()))
                .constructor(|_| Ok(())),
        );
    }

    let container = descriptors.build();
    let result = container.validate();
    let _ = result.format_issues();
    for format in [ExportFormat::Dot, ExportFormat::Mermaid] {
        assert!(container.export_graph(format).is_ok());
    }
});
