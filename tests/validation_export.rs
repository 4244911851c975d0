/// Validation and dependency graph export for a small application
///
/// Both work from the registrations alone; nothing is resolved.

use ferrous_injector::{
    DependencyType, DescriptorCollection, DiError, ExportFormat, ExportOptions, InjectorOptions,
    Lifetime, ValidationError, ValidationWarning,
};

fn application(strict: bool) -> DescriptorCollection {
    let mut descriptors = DescriptorCollection::new();
    descriptors.with_options(InjectorOptions::default().with_strict(strict));
    descriptors.add_instance("settings", String::from("postgres://localhost"));
    descriptors.add_singleton("pool", ["settings"], |_| Ok(()));
    descriptors.add_parent("transaction", ["pool"], |_| Ok(()));
    descriptors.add_transient("user_repository", ["transaction"], |_| Ok(()));
    descriptors.add_transient("order_repository", ["transaction"], |_| Ok(()));
    descriptors.add_root(
        "checkout",
        ["transaction", "user_repository", "order_repository", "request_id"],
        |_| Ok(()),
    );
    descriptors
}

#[test]
fn test_lenient_application_is_valid_with_warning() {
    let result = application(false).build().validate();

    assert!(result.is_valid(), "{}", result.format_issues());
    assert_eq!(
        result.warnings,
        [ValidationWarning::MissingDependency {
            descriptor: "checkout".into(),
            dependency: "request_id".into(),
        }]
    );
}

#[test]
fn test_strict_application_reports_missing_dependency() {
    let result = application(true).build().validate();

    assert_eq!(
        result.errors,
        [ValidationError::MissingDependency {
            descriptor: "checkout".into(),
            dependency: "request_id".into(),
        }]
    );
    assert!(result.format_issues().contains("'checkout' depends on unregistered 'request_id'"));
    assert_eq!(
        result.into_result(),
        Err(DiError::MissingDependency("request_id".into()))
    );
}

#[test]
fn test_captured_shorter_lived_dependency_warns() {
    let mut descriptors = application(false);
    descriptors.add_singleton("audit", ["transaction"], |_| Ok(()));
    let result = descriptors.build().validate();

    assert!(result.warnings.contains(&ValidationWarning::CapturedDependency {
        descriptor: "audit".into(),
        lifetime: Lifetime::Singleton,
        dependency: "transaction".into(),
        dependency_lifetime: Lifetime::Parent,
    }));
}

#[test]
fn test_cycle_is_reported_and_flagged_in_graph() {
    let mut descriptors = application(false);
    descriptors.add_singleton("pool", ["settings", "checkout"], |_| Ok(()));
    let container = descriptors.build();

    let result = container.validate();
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, ValidationError::CircularDependency { cycle } if cycle.first() == cycle.last())));
    assert!(container.dependency_graph().metadata.has_circular_dependencies);
}

#[test]
fn test_graph_describes_registrations() {
    let graph = application(false).build().dependency_graph();

    assert_eq!(graph.metadata.descriptor_count, 6);
    assert_eq!(graph.metadata.lifetimes.get("transient"), Some(&2));
    assert_eq!(graph.metadata.lifetimes.get("singleton"), Some(&2));
    assert_eq!(graph.metadata.version, env!("CARGO_PKG_VERSION"));

    let unregistered: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| e.dependency_type == DependencyType::Unregistered)
        .map(|e| e.to.as_str())
        .collect();
    assert_eq!(unregistered, ["request_id"]);

    let checkout = graph.nodes.iter().find(|n| n.name == "checkout").unwrap();
    assert_eq!(checkout.lifetime, "root");
    assert_eq!(checkout.dependencies.len(), 4);
}

#[test]
fn test_dot_and_mermaid_exports() {
    let container = application(false).build();

    let dot = container.export_graph(ExportFormat::Dot).unwrap();
    assert!(dot.contains("\"transaction\" [label=\"transaction\\n(parent)\", fillcolor=lightgreen, style=filled];"));
    assert!(dot.contains("\"checkout\" -> \"request_id\" [style=dashed];"));
    assert!(dot.ends_with("}\n"));

    let mermaid = container.export_graph(ExportFormat::Mermaid).unwrap();
    assert!(mermaid.starts_with("graph TD\n"));
    assert!(mermaid.contains("  user_repository --> transaction\n"));
    assert!(mermaid.contains("  checkout -.-> request_id\n"));
}

#[test]
fn test_export_name_filter() {
    let container = application(false).build();
    let options = ExportOptions {
        name_filter: ["pool".to_string()].into_iter().collect(),
        ..ExportOptions::default()
    };

    let dot = container.export_graph_with(ExportFormat::Dot, &options).unwrap();
    assert!(dot.contains("\"pool\" -> \"settings\""));
    assert!(!dot.contains("checkout"));
}

#[cfg(not(feature = "graph-export"))]
#[test]
fn test_structured_formats_need_feature() {
    let container = application(false).build();
    assert!(matches!(container.export_graph(ExportFormat::Json), Err(DiError::Config(_))));
    assert!(matches!(container.export_graph(ExportFormat::Yaml), Err(DiError::Config(_))));
}

#[cfg(feature = "graph-export")]
#[test]
fn test_structured_exports() {
    let container = application(false).build();

    let json = container.export_graph(ExportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["metadata"]["descriptor_count"], 6);
    assert_eq!(value["edges"].as_array().unwrap().len(), 8);

    let yaml = container.export_graph(ExportFormat::Yaml).unwrap();
    assert!(yaml.contains("name: checkout"));
}
