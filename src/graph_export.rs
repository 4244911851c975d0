//! Dependency graph export for visualization and tooling.
//!
//! The graph is built from registered descriptors alone; nothing is resolved.
//! DOT and Mermaid output are always available, JSON and YAML need the
//! `graph-export` feature.

use std::collections::{BTreeMap, HashMap, HashSet};

#[cfg(feature = "graph-export")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};
use crate::injector::Container;
use crate::validation::ValidationError;

/// One registered descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct GraphNode {
    /// Identifier safe for DOT and Mermaid
    pub id: String,
    pub name: String,
    /// Lifetime tag, `provider` for untagged or provider-flagged descriptors
    pub lifetime: String,
    pub provider: bool,
    pub dependencies: Vec<String>,
    pub fingerprint: String,
}

/// A declared dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct GraphEdge {
    /// Name of the depending descriptor
    pub from: String,
    /// Declared dependency name
    pub to: String,
    pub dependency_type: DependencyType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub enum DependencyType {
    /// The dependency is registered
    Registered,
    /// Nothing is registered under the name; overrides or lenient mode decide
    Unregistered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct GraphMetadata {
    pub descriptor_count: usize,
    /// Descriptor count per lifetime tag
    pub lifetimes: BTreeMap<String, usize>,
    pub has_circular_dependencies: bool,
    pub exported_at: String,
    pub version: String,
}

/// Descriptors and their declared dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
pub struct DependencyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub metadata: GraphMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON (feature `graph-export`)
    Json,
    /// YAML (feature `graph-export`)
    Yaml,
    /// Graphviz DOT
    Dot,
    /// Mermaid flowchart
    Mermaid,
}

/// Graph export configuration options.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Emit edges to names nothing is registered under
    pub include_unregistered: bool,
    /// Only export these names (empty = all)
    pub name_filter: HashSet<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_unregistered: true,
            name_filter: HashSet::new(),
        }
    }
}

impl ExportOptions {
    fn keeps(&self, name: &str) -> bool {
        self.name_filter.is_empty() || self.name_filter.contains(name)
    }
}

fn sanitize(name: &str) -> String {
    let id: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if id.is_empty() {
        "node".to_owned()
    } else {
        id
    }
}

/// Identifiers safe for DOT and Mermaid, distinct per name.
///
/// Names that sanitize to the same text get a numeric suffix.
#[derive(Default)]
struct NodeIds {
    by_name: HashMap<String, String>,
    taken: HashSet<String>,
}

impl NodeIds {
    /// Ids for `names`, letting names that are already safe keep themselves.
    fn allocate<'a>(names: impl IntoIterator<Item = &'a str> + Clone) -> Self {
        let mut ids = Self::default();
        for name in names.clone() {
            if sanitize(name) == name {
                ids.id(name);
            }
        }
        for name in names {
            ids.id(name);
        }
        ids
    }

    fn seeded(nodes: &[GraphNode]) -> Self {
        let mut ids = Self::default();
        for node in nodes {
            ids.taken.insert(node.id.clone());
            ids.by_name.insert(node.name.clone(), node.id.clone());
        }
        ids
    }

    fn id(&mut self, name: &str) -> String {
        if let Some(id) = self.by_name.get(name) {
            return id.clone();
        }
        let base = sanitize(name);
        let mut id = base.clone();
        let mut suffix = 1;
        while !self.taken.insert(id.clone()) {
            suffix += 1;
            id = format!("{}_{}", base, suffix);
        }
        self.by_name.insert(name.to_owned(), id.clone());
        id
    }
}

fn exported_at() -> String {
    #[cfg(feature = "graph-export")]
    {
        chrono::Utc::now().to_rfc3339()
    }
    #[cfg(not(feature = "graph-export"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            .to_string()
    }
}

impl Container {
    /// Builds the dependency graph of every registered descriptor.
    ///
    /// ```
    /// use ferrous_injector::{DependencyType, DescriptorCollection};
    ///
    /// let mut descriptors = DescriptorCollection::new();
    /// descriptors.add_singleton("config", Vec::<String>::new(), |_| Ok(()));
    /// descriptors.add_transient("service", ["config", "user"], |_| Ok(()));
    ///
    /// let graph = descriptors.build().dependency_graph();
    /// assert_eq!(graph.nodes.len(), 2);
    /// assert_eq!(graph.edges.len(), 2);
    /// assert_eq!(graph.edges[1].dependency_type, DependencyType::Unregistered);
    /// ```
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let mut lifetimes = BTreeMap::new();

        let descriptors = self.descriptors();
        let mut ids = NodeIds::allocate(descriptors.iter().map(|d| d.display_name()));

        for descriptor in &descriptors {
            let name = descriptor.display_name().to_owned();
            let lifetime = match descriptor.lifetime() {
                Some(lifetime) if !descriptor.is_provider() => lifetime.as_str().to_owned(),
                _ => "provider".to_owned(),
            };
            *lifetimes.entry(lifetime.clone()).or_insert(0) += 1;

            for dependency in descriptor.dependencies() {
                edges.push(GraphEdge {
                    from: name.clone(),
                    to: dependency.clone(),
                    dependency_type: if self.contains(dependency) {
                        DependencyType::Registered
                    } else {
                        DependencyType::Unregistered
                    },
                });
            }

            nodes.push(GraphNode {
                id: ids.id(&name),
                name,
                lifetime,
                provider: descriptor.uses_provider_policy(),
                dependencies: descriptor.dependencies().to_vec(),
                fingerprint: descriptor.fingerprint().to_string(),
            });
        }

        let has_circular_dependencies = self
            .validate()
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::CircularDependency { .. }));

        DependencyGraph {
            metadata: GraphMetadata {
                descriptor_count: nodes.len(),
                lifetimes,
                has_circular_dependencies,
                exported_at: exported_at(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
            },
            nodes,
            edges,
        }
    }

    /// Builds the dependency graph and renders it as `format`.
    pub fn export_graph(&self, format: ExportFormat) -> DiResult<String> {
        self.export_graph_with(format, &ExportOptions::default())
    }

    pub fn export_graph_with(&self, format: ExportFormat, options: &ExportOptions) -> DiResult<String> {
        let graph = self.dependency_graph();
        graph.export(format, options)
    }
}

impl DependencyGraph {
    /// Renders the graph in `format`.
    pub fn export(&self, format: ExportFormat, options: &ExportOptions) -> DiResult<String> {
        let graph = self.filtered(options);
        match format {
            ExportFormat::Dot => Ok(graph.to_dot()),
            ExportFormat::Mermaid => Ok(graph.to_mermaid()),
            #[cfg(feature = "graph-export")]
            ExportFormat::Json => serde_json::to_string_pretty(&graph)
                .map_err(|e| DiError::Config(format!("JSON serialization failed: {}", e))),
            #[cfg(feature = "graph-export")]
            ExportFormat::Yaml => serde_yaml::to_string(&graph)
                .map_err(|e| DiError::Config(format!("YAML serialization failed: {}", e))),
            #[cfg(not(feature = "graph-export"))]
            ExportFormat::Json | ExportFormat::Yaml => Err(DiError::Config(format!(
                "{:?} export requires the graph-export feature",
                format
            ))),
        }
    }

    fn filtered(&self, options: &ExportOptions) -> DependencyGraph {
        let mut graph = self.clone();
        graph.nodes.retain(|node| options.keeps(&node.name));
        graph.edges.retain(|edge| {
            options.keeps(&edge.from)
                && (options.include_unregistered || edge.dependency_type == DependencyType::Registered)
        });
        graph
    }

    fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph DependencyGraph {\n");
        output.push_str("  rankdir=TB;\n");
        output.push_str("  node [shape=box];\n\n");

        for node in &self.nodes {
            let color = match node.lifetime.as_str() {
                "singleton" => "lightblue",
                "state" => "lightcyan",
                "root" | "parent" => "lightgreen",
                "transient" => "lightyellow",
                "provider" => "lightgrey",
                _ => "white",
            };
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\\n({})\", fillcolor={}, style=filled];\n",
                node.name, node.name, node.lifetime, color
            ));
        }

        output.push('\n');

        for edge in &self.edges {
            let style = match edge.dependency_type {
                DependencyType::Registered => "solid",
                DependencyType::Unregistered => "dashed",
            };
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [style={}];\n",
                edge.from, edge.to, style
            ));
        }

        output.push_str("}\n");
        output
    }

    fn to_mermaid(&self) -> String {
        let mut output = String::new();
        let mut ids = NodeIds::seeded(&self.nodes);
        output.push_str("graph TD\n");

        for node in &self.nodes {
            if node.provider {
                output.push_str(&format!("  {}({})\n", node.id, node.name));
            } else {
                output.push_str(&format!("  {}[{}]\n", node.id, node.name));
            }
        }

        for edge in &self.edges {
            let arrow = match edge.dependency_type {
                DependencyType::Registered => "-->",
                DependencyType::Unregistered => "-.->",
            };
            let (from, to) = (ids.id(&edge.from), ids.id(&edge.to));
            output.push_str(&format!("  {} {} {}\n", from, arrow, to));
        }

        output.push_str("\n  classDef singleton fill:#e1f5fe\n");
        output.push_str("  classDef scoped fill:#e8f5e8\n");
        output.push_str("  classDef transient fill:#fff3e0\n");

        for node in &self.nodes {
            let class = match node.lifetime.as_str() {
                "singleton" | "state" => "singleton",
                "root" | "parent" => "scoped",
                "transient" => "transient",
                _ => continue,
            };
            output.push_str(&format!("  class {} {}\n", node.id, class));
        }

        output
    }
}
