//! Dependency graph for features
//!
//! Read-side view of the `requires` relation used by consumers (graph
//! rendering, dependents lists, `check`). Unlike status resolution, this
//! graph only contains edges between features present in the collection:
//! dangling references are reported separately.
//!
//! Cycles and self-loops are representable here; they are reported, never
//! rejected. Uses petgraph for graph operations.

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use std::fmt::Write as _;
use thiserror::Error;

use super::feature::Feature;
use super::id::FeatureId;
use super::status::{ComputedFeature, FeatureStatus};

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Dependency cycle detected involving: {}", .0.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(", "))]
    CycleDetected(Vec<FeatureId>),
}

/// A reference from a feature to a dependency ID that does not exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub feature: FeatureId,
    pub missing: String,
}

/// A dependency graph over a feature collection
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Edge direction is dependency -> dependent
    graph: DiGraph<FeatureId, ()>,

    /// Map from FeatureId to node index
    node_map: HashMap<FeatureId, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds a graph from a collection of features
    ///
    /// Dependencies on absent IDs are skipped; duplicate `requires` entries
    /// collapse into a single edge.
    pub fn from_features<'a>(features: impl IntoIterator<Item = &'a Feature>) -> Self {
        let mut graph = Self::new();

        // First pass: add all nodes
        let features: Vec<_> = features.into_iter().collect();
        for feature in &features {
            graph.add_feature(feature.id.clone());
        }

        // Second pass: add edges between present features
        for feature in &features {
            let Some(&feature_idx) = graph.node_map.get(&feature.id) else {
                continue;
            };
            for dep in feature.requires() {
                if let Some(&dep_idx) = graph.node_map.get(dep.as_str()) {
                    graph.graph.update_edge(dep_idx, feature_idx, ());
                }
            }
        }

        graph
    }

    /// Adds a feature node (no-op if already present)
    pub fn add_feature(&mut self, id: FeatureId) {
        if !self.node_map.contains_key(&id) {
            let idx = self.graph.add_node(id.clone());
            self.node_map.insert(id, idx);
        }
    }

    fn sorted_neighbors(&self, id: &str, direction: Direction) -> Vec<FeatureId> {
        let Some(&idx) = self.node_map.get(id) else {
            return vec![];
        };

        let mut ids: Vec<FeatureId> = self
            .graph
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.graph.node_weight(n).cloned())
            .collect();
        ids.sort();
        ids
    }

    /// Present features that `id` requires, sorted
    pub fn dependencies(&self, id: &str) -> Vec<FeatureId> {
        self.sorted_neighbors(id, Direction::Incoming)
    }

    /// Features that require `id`, sorted
    pub fn dependents(&self, id: &str) -> Vec<FeatureId> {
        self.sorted_neighbors(id, Direction::Outgoing)
    }

    /// Features with no present dependencies, sorted
    pub fn roots(&self) -> Vec<FeatureId> {
        let mut roots: Vec<FeatureId> = self
            .node_map
            .iter()
            .filter(|(_, &idx)| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|(id, _)| id.clone())
            .collect();
        roots.sort();
        roots
    }

    /// Groups of features that depend on each other in a loop
    ///
    /// Each group is sorted; groups are sorted by their first member.
    /// A self-dependency is reported as a single-member group.
    pub fn cycles(&self) -> Vec<Vec<FeatureId>> {
        let mut cycles: Vec<Vec<FeatureId>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&idx| self.graph.find_edge(idx, idx).is_some())
            })
            .map(|component| {
                let mut ids: Vec<FeatureId> = component
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).cloned())
                    .collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Returns all features with dependencies before dependents
    pub fn topological_order(&self) -> Result<Vec<FeatureId>, GraphError> {
        toposort(&self.graph, None)
            .map(|order| {
                order
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).cloned())
                    .collect()
            })
            .map_err(|_| {
                GraphError::CycleDetected(self.cycles().into_iter().flatten().collect())
            })
    }

    /// Renders the graph in Graphviz DOT format, nodes coloured by status
    pub fn to_dot(&self, computed: &[ComputedFeature]) -> String {
        let statuses: HashMap<&str, FeatureStatus> = computed
            .iter()
            .map(|c| (c.id.as_str(), c.status))
            .collect();

        let mut dot = String::from("digraph features {\n    rankdir=LR;\n    node [style=filled, shape=box];\n");

        let mut nodes: Vec<&FeatureId> = self.node_map.keys().collect();
        nodes.sort();
        for id in nodes {
            let color = match statuses.get(id.as_str()) {
                Some(FeatureStatus::Active) => "#22d3ee",
                Some(FeatureStatus::DisabledManual) => "#f87171",
                Some(FeatureStatus::DisabledDependency) => "#fb923c",
                None => "#9ca3af",
            };
            let _ = writeln!(dot, "    \"{}\" [fillcolor=\"{}\"];", id, color);
        }

        let mut edges: Vec<(&FeatureId, &FeatureId)> = self
            .graph
            .edge_references()
            .filter_map(|e| {
                let dep = self.graph.node_weight(e.source())?;
                let dependent = self.graph.node_weight(e.target())?;
                Some((dependent, dep))
            })
            .collect();
        edges.sort();
        for (dependent, dep) in edges {
            let _ = writeln!(dot, "    \"{}\" -> \"{}\";", dependent, dep);
        }

        dot.push_str("}\n");
        dot
    }

    /// Returns true if the graph contains the feature
    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Returns the number of features in the graph
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Returns the number of dependency edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Lists every `requires` entry naming a feature that is not present
pub fn dangling_references(features: &[Feature]) -> Vec<DanglingReference> {
    let present: std::collections::HashSet<&str> =
        features.iter().map(|f| f.id.as_str()).collect();

    features
        .iter()
        .flat_map(|f| {
            f.requires()
                .iter()
                .filter(|dep| !present.contains(dep.as_str()))
                .map(move |dep| DanglingReference {
                    feature: f.id.clone(),
                    missing: dep.clone(),
                })
        })
        .collect()
}
