//! Part-flow and bill-of-materials graphs
//!
//! The flow graph links steps to the parts they consume and produce. Output
//! node identity depends only on the producing step: a final step's outputs
//! share the bare part key, a non-final step's outputs are keyed
//! `part(step)` and stay distinct per producer.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write as _;

use crate::core::entity::Entity;
use crate::core::partkey::{extract_step_key, output_key};
use crate::core::storage::Storage;
use crate::core::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Step,
    Part,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub key: String,
    pub kind: NodeKind,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub unit: String,
}

/// Nodes and edges in emission order; node keys are unique
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node unless one with the same key exists
    pub fn add_node(&mut self, key: impl Into<String>, kind: NodeKind, label: impl Into<String>) {
        let key = key.into();
        if self.seen.insert(key.clone()) {
            self.nodes.push(Node {
                key,
                kind,
                label: label.into(),
            });
        }
    }

    pub fn add_edge(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        amount: f64,
        unit: impl Into<String>,
    ) {
        self.edges.push(Edge {
            from: from.into(),
            to: to.into(),
            amount,
            unit: unit.into(),
        });
    }

    pub fn node(&self, key: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edges.iter().any(|e| e.from == from && e.to == to)
    }

    /// Render as Graphviz DOT text
    pub fn to_dot(&self, name: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph {} {{", escape_id(name));
        out.push_str("  rankdir=LR;\n\n");

        for node in &self.nodes {
            let shape = match node.kind {
                NodeKind::Step => "box",
                NodeKind::Part => "ellipse",
            };
            let label = if node.label.is_empty() || node.label == node.key {
                escape(&node.key)
            } else {
                format!("{}\\n{}", escape(&node.key), escape(&node.label))
            };
            let _ = writeln!(
                out,
                "  \"{}\" [shape={}, label=\"{}\"];",
                escape(&node.key),
                shape,
                label
            );
        }

        if !self.edges.is_empty() {
            out.push('\n');
        }
        for edge in &self.edges {
            let _ = writeln!(
                out,
                "  \"{}\" -> \"{}\" [label=\"{}\"];",
                escape(&edge.from),
                escape(&edge.to),
                escape(&edge_label(edge))
            );
        }

        out.push_str("}\n");
        out
    }
}

/// `amount unit`, with integral amounts printed without a fraction
pub fn edge_label(edge: &Edge) -> String {
    let amount = format_amount(edge.amount);
    if edge.unit.is_empty() {
        amount
    } else {
        format!("{} {}", amount, edge.unit)
    }
}

pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{}", amount)
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn escape_id(s: &str) -> String {
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        s.to_string()
    } else {
        format!("\"{}\"", escape(s))
    }
}

/// Steps and the parts flowing between them
///
/// Every referenced part must exist: a lookup miss is returned as
/// [`StoreError::NotFound`].
pub fn flow_graph(storage: &Storage) -> Result<FlowGraph, StoreError> {
    let mut graph = FlowGraph::new();

    for step in storage.steps.values() {
        graph.add_node(step.key(), NodeKind::Step, step.name());

        for (part_ref, amount) in &step.inputparts {
            let (base_key, _) = extract_step_key(part_ref);
            let part = storage.require_part(&base_key)?;
            graph.add_node(part_ref.as_str(), NodeKind::Part, part.name());
            graph.add_edge(part_ref.as_str(), step.key(), *amount, part.unit.as_str());
        }

        for (part_key, amount) in &step.outputparts {
            let part = storage.require_part(part_key)?;
            let node_key = output_key(part_key, step.key(), step.is_final);
            graph.add_node(node_key.as_str(), NodeKind::Part, part.name());
            graph.add_edge(step.key(), node_key, *amount, part.unit.as_str());
        }
    }

    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "built flow graph"
    );
    Ok(graph)
}

/// Part composition only: one edge per BOM component into its assembly
///
/// Components that are not stored parts still appear, labelled by key.
pub fn bom_graph(storage: &Storage) -> FlowGraph {
    let mut graph = FlowGraph::new();

    for part in storage.parts.values().filter(|p| !p.bom.is_empty()) {
        graph.add_node(part.key(), NodeKind::Part, part.name());

        for (component_key, amount) in &part.bom {
            let (label, unit) = match storage.require_part(component_key) {
                Ok(component) => (component.name(), component.unit.as_str()),
                Err(_) => (component_key.as_str(), ""),
            };
            graph.add_node(component_key.as_str(), NodeKind::Part, label);
            graph.add_edge(component_key.as_str(), part.key(), *amount, unit);
        }
    }

    graph
}
