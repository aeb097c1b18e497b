use serde::{Deserialize, Serialize};

use crate::model::edge::{Edge, RelationKind};
use crate::model::node::Node;

// ---------------------------------------------------------------------------
// Graph: the response payload
// ---------------------------------------------------------------------------

/// Nodes plus edges in insertion order (structural first, semantic after).
///
/// Built by [`crate::assemble::assemble`], which enforces that node ids are
/// unique and every edge references a known node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn edges_of_kind(&self, kind: RelationKind) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.kind == kind)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Serialize to the JSON wire shape `{ "nodes": [...], "edges": [...] }`.
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
