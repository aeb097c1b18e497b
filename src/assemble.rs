use std::collections::HashSet;

use crate::error::{TrendGraphError, TrendGraphResult};
use crate::model::{Edge, Graph, Node};

// ---------------------------------------------------------------------------
// Graph Assembler: merge nodes and edge passes into one validated Graph
// ---------------------------------------------------------------------------

/// Merge nodes, structural edges and semantic edges into a [`Graph`].
///
/// Structural edges keep their order and come first; semantic edges are
/// appended after them. Any broken invariant is reported as
/// [`TrendGraphError::InconsistentGraph`], since it can only come from a bug
/// in an upstream pass.
pub fn assemble(
    nodes: Vec<Node>,
    structural_edges: Vec<Edge>,
    semantic_edges: Vec<Edge>,
) -> TrendGraphResult<Graph> {
    let mut ids: HashSet<&str> = HashSet::with_capacity(nodes.len());
    for node in &nodes {
        if !ids.insert(node.id.as_str()) {
            return Err(TrendGraphError::InconsistentGraph(format!(
                "duplicate node id '{}'",
                node.id
            )));
        }
    }

    for edge in structural_edges.iter().chain(semantic_edges.iter()) {
        validate_edge(edge, &ids)?;
    }

    let mut edges = structural_edges;
    edges.extend(semantic_edges);

    Ok(Graph { nodes, edges })
}

fn validate_edge(edge: &Edge, ids: &HashSet<&str>) -> TrendGraphResult<()> {
    if edge.is_self_loop() {
        return Err(TrendGraphError::InconsistentGraph(format!(
            "{} edge is a self-loop on '{}'",
            edge.kind, edge.source
        )));
    }
    for endpoint in [&edge.source, &edge.target] {
        if !ids.contains(endpoint.as_str()) {
            return Err(TrendGraphError::InconsistentGraph(format!(
                "{} edge {} -> {} references unknown node '{}'",
                edge.kind, edge.source, edge.target, endpoint
            )));
        }
    }
    if !edge.weight.is_finite() || !(0.0..=1.0).contains(&edge.weight) {
        return Err(TrendGraphError::InconsistentGraph(format!(
            "{} edge {} -> {} has weight {} outside [0, 1]",
            edge.kind, edge.source, edge.target, edge.weight
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RelationKind;

    fn nodes() -> Vec<Node> {
        vec![
            Node::new("a/x", "x"),
            Node::new("b/y", "y"),
            Node::new("c/z", "z"),
        ]
    }

    #[test]
    fn test_structural_edges_come_first() {
        let structural = vec![Edge::new(RelationKind::SharedOwner, "a/x", "b/y")];
        let semantic =
            vec![Edge::new(RelationKind::SemanticSimilarity, "b/y", "c/z").with_weight(0.8)];

        let graph = assemble(nodes(), structural, semantic).unwrap();

        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[0].kind, RelationKind::SharedOwner);
        assert_eq!(graph.edges[1].kind, RelationKind::SemanticSimilarity);
    }

    #[test]
    fn test_dangling_edge_is_rejected() {
        let structural = vec![Edge::new(RelationKind::Dependency, "a/x", "ghost/repo")];
        let err = assemble(nodes(), structural, Vec::new()).unwrap_err();
        assert!(matches!(err, TrendGraphError::InconsistentGraph(_)));
    }

    #[test]
    fn test_dangling_semantic_edge_is_rejected() {
        let semantic = vec![Edge::new(RelationKind::SemanticSimilarity, "ghost/repo", "a/x")];
        assert!(assemble(nodes(), Vec::new(), semantic).is_err());
    }

    #[test]
    fn test_self_loop_is_rejected() {
        let structural = vec![Edge::new(RelationKind::SharedOwner, "a/x", "a/x")];
        assert!(assemble(nodes(), structural, Vec::new()).is_err());
    }

    #[test]
    fn test_duplicate_node_is_rejected() {
        let mut duplicated = nodes();
        duplicated.push(Node::new("a/x", "x"));
        assert!(assemble(duplicated, Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_nan_weight_is_rejected() {
        let mut edge = Edge::new(RelationKind::SharedTopic, "a/x", "b/y");
        edge.weight = f64::NAN;
        assert!(assemble(nodes(), vec![edge], Vec::new()).is_err());
    }

    #[test]
    fn test_empty_graph() {
        let graph = assemble(Vec::new(), Vec::new(), Vec::new()).unwrap();
        assert_eq!(graph, Graph::default());
    }
}
