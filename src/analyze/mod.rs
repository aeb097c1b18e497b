use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::assemble::assemble;
use crate::error::{TrendGraphError, TrendGraphResult};
use crate::model::{Edge, Graph, Node, RelationKind, RepositoryRecord};

// ---------------------------------------------------------------------------
// Relationship Analyzer: structural edges from explicit record fields
// ---------------------------------------------------------------------------

/// Build the structural relationship graph for a list of repositories.
///
/// One node is produced per record, in input order. Every unordered pair of
/// records is compared once and yields, in this order:
/// - a `shared_owner` edge when the owners match,
/// - a `shared_topic` edge weighted by the Jaccard index of the topic sets,
/// - a `dependency` edge for each direction in which one record names the other
///   among its dependencies.
///
/// The output is a pure function of the input: running it twice on the same
/// records yields the same graph.
pub fn analyze(records: &[RepositoryRecord]) -> TrendGraphResult<Graph> {
    validate_records(records)?;

    let profiles: Vec<Profile<'_>> = records.iter().map(Profile::new).collect();
    let mut edges = EdgeSet::default();

    for i in 0..profiles.len() {
        for j in (i + 1)..profiles.len() {
            let (a, b) = (&profiles[i], &profiles[j]);

            if a.owner == b.owner {
                edges.push(Edge::new(RelationKind::SharedOwner, a.id, b.id));
            }

            let overlap = jaccard(&a.topics, &b.topics);
            if overlap > 0.0 {
                edges.push(Edge::new(RelationKind::SharedTopic, a.id, b.id).with_weight(overlap));
            }

            if a.depends_on(b) {
                edges.push(Edge::new(RelationKind::Dependency, a.id, b.id));
            }
            if b.depends_on(a) {
                edges.push(Edge::new(RelationKind::Dependency, b.id, a.id));
            }
        }
    }

    let nodes: Vec<Node> = records.iter().map(Node::from).collect();
    let edges = edges.into_edges();
    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        "structural analysis complete"
    );

    assemble(nodes, edges, Vec::new())
}

fn validate_records(records: &[RepositoryRecord]) -> TrendGraphResult<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        record.validate().map_err(|err| match err {
            TrendGraphError::InvalidRecord(msg) => {
                TrendGraphError::InvalidRecord(format!("{} (position {})", msg, position))
            }
            other => other,
        })?;
        if !seen.insert(record.id.as_str()) {
            return Err(TrendGraphError::InvalidRecord(format!(
                "duplicate id '{}' (position {})",
                record.id, position
            )));
        }
    }
    Ok(())
}

/// Jaccard index of two sets: |A ∩ B| / |A ∪ B|. Zero when both are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    if intersection == 0 {
        return 0.0;
    }
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Normalized view of a record used for pairwise comparison.
struct Profile<'a> {
    id: &'a str,
    owner: String,
    name: String,
    full_id: String,
    topics: BTreeSet<String>,
    dependencies: HashSet<String>,
}

impl<'a> Profile<'a> {
    fn new(record: &'a RepositoryRecord) -> Self {
        Self {
            id: &record.id,
            owner: normalize(&record.owner),
            name: normalize(&record.name),
            full_id: normalize(&record.id),
            topics: record
                .topics
                .iter()
                .map(|topic| normalize(topic))
                .filter(|topic| !topic.is_empty())
                .collect(),
            dependencies: record
                .dependencies
                .iter()
                .map(|dep| normalize(dep))
                .filter(|dep| !dep.is_empty())
                .collect(),
        }
    }

    /// Exact, case-insensitive match on the other repository's name or full id.
    fn depends_on(&self, other: &Profile<'_>) -> bool {
        self.dependencies.contains(&other.name) || self.dependencies.contains(&other.full_id)
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Ordered edge list that drops repeats of the same (source, target, kind).
#[derive(Default)]
struct EdgeSet {
    seen: HashSet<(String, String, RelationKind)>,
    edges: Vec<Edge>,
}

impl EdgeSet {
    fn push(&mut self, edge: Edge) {
        let (source, target) = if edge.kind.is_directed() || edge.source <= edge.target {
            (edge.source.clone(), edge.target.clone())
        } else {
            (edge.target.clone(), edge.source.clone())
        };
        if self.seen.insert((source, target, edge.kind)) {
            self.edges.push(edge);
        }
    }

    fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_jaccard() {
        assert_eq!(jaccard(&set(&["ml"]), &set(&["ml"])), 1.0);
        assert_eq!(jaccard(&set(&["ml", "cv"]), &set(&["ml", "nlp"])), 1.0 / 3.0);
        assert_eq!(jaccard(&set(&["ml"]), &set(&["web"])), 0.0);
        assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
    }

    #[test]
    fn test_shared_owner_single_edge() {
        let records = vec![
            RepositoryRecord::new("a", "x").with_topics(["cli"]),
            RepositoryRecord::new("a", "y").with_topics(["web"]),
        ];

        let graph = analyze(&records).unwrap();

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        let edge = &graph.edges[0];
        assert_eq!(edge.kind, RelationKind::SharedOwner);
        assert_eq!(edge.weight, 1.0);
        assert_eq!((edge.source.as_str(), edge.target.as_str()), ("a/x", "a/y"));
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let records = vec![
            RepositoryRecord::new("a", "x").with_topics(["ml", "cv"]),
            RepositoryRecord::new("a", "y").with_topics(["ml"]),
            RepositoryRecord::new("b", "z").with_dependencies(["x"]),
        ];

        let first = analyze(&records).unwrap();
        let second = analyze(&records).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_nodes_preserve_input_order() {
        let records = vec![
            RepositoryRecord::new("c", "z"),
            RepositoryRecord::new("a", "x"),
            RepositoryRecord::new("b", "y"),
        ];
        let graph = analyze(&records).unwrap();
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["c/z", "a/x", "b/y"]);
    }

    #[test]
    fn test_shared_topic_weight_is_jaccard() {
        let records = vec![
            RepositoryRecord::new("a", "x").with_topics(["ML", "cv"]),
            RepositoryRecord::new("b", "y").with_topics(["ml", "nlp"]),
        ];
        let graph = analyze(&records).unwrap();
        let topics: Vec<&Edge> = graph.edges_of_kind(RelationKind::SharedTopic).collect();
        assert_eq!(topics.len(), 1);
        assert!((topics[0].weight - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_topics_do_not_inflate_weight() {
        let records = vec![
            RepositoryRecord::new("a", "x").with_topics(["ml", "ml", " "]),
            RepositoryRecord::new("b", "y").with_topics(["ml"]),
        ];
        let graph = analyze(&records).unwrap();
        assert_eq!(graph.edges[0].weight, 1.0);
    }

    #[test]
    fn test_dependency_edge_is_directed() {
        let records = vec![
            RepositoryRecord::new("a", "app").with_dependencies(["Serde", "tokio"]),
            RepositoryRecord::new("b", "serde"),
        ];
        let graph = analyze(&records).unwrap();
        let deps: Vec<&Edge> = graph.edges_of_kind(RelationKind::Dependency).collect();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].source, "a/app");
        assert_eq!(deps[0].target, "b/serde");
    }

    #[test]
    fn test_dependency_requires_exact_name() {
        let records = vec![
            RepositoryRecord::new("a", "app").with_dependencies(["serde_json"]),
            RepositoryRecord::new("b", "serde"),
        ];
        let graph = analyze(&records).unwrap();
        assert_eq!(graph.edges_of_kind(RelationKind::Dependency).count(), 0);
    }

    #[test]
    fn test_dependency_matches_full_id() {
        let records = vec![
            RepositoryRecord::new("a", "app").with_dependencies(["b/lib"]),
            RepositoryRecord::new("b", "lib"),
            RepositoryRecord::new("c", "other"),
        ];
        let graph = analyze(&records).unwrap();
        let deps: Vec<&Edge> = graph.edges_of_kind(RelationKind::Dependency).collect();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].target, "b/lib");
    }

    #[test]
    fn test_mutual_dependencies_yield_two_edges() {
        let records = vec![
            RepositoryRecord::new("a", "x").with_dependencies(["y"]),
            RepositoryRecord::new("b", "y").with_dependencies(["x"]),
        ];
        let graph = analyze(&records).unwrap();
        let deps: Vec<(&str, &str)> = graph
            .edges_of_kind(RelationKind::Dependency)
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(deps, vec![("a/x", "b/y"), ("b/y", "a/x")]);
    }

    #[test]
    fn test_self_dependency_is_ignored() {
        let records = vec![RepositoryRecord::new("a", "x").with_dependencies(["x"])];
        let graph = analyze(&records).unwrap();
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_relations_are_not_merged_across_kinds() {
        let records = vec![
            RepositoryRecord::new("a", "x")
                .with_topics(["ml"])
                .with_dependencies(["y"]),
            RepositoryRecord::new("a", "y").with_topics(["ml"]),
        ];
        let graph = analyze(&records).unwrap();
        let kinds: Vec<RelationKind> = graph.edges.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RelationKind::SharedOwner,
                RelationKind::SharedTopic,
                RelationKind::Dependency
            ]
        );
    }

    #[test]
    fn test_edge_set_drops_repeated_undirected_pair() {
        let mut edges = EdgeSet::default();
        edges.push(Edge::new(RelationKind::SharedOwner, "a/x", "b/y"));
        edges.push(Edge::new(RelationKind::SharedOwner, "b/y", "a/x"));
        edges.push(Edge::new(RelationKind::Dependency, "a/x", "b/y"));
        edges.push(Edge::new(RelationKind::Dependency, "b/y", "a/x"));
        assert_eq!(edges.into_edges().len(), 3);
    }

    #[test]
    fn test_every_edge_endpoint_is_a_node() {
        let records = vec![
            RepositoryRecord::new("a", "x").with_topics(["ml"]).with_dependencies(["z"]),
            RepositoryRecord::new("a", "y").with_topics(["ml", "web"]),
            RepositoryRecord::new("b", "z").with_topics(["web"]),
        ];
        let graph = analyze(&records).unwrap();
        assert!(!graph.edges.is_empty());
        for edge in &graph.edges {
            assert!(graph.contains_node(&edge.source));
            assert!(graph.contains_node(&edge.target));
        }
    }

    #[test]
    fn test_blank_owner_is_invalid() {
        let mut record = RepositoryRecord::new("a", "x");
        record.owner.clear();
        let err = analyze(&[record]).unwrap_err();
        assert!(matches!(err, TrendGraphError::InvalidRecord(_)));
    }

    #[test]
    fn test_duplicate_ids_are_invalid() {
        let records = vec![RepositoryRecord::new("a", "x"), RepositoryRecord::new("a", "x")];
        let err = analyze(&records).unwrap_err();
        assert!(err.to_string().contains("duplicate id"));
    }

    #[test]
    fn test_empty_input_yields_empty_graph() {
        let graph = analyze(&[]).unwrap();
        assert_eq!(graph, Graph::default());
    }
}
