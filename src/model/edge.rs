use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Edge: a detected relationship between two repositories
// ---------------------------------------------------------------------------

/// An edge between two nodes. Undirected unless `kind` is
/// [`RelationKind::Dependency`], where `source` depends on `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: RelationKind,
    /// Strength of the relation in [0.0, 1.0].
    pub weight: f64,
}

impl Edge {
    /// Create a new edge with full weight.
    pub fn new(kind: RelationKind, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            weight: 1.0,
        }
    }

    /// Set the weight for this edge, clamped to [0.0, 1.0].
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight.clamp(0.0, 1.0);
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Whether this edge connects `a` and `b`, honoring direction for dependencies.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        if self.kind.is_directed() {
            self.source == a && self.target == b
        } else {
            (self.source == a && self.target == b) || (self.source == b && self.target == a)
        }
    }
}

// ---------------------------------------------------------------------------
// RelationKind: categories of relationships
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Both repositories belong to the same owner.
    SharedOwner,
    /// The repositories' topic sets overlap. Weighted by Jaccard index.
    SharedTopic,
    /// The source repository mentions the target as a dependency.
    Dependency,
    /// The repositories' descriptions are textually similar.
    SemanticSimilarity,
}

impl RelationKind {
    pub fn is_directed(&self) -> bool {
        matches!(self, RelationKind::Dependency)
    }

    /// True for kinds derived from explicit record fields.
    pub fn is_structural(&self) -> bool {
        !matches!(self, RelationKind::SemanticSimilarity)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::SharedOwner => "shared_owner",
            RelationKind::SharedTopic => "shared_topic",
            RelationKind::Dependency => "dependency",
            RelationKind::SemanticSimilarity => "semantic_similarity",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
