use serde::{Deserialize, Serialize};

use crate::model::record::RepositoryRecord;

// ---------------------------------------------------------------------------
// Node: one repository in the relationship graph
// ---------------------------------------------------------------------------

/// A repository node. Serialized flat as `{id, name, owner, language, stars}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Repository identifier, unique within a graph.
    pub id: String,
    /// Display name.
    pub name: String,
    #[serde(flatten)]
    pub metadata: NodeMetadata,
}

/// Descriptive attributes carried alongside a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub owner: String,
    pub language: Option<String>,
    pub stars: u64,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            metadata: NodeMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: NodeMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl From<&RepositoryRecord> for Node {
    fn from(record: &RepositoryRecord) -> Self {
        Node::new(&record.id, &record.name).with_metadata(NodeMetadata {
            owner: record.owner.clone(),
            language: record.language.clone(),
            stars: record.stars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_from_record() {
        let record = RepositoryRecord::new("a", "x")
            .with_language("Rust")
            .with_stars(42);
        let node = Node::from(&record);
        assert_eq!(node.id, "a/x");
        assert_eq!(node.name, "x");
        assert_eq!(node.metadata.language.as_deref(), Some("Rust"));
        assert_eq!(node.metadata.stars, 42);
    }

    #[test]
    fn test_node_serializes_flat() {
        let node = Node::from(&RepositoryRecord::new("a", "x").with_stars(7));
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["id"], "a/x");
        assert_eq!(value["owner"], "a");
        assert_eq!(value["stars"], 7);
        assert!(value.get("metadata").is_none());
    }
}
