use serde::{Deserialize, Serialize};

use crate::error::{TrendGraphError, TrendGraphResult};

// ---------------------------------------------------------------------------
// RepositoryRecord: normalized shape of one fetched repository
// ---------------------------------------------------------------------------

/// One trending repository as delivered by a repository source.
/// Records are treated as immutable for the lifetime of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    /// Unique repository identifier, conventionally `owner/name`.
    pub id: String,
    /// Repository name without the owner prefix.
    #[serde(default)]
    pub name: String,
    /// Owning user or organization.
    pub owner: String,
    /// Primary language reported by the source.
    #[serde(default)]
    pub language: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Topic tags.
    #[serde(default)]
    pub topics: Vec<String>,
    /// Star count at fetch time.
    #[serde(default)]
    pub stars: u64,
    /// Names of repositories this one declares a dependency on, in source order.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl RepositoryRecord {
    /// Create a record with id `owner/name` and no optional attributes.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        Self {
            id: format!("{}/{}", owner, name),
            name,
            owner,
            language: None,
            description: None,
            topics: Vec::new(),
            stars: 0,
            dependencies: Vec::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stars(mut self, stars: u64) -> Self {
        self.stars = stars;
        self
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Check that the required identity fields are present.
    pub fn validate(&self) -> TrendGraphResult<()> {
        if self.id.trim().is_empty() {
            return Err(TrendGraphError::InvalidRecord(
                "record has a blank id".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(TrendGraphError::InvalidRecord(format!(
                "record '{}' has a blank name",
                self.id
            )));
        }
        if self.owner.trim().is_empty() {
            return Err(TrendGraphError::InvalidRecord(format!(
                "record '{}' has a blank owner",
                self.id
            )));
        }
        Ok(())
    }

    /// Description text if present and not blank.
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
