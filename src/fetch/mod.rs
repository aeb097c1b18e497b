//! Repository sources: where trending repository records come from.

pub mod github;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::{TrendGraphError, TrendGraphResult};
use crate::model::RepositoryRecord;

pub use github::GitHubSource;

/// Trait for collaborators that list trending repositories for a language.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Fetch the current trending repositories for `language`.
    /// Network and decode failures are reported as [`TrendGraphError::Fetch`].
    async fn fetch(&self, language: &str) -> TrendGraphResult<Vec<RepositoryRecord>>;
}

// ---------------------------------------------------------------------------
// JsonFileSource: records from a local JSON array
// ---------------------------------------------------------------------------

/// Reads a JSON array of records from disk. The language argument filters on
/// each record's `language` field (case-insensitive); records without a
/// language are always kept.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RepositorySource for JsonFileSource {
    async fn fetch(&self, language: &str) -> TrendGraphResult<Vec<RepositoryRecord>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            TrendGraphError::Fetch(format!("cannot read {}: {}", self.path.display(), e))
        })?;

        let records: Vec<RepositoryRecord> = serde_json::from_slice(&bytes).map_err(|e| {
            TrendGraphError::Fetch(format!("malformed records in {}: {}", self.path.display(), e))
        })?;

        let wanted = language.trim().to_lowercase();
        Ok(records
            .into_iter()
            .filter(|record| match &record.language {
                Some(lang) => lang.to_lowercase() == wanted,
                None => true,
            })
            .collect())
    }
}
