//! Semantic similarity pass.
//!
//! Embeds repository descriptions and links every pair whose cosine
//! similarity reaches the configured threshold. The pass only produces new
//! `semantic_similarity` edges; structural edges are never touched.

pub mod embedder;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::config::SimilarityConfig;
use crate::error::{TrendGraphError, TrendGraphResult};
use crate::model::embedding::cosine_similarity;
use crate::model::{Edge, RelationKind, RepositoryRecord};

pub use embedder::{BagOfWordsEmbedder, TextEmbedder};
pub use openai::OpenAiEmbedder;

/// Default inclusive threshold for emitting a semantic edge.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Computes `semantic_similarity` edges between repository descriptions.
#[derive(Clone)]
pub struct SimilarityEngine {
    embedder: Arc<dyn TextEmbedder>,
    threshold: f64,
}

impl SimilarityEngine {
    pub fn new(embedder: Arc<dyn TextEmbedder>, threshold: f64) -> Self {
        Self {
            embedder,
            threshold,
        }
    }

    /// Build the engine described by the `similarity` config section.
    pub fn from_config(config: &SimilarityConfig) -> TrendGraphResult<Self> {
        let embedder: Arc<dyn TextEmbedder> = match config.provider.to_lowercase().as_str() {
            "bag_of_words" => Arc::new(BagOfWordsEmbedder::new(config.max_vocabulary)),
            "openai" => Arc::new(OpenAiEmbedder::new(
                config.model.clone(),
                config.endpoint.clone(),
                config.api_key.clone(),
                Duration::from_secs(config.timeout_secs),
            )?),
            other => {
                return Err(TrendGraphError::ConfigError(format!(
                    "unknown similarity.provider '{}'; expected 'bag_of_words' or 'openai'",
                    other
                )))
            }
        };
        Ok(Self::new(embedder, config.threshold))
    }

    /// Compute semantic edges for every pair of records with a description.
    ///
    /// Records without description text are skipped entirely. For each
    /// remaining pair the earlier record (in input order) is the edge source.
    #[instrument(skip_all, fields(records = records.len(), model = self.embedder.model_name()))]
    pub async fn compute(&self, records: &[RepositoryRecord]) -> TrendGraphResult<Vec<Edge>> {
        let described: Vec<(&str, String)> = records
            .iter()
            .filter_map(|r| r.description_text().map(|d| (r.id.as_str(), d.to_string())))
            .collect();

        if described.len() < 2 {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = described.iter().map(|(_, text)| text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(TrendGraphError::SimilarityComputation(format!(
                "embedder returned {} vectors for {} descriptions",
                vectors.len(),
                texts.len()
            )));
        }

        let mut edges = Vec::new();
        for i in 0..described.len() {
            for j in (i + 1)..described.len() {
                let score = pair_score(&vectors[i], &vectors[j])?;
                if passes_threshold(score, self.threshold) {
                    edges.push(
                        Edge::new(RelationKind::SemanticSimilarity, described[i].0, described[j].0)
                            .with_weight(score),
                    );
                }
            }
        }

        debug!(
            described = described.len(),
            edges = edges.len(),
            "semantic pass complete"
        );
        Ok(edges)
    }
}

/// Scores exactly at the threshold are included.
pub fn passes_threshold(score: f64, threshold: f64) -> bool {
    score >= threshold
}

fn pair_score(a: &[f32], b: &[f32]) -> TrendGraphResult<f64> {
    let score = cosine_similarity(a, b).ok_or_else(|| {
        TrendGraphError::SimilarityComputation(format!(
            "embedding dimension mismatch: {} vs {}",
            a.len(),
            b.len()
        ))
    })?;
    if !score.is_finite() {
        return Err(TrendGraphError::SimilarityComputation(
            "non-finite similarity score".to_string(),
        ));
    }
    Ok(score.clamp(0.0, 1.0))
}
