use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::analyze::analyze;
use crate::assemble::assemble;
use crate::cache::{cache_key, GraphCache};
use crate::config::AppConfig;
use crate::error::{TrendGraphError, TrendGraphResult};
use crate::fetch::RepositorySource;
use crate::model::{Edge, Graph, RepositoryRecord};
use crate::similarity::SimilarityEngine;

// ---------------------------------------------------------------------------
// Graph Service: cache lookup → fetch → analyze → [semantic] → cache store
// ---------------------------------------------------------------------------

/// Options controlling the pipeline's failure handling.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Upper bound on the fetch collaborator.
    pub fetch_timeout: Duration,
    /// Upper bound on the semantic pass.
    pub similarity_timeout: Duration,
    /// Return the structural graph when the semantic pass fails.
    pub degrade_on_similarity_error: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            similarity_timeout: Duration::from_secs(30),
            degrade_on_similarity_error: false,
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            fetch_timeout: Duration::from_secs(config.fetch.timeout_secs),
            similarity_timeout: Duration::from_secs(config.similarity.timeout_secs),
            degrade_on_similarity_error: config.similarity.degrade_on_error,
        }
    }
}

/// Produces relationship graphs for languages, memoizing results in a cache.
///
/// Every collaborator is injected so tests can substitute doubles. The
/// pipeline within one call is strictly sequential; separate calls share
/// nothing but the cache.
#[derive(Clone)]
pub struct GraphService {
    source: Arc<dyn RepositorySource>,
    cache: Arc<dyn GraphCache>,
    similarity: SimilarityEngine,
    options: PipelineOptions,
}

impl GraphService {
    pub fn new(
        source: Arc<dyn RepositorySource>,
        cache: Arc<dyn GraphCache>,
        similarity: SimilarityEngine,
        options: PipelineOptions,
    ) -> Self {
        Self {
            source,
            cache,
            similarity,
            options,
        }
    }

    /// Return the relationship graph for `language`.
    ///
    /// A fresh cached graph is returned as-is without touching the source.
    /// Otherwise the graph is rebuilt and stored, unless the semantic pass
    /// failed and was degraded to the structural-only graph. Failures are
    /// never cached.
    #[instrument(skip(self))]
    pub async fn graph_for(
        &self,
        language: &str,
        use_semantic_similarity: bool,
    ) -> TrendGraphResult<Arc<Graph>> {
        let language = language.trim().to_lowercase();
        if language.is_empty() {
            return Err(TrendGraphError::InvalidRequest(
                "language must not be empty".to_string(),
            ));
        }

        let key = cache_key(&language, use_semantic_similarity);
        if let Some(cached) = self.cache.get(&key).await {
            info!(%key, "cache hit");
            return Ok(cached);
        }

        let records = tokio::time::timeout(self.options.fetch_timeout, self.source.fetch(&language))
            .await
            .map_err(|_| {
                TrendGraphError::Fetch(format!(
                    "fetch timed out after {:?}",
                    self.options.fetch_timeout
                ))
            })??;

        let structural = analyze(&records)?;

        if !use_semantic_similarity {
            return Ok(self.store(key, structural).await);
        }

        match self.semantic_edges(&records).await {
            Ok(semantic) => {
                let Graph { nodes, edges } = structural;
                let graph = assemble(nodes, edges, semantic)?;
                Ok(self.store(key, graph).await)
            }
            Err(err) if self.options.degrade_on_similarity_error => {
                warn!(error = %err, "semantic pass failed; returning structural graph");
                Ok(Arc::new(structural))
            }
            Err(err) => Err(err),
        }
    }

    async fn semantic_edges(
        &self,
        records: &[RepositoryRecord],
    ) -> TrendGraphResult<Vec<Edge>> {
        tokio::time::timeout(self.options.similarity_timeout, self.similarity.compute(records))
            .await
            .map_err(|_| {
                TrendGraphError::SimilarityComputation(format!(
                    "semantic pass timed out after {:?}",
                    self.options.similarity_timeout
                ))
            })?
    }

    async fn store(&self, key: String, graph: Graph) -> Arc<Graph> {
        let graph = Arc::new(graph);
        info!(
            %key,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph built"
        );
        self.cache.set(&key, Arc::clone(&graph)).await;
        graph
    }
}
