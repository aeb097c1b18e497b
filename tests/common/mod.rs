//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use trendgraph::cache::{GraphCache, InMemoryGraphCache};
use trendgraph::error::{TrendGraphError, TrendGraphResult};
use trendgraph::fetch::RepositorySource;
use trendgraph::pipeline::{GraphService, PipelineOptions};
use trendgraph::similarity::{SimilarityEngine, TextEmbedder};
use trendgraph::RepositoryRecord;

/// Source returning a fixed record list and counting its calls.
pub struct CountingSource {
    records: Vec<RepositoryRecord>,
    calls: AtomicUsize,
    fail: bool,
}

impl CountingSource {
    pub fn new(records: Vec<RepositoryRecord>) -> Self {
        Self {
            records,
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            records: Vec::new(),
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepositorySource for CountingSource {
    async fn fetch(&self, _language: &str) -> TrendGraphResult<Vec<RepositoryRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TrendGraphError::Fetch("upstream unavailable".to_string()));
        }
        Ok(self.records.clone())
    }
}

/// Source that never answers.
pub struct HangingSource;

#[async_trait]
impl RepositorySource for HangingSource {
    async fn fetch(&self, _language: &str) -> TrendGraphResult<Vec<RepositoryRecord>> {
        std::future::pending::<()>().await;
        Ok(Vec::new())
    }
}

/// Embedder returning fixed vectors keyed by description text.
pub struct FixedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl FixedEmbedder {
    pub fn new(entries: &[(&str, Vec<f32>)]) -> Self {
        Self {
            vectors: entries
                .iter()
                .map(|(text, v)| (text.to_string(), v.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl TextEmbedder for FixedEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> TrendGraphResult<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|text| {
                self.vectors.get(text).cloned().ok_or_else(|| {
                    TrendGraphError::SimilarityComputation(format!("no vector for '{}'", text))
                })
            })
            .collect()
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

/// Embedder that never answers.
pub struct HangingEmbedder;

#[async_trait]
impl TextEmbedder for HangingEmbedder {
    async fn embed_batch(&self, _texts: &[String]) -> TrendGraphResult<Vec<Vec<f32>>> {
        std::future::pending::<()>().await;
        Ok(Vec::new())
    }

    fn model_name(&self) -> &str {
        "hanging"
    }
}

/// Two unit vectors whose cosine similarity is 0.95.
pub fn near_duplicate_embedder() -> FixedEmbedder {
    let sine = (1.0f32 - 0.95 * 0.95).sqrt();
    FixedEmbedder::new(&[
        ("A fast web framework", vec![1.0, 0.0]),
        ("A fast web framework!", vec![0.95, sine]),
    ])
}

pub fn service(
    source: Arc<dyn RepositorySource>,
    embedder: Arc<dyn TextEmbedder>,
    options: PipelineOptions,
) -> (GraphService, Arc<dyn GraphCache>) {
    let cache: Arc<dyn GraphCache> = Arc::new(InMemoryGraphCache::new(Duration::from_secs(300)));
    let engine = SimilarityEngine::new(embedder, 0.7);
    (
        GraphService::new(source, Arc::clone(&cache), engine, options),
        cache,
    )
}
