//! Result cache for assembled graphs.
//!
//! The cache is an injected component: the server builds one at startup and
//! hands an `Arc<dyn GraphCache>` to the [`crate::pipeline::GraphService`].
//! Values are whole `Arc<Graph>`s, so a reader either sees the previous graph
//! or the new one, never a partially built value. Concurrent `set` calls for
//! the same key are last-write-wins.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::model::Graph;

/// Trait for graph result caches.
#[async_trait]
pub trait GraphCache: Send + Sync {
    /// Get a fresh entry. Expired entries behave as absent.
    async fn get(&self, key: &str) -> Option<Arc<Graph>>;

    /// Store a graph, replacing any previous entry for the key.
    async fn set(&self, key: &str, value: Arc<Graph>);

    /// Drop every expired entry. Returns how many were removed.
    async fn purge_expired(&self) -> usize;

    /// Number of stored entries, including expired ones not yet purged.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Build the cache key for a language request.
///
/// The language is trimmed and lower-cased. Graphs computed with the semantic
/// pass are stored under `<language>#semantic` so that a structural-only
/// request never receives semantic edges and vice versa.
pub fn cache_key(language: &str, semantic: bool) -> String {
    let language = language.trim().to_lowercase();
    if semantic {
        format!("{}#semantic", language)
    } else {
        language
    }
}

// ---------------------------------------------------------------------------
// InMemoryGraphCache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CacheEntry {
    graph: Arc<Graph>,
    created_at: Instant,
}

/// Process-local TTL cache.
pub struct InMemoryGraphCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl InMemoryGraphCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.duration_since(entry.created_at) < self.ttl
    }
}

#[async_trait]
impl GraphCache for InMemoryGraphCache {
    async fn get(&self, key: &str) -> Option<Arc<Graph>> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if self.is_fresh(entry, Instant::now()) {
            Some(Arc::clone(&entry.graph))
        } else {
            None
        }
    }

    async fn set(&self, key: &str, value: Arc<Graph>) {
        let entry = CacheEntry {
            graph: value,
            created_at: Instant::now(),
        };
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), entry);
    }

    async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.created_at) < self.ttl);
        before - entries.len()
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

// ---------------------------------------------------------------------------
// NoopGraphCache
// ---------------------------------------------------------------------------

/// Cache that stores nothing. Every lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGraphCache;

#[async_trait]
impl GraphCache for NoopGraphCache {
    async fn get(&self, _key: &str) -> Option<Arc<Graph>> {
        None
    }

    async fn set(&self, _key: &str, _value: Arc<Graph>) {}

    async fn purge_expired(&self) -> usize {
        0
    }

    async fn len(&self) -> usize {
        0
    }
}

/// Spawn a task that purges expired entries every `interval`.
/// Abort the returned handle at shutdown.
pub fn spawn_eviction(cache: Arc<dyn GraphCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.purge_expired().await;
            if removed > 0 {
                debug!(removed, "evicted expired graphs");
            }
        }
    })
}
