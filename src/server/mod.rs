use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::cache::{spawn_eviction, GraphCache, InMemoryGraphCache, NoopGraphCache};
use crate::config::AppConfig;
use crate::error::{TrendGraphError, TrendGraphResult};
use crate::fetch::{GitHubSource, RepositorySource};
use crate::pipeline::{GraphService, PipelineOptions};
use crate::similarity::SimilarityEngine;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GraphService>,
}

/// Query string of the analyze routes. The flag is kept raw so that an
/// unparseable value is reported through the regular error body.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeParams {
    #[serde(default)]
    pub use_semantic_similarity: Option<String>,
}

impl AnalyzeParams {
    pub fn semantic_flag(&self) -> TrendGraphResult<bool> {
        match self.use_semantic_similarity.as_deref() {
            None => Ok(false),
            Some(raw) => parse_flag(raw).ok_or_else(|| {
                TrendGraphError::InvalidRequest(format!(
                    "use_semantic_similarity must be a boolean, got '{}'",
                    raw
                ))
            }),
        }
    }
}

/// Boolean query values in the forms common web frameworks accept
/// (`true`/`1`/`yes`/`on`/`t`/`y` and their negatives, any case).
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
    pub kind: String,
}

/// Every pipeline failure is reported as a 500; `kind` tells them apart.
impl IntoResponse for TrendGraphError {
    fn into_response(self) -> Response {
        error!(kind = self.kind(), error = %self, "request failed");
        let body = ErrorBody {
            detail: self.to_string(),
            kind: self.kind().to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze/:language", get(analyze_language))
        .route("/analyze/github/trending/:language", get(analyze_language))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Wire the production collaborators described by `config`.
pub fn build_service(config: &AppConfig, cache: Arc<dyn GraphCache>) -> TrendGraphResult<GraphService> {
    let source: Arc<dyn RepositorySource> = Arc::new(GitHubSource::from_config(&config.fetch)?);
    let similarity = SimilarityEngine::from_config(&config.similarity)?;
    Ok(GraphService::new(
        source,
        cache,
        similarity,
        PipelineOptions::from_config(config),
    ))
}

pub async fn run_http_server(config: AppConfig) -> TrendGraphResult<()> {
    let cache: Arc<dyn GraphCache> = if config.cache.enabled {
        Arc::new(InMemoryGraphCache::new(Duration::from_secs(config.cache.ttl_secs)))
    } else {
        Arc::new(NoopGraphCache)
    };
    let eviction = spawn_eviction(
        Arc::clone(&cache),
        Duration::from_secs(config.cache.eviction_interval_secs),
    );

    let state = AppState {
        service: Arc::new(build_service(&config, cache)?),
    };
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|err| TrendGraphError::ConfigError(format!("invalid server address: {err}")))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| TrendGraphError::Internal(format!("failed to bind server: {err}")))?;

    info!(%addr, "listening");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| TrendGraphError::Internal(format!("server error: {err}")));

    eviction.abort();
    info!("server stopped");
    result
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn analyze_language(
    State(state): State<AppState>,
    Path(language): Path<String>,
    params: Result<Query<AnalyzeParams>, QueryRejection>,
) -> Result<Response, TrendGraphError> {
    let Query(params) =
        params.map_err(|rejection| TrendGraphError::InvalidRequest(rejection.body_text()))?;
    let use_semantic = params.semantic_flag()?;
    let graph = state.service.graph_for(&language, use_semantic).await?;

    let body = graph.to_json_bytes()?;
    let etag = format!("\"{:x}\"", Sha256::digest(&body));

    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    if let Ok(value) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, value);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_accepts_common_forms() {
        for raw in ["true", "True", "1", "yes", "ON", "t", "Y"] {
            assert_eq!(parse_flag(raw), Some(true), "{raw}");
        }
        for raw in ["false", "FALSE", "0", "no", "off", "f", "n"] {
            assert_eq!(parse_flag(raw), Some(false), "{raw}");
        }
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_missing_flag_defaults_to_false() {
        assert!(!AnalyzeParams::default().semantic_flag().unwrap());
    }

    #[test]
    fn test_bad_flag_is_invalid_request() {
        let params = AnalyzeParams {
            use_semantic_similarity: Some("maybe".to_string()),
        };
        let err = params.semantic_flag().unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
    }
}
