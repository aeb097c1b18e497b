//! OpenAI-compatible embedding provider.
//!
//! Works with OpenAI's API and any endpoint that speaks the same
//! `POST /embeddings` protocol (Ollama, vLLM, LM Studio).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{TrendGraphError, TrendGraphResult};
use crate::similarity::embedder::TextEmbedder;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

/// Remote embedder calling an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiEmbedder {
    /// Create a new provider.
    ///
    /// * `model` - Model name (e.g., "text-embedding-3-small")
    /// * `endpoint` - API base URL, defaults to "https://api.openai.com/v1"
    /// * `api_key` - Bearer token; omitted for local servers that don't need one
    pub fn new(
        model: impl Into<String>,
        endpoint: Option<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> TrendGraphResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrendGraphError::ConfigError(format!("embedding client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            model: model.into(),
        })
    }
}

#[async_trait]
impl TextEmbedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> TrendGraphResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.endpoint);
        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().await.map_err(|e| {
            TrendGraphError::SimilarityComputation(format!("embedding request failed: {}", e))
        })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TrendGraphError::SimilarityComputation(format!(
                "embedding API error ({}): {}",
                status.as_u16(),
                message
            )));
        }

        let mut parsed: EmbeddingResponse = resp.json().await.map_err(|e| {
            TrendGraphError::SimilarityComputation(format!("malformed embedding response: {}", e))
        })?;

        if parsed.data.len() != texts.len() {
            return Err(TrendGraphError::SimilarityComputation(format!(
                "embedding API returned {} vectors for {} inputs",
                parsed.data.len(),
                texts.len()
            )));
        }

        // Servers that omit `index` answer in input order.
        if parsed.data.iter().all(|d| d.index.is_none()) {
            return Ok(parsed.data.into_iter().map(|d| d.embedding).collect());
        }

        parsed.data.sort_by_key(|d| d.index);
        if parsed
            .data
            .iter()
            .enumerate()
            .any(|(i, d)| d.index != Some(i))
        {
            return Err(TrendGraphError::SimilarityComputation(
                "embedding API returned duplicate, missing or out-of-range indices".to_string(),
            ));
        }
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder(server: &MockServer) -> OpenAiEmbedder {
        OpenAiEmbedder::new(
            "text-embedding-3-small",
            Some(format!("{}/v1/", server.uri())),
            Some("sk-test".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_vectors_are_reordered_by_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"index": 1, "embedding": [0.0, 1.0]},
                    {"index": 0, "embedding": [1.0, 0.0]}
                ]
            })))
            .mount(&server)
            .await;

        let vectors = embedder(&server)
            .embed_batch(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_api_error_is_similarity_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = embedder(&server)
            .embed_batch(&["text".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, TrendGraphError::SimilarityComputation(_)));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_vector_count_mismatch_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"index": 0, "embedding": [1.0]}]
            })))
            .mount(&server)
            .await;

        let result = embedder(&server)
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_indices_are_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"index": 0, "embedding": [1.0, 0.0]},
                    {"index": 0, "embedding": [0.0, 1.0]}
                ]
            })))
            .mount(&server)
            .await;

        let err = embedder(&server)
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, TrendGraphError::SimilarityComputation(_)));
        assert!(err.to_string().contains("indices"));
    }

    #[tokio::test]
    async fn test_missing_indices_keep_response_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [1.0, 0.0]}, {"embedding": [0.0, 1.0]}]
            })))
            .mount(&server)
            .await;

        let vectors = embedder(&server)
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        let server = MockServer::start().await;
        let vectors = embedder(&server).embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
