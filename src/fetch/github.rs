use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::FetchConfig;
use crate::error::{TrendGraphError, TrendGraphResult};
use crate::fetch::RepositorySource;
use crate::model::RepositoryRecord;

// ---------------------------------------------------------------------------
// GitHub search API wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    full_name: String,
    name: String,
    owner: SearchOwner,
    language: Option<String>,
    description: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    stargazers_count: u64,
}

#[derive(Debug, Deserialize)]
struct SearchOwner {
    login: String,
}

impl From<SearchItem> for RepositoryRecord {
    fn from(item: SearchItem) -> Self {
        RepositoryRecord {
            id: item.full_name,
            name: item.name,
            owner: item.owner.login,
            language: item.language,
            description: item.description,
            topics: item.topics,
            stars: item.stargazers_count,
            // Search results carry no manifest data.
            dependencies: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// GitHubSource
// ---------------------------------------------------------------------------

/// Approximates "trending" with the search API: repositories in `language`
/// created within the last `window_days`, most-starred first.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    http: reqwest::Client,
    api_base: String,
    per_page: u32,
    window_days: u32,
}

impl GitHubSource {
    pub fn from_config(config: &FetchConfig) -> TrendGraphResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs));

        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| TrendGraphError::ConfigError(format!("invalid fetch.token: {}", e)))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        builder = builder.default_headers(headers);
        let http = builder
            .build()
            .map_err(|e| TrendGraphError::ConfigError(format!("fetch client: {}", e)))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            per_page: config.per_page,
            window_days: config.window_days,
        })
    }

    /// Search qualifier for repositories created on or after `since`.
    /// Multi-word languages are quoted so GitHub reads them as one qualifier.
    fn search_query(language: &str, since: NaiveDate) -> String {
        let language = if language.contains(char::is_whitespace) {
            format!("\"{}\"", language)
        } else {
            language.to_string()
        };
        format!("language:{} created:>={}", language, since.format("%Y-%m-%d"))
    }
}

#[async_trait]
impl RepositorySource for GitHubSource {
    #[instrument(skip(self))]
    async fn fetch(&self, language: &str) -> TrendGraphResult<Vec<RepositoryRecord>> {
        let since = (Utc::now() - ChronoDuration::days(i64::from(self.window_days))).date_naive();
        let query = Self::search_query(language, since);
        let url = format!("{}/search/repositories", self.api_base);
        let per_page = self.per_page.to_string();

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TrendGraphError::Fetch(format!("GitHub request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TrendGraphError::Fetch(format!(
                "GitHub API error ({}): {}",
                status.as_u16(),
                message
            )));
        }

        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| TrendGraphError::Fetch(format!("malformed GitHub response: {}", e)))?;

        debug!(count = body.items.len(), "fetched trending repositories");
        Ok(body.items.into_iter().map(RepositoryRecord::from).collect())
    }
}
