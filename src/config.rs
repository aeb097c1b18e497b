use crate::error::{TrendGraphError, TrendGraphResult};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Lifetime of a cached graph.
    pub ttl_secs: u64,
    /// How often the background task sweeps expired entries.
    pub eviction_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 900,
            eviction_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Base URL of the GitHub REST API.
    pub api_base: String,
    pub token: Option<String>,
    pub per_page: u32,
    /// Only repositories created within this many days are considered trending.
    pub window_days: u32,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token: None,
            per_page: 25,
            window_days: 7,
            timeout_secs: 10,
            user_agent: concat!("trendgraph/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// `bag_of_words` or `openai`.
    pub provider: String,
    /// Inclusive score threshold for a semantic edge.
    pub threshold: f64,
    pub max_vocabulary: usize,
    pub timeout_secs: u64,
    /// Return the structural graph (uncached) when the semantic pass fails.
    pub degrade_on_error: bool,
    pub endpoint: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            provider: "bag_of_words".to_string(),
            threshold: crate::similarity::DEFAULT_THRESHOLD,
            max_vocabulary: 512,
            timeout_secs: 30,
            degrade_on_error: false,
            endpoint: None,
            model: "text-embedding-3-small".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` overrides it.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Load configuration from `trendgraph.toml`, an optional explicit file, and
/// `TRENDGRAPH__*` environment variables, in increasing precedence.
pub fn load_config(path: Option<&Path>) -> TrendGraphResult<AppConfig> {
    let mut builder = Config::builder().add_source(File::with_name("trendgraph").required(false));

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("TRENDGRAPH").separator("__"));

    let config = builder
        .build()
        .map_err(|err| TrendGraphError::ConfigError(err.to_string()))?;

    let parsed: AppConfig = config
        .try_deserialize()
        .map_err(|err| TrendGraphError::ConfigError(err.to_string()))?;

    validate(&parsed)?;
    Ok(parsed)
}

/// Reject values that would make the pipeline misbehave.
pub fn validate(config: &AppConfig) -> TrendGraphResult<()> {
    let threshold = config.similarity.threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(TrendGraphError::ConfigError(format!(
            "similarity.threshold must be within [0, 1], got {}",
            threshold
        )));
    }

    let provider = config.similarity.provider.to_lowercase();
    if provider != "bag_of_words" && provider != "openai" {
        return Err(TrendGraphError::ConfigError(format!(
            "unsupported similarity.provider '{}'; expected 'bag_of_words' or 'openai'",
            config.similarity.provider
        )));
    }

    if config.cache.ttl_secs == 0 {
        return Err(TrendGraphError::ConfigError(
            "cache.ttl_secs must be greater than zero".to_string(),
        ));
    }

    if config.cache.eviction_interval_secs == 0 {
        return Err(TrendGraphError::ConfigError(
            "cache.eviction_interval_secs must be greater than zero".to_string(),
        ));
    }

    if !(1..=100).contains(&config.fetch.per_page) {
        return Err(TrendGraphError::ConfigError(format!(
            "fetch.per_page must be within 1..=100, got {}",
            config.fetch.per_page
        )));
    }

    if config.fetch.timeout_secs == 0 || config.similarity.timeout_secs == 0 {
        return Err(TrendGraphError::ConfigError(
            "timeouts must be greater than zero".to_string(),
        ));
    }

    Ok(())
}
