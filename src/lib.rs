pub mod analyze;
pub mod assemble;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod pipeline;
pub mod server;
pub mod similarity;

pub use analyze::analyze;
pub use assemble::assemble;
pub use cache::{cache_key, GraphCache, InMemoryGraphCache, NoopGraphCache};
pub use crate::config::{load_config, AppConfig};
pub use error::{TrendGraphError, TrendGraphResult};
pub use model::*;
pub use pipeline::{GraphService, PipelineOptions};
pub use similarity::SimilarityEngine;
