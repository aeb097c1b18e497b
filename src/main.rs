use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use trendgraph::cache::NoopGraphCache;
use trendgraph::config::{load_config, AppConfig, LoggingConfig};
use trendgraph::fetch::{GitHubSource, JsonFileSource, RepositorySource};
use trendgraph::pipeline::{GraphService, PipelineOptions};
use trendgraph::server::run_http_server;
use trendgraph::similarity::SimilarityEngine;

/// Trendgraph: relationship graphs over trending repositories
#[derive(Parser)]
#[command(name = "trendgraph")]
#[command(
    about = "Builds relationship graphs (shared owners, shared topics, dependencies, similar descriptions) over trending repositories."
)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "TRENDGRAPH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override server.host
        #[arg(long)]
        host: Option<String>,
        /// Override server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Build a graph once and print it as JSON
    Analyze {
        /// Language to analyze
        #[arg(short, long)]
        language: String,
        /// Read records from a JSON file instead of GitHub
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Include semantic similarity edges
        #[arg(long)]
        semantic: bool,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run_http_server(config).await?;
        }
        Commands::Analyze {
            language,
            input,
            semantic,
            pretty,
        } => {
            run_analyze(&config, &language, input, semantic, pretty).await?;
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run_analyze(
    config: &AppConfig,
    language: &str,
    input: Option<PathBuf>,
    semantic: bool,
    pretty: bool,
) -> anyhow::Result<()> {
    let source: Arc<dyn RepositorySource> = match input {
        Some(path) => Arc::new(JsonFileSource::new(path)),
        None => Arc::new(GitHubSource::from_config(&config.fetch)?),
    };
    let service = GraphService::new(
        source,
        Arc::new(NoopGraphCache),
        SimilarityEngine::from_config(&config.similarity)?,
        PipelineOptions::from_config(config),
    );

    let graph = service.graph_for(language, semantic).await?;
    let json = if pretty {
        serde_json::to_string_pretty(graph.as_ref())?
    } else {
        serde_json::to_string(graph.as_ref())?
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    Ok(())
}
