mod agents;
mod cache;
mod config;
mod errors;
mod extract;
mod llm;
mod pipeline;
mod routes;
mod scraper;
mod similarity;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::AnalysisCache;
use crate::config::Config;
use crate::extract::DocumentExtractor;
use crate::llm::LlmClient;
use crate::pipeline::PipelineDeps;
use crate::routes::build_router;
use crate::scraper::WebScraper;
use crate::similarity::HttpSimilarityClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resumatch API v{}", env!("CARGO_PKG_VERSION"));

    // Collaborators behind the pipeline's trait seams
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm.model());

    let similarity = HttpSimilarityClient::new(
        config.similarity_api_url.clone(),
        config.similarity_api_key.clone(),
    );
    info!("Similarity client initialized ({})", config.similarity_api_url);

    let cache = AnalysisCache::connect(config.redis_url.as_deref());

    let deps = Arc::new(PipelineDeps {
        llm: Arc::new(llm),
        similarity: Arc::new(similarity),
        extractor: Arc::new(DocumentExtractor::new(config.docx_converter_url.clone())),
        search: Arc::new(WebScraper::new()),
        cache: Arc::new(cache),
        enhancer_timeout: Duration::from_secs(config.enhancer_timeout_secs),
    });

    let state = AppState {
        deps,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
