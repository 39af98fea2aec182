use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::PipelineDeps;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Collaborator handles the pipeline runs against (LLM, similarity,
    /// extractor, search, cache).
    pub deps: Arc<PipelineDeps>,
    pub config: Config,
}
