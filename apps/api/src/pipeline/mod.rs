//! Analysis pipeline core: shared state, the stage contract, the enhancement
//! fan-out coordinator, and the orchestrator that drives a request from
//! `init` to `done` (or `failed`).

pub mod fanout;
pub mod handlers;
pub mod orchestrator;
pub mod stage;
pub mod state;

#[cfg(test)]
pub mod testutil;

use std::sync::Arc;
use std::time::Duration;

use crate::cache::AnalysisCache;
use crate::extract::TextExtractor;
use crate::llm::Reasoner;
use crate::scraper::CompanySearch;
use crate::similarity::SimilarityScorer;

/// Collaborator handles every stage runs against. Trait objects throughout,
/// so tests swap in deterministic stubs without touching stage code.
pub struct PipelineDeps {
    pub llm: Arc<dyn Reasoner>,
    pub similarity: Arc<dyn SimilarityScorer>,
    pub extractor: Arc<dyn TextExtractor>,
    pub search: Arc<dyn CompanySearch>,
    pub cache: Arc<AnalysisCache>,
    /// Deadline for each enhancement stage; exceeding it degrades to defaults.
    pub enhancer_timeout: Duration,
}
