//! Stage contract and failure-isolation convention.
//!
//! A stage reads only fields earlier phases are guaranteed to have written,
//! and produces a delta covering only its own output fields. Failures are
//! classified, not thrown:
//! - `Recoverable` — the stage (or the coordinator on its behalf) substitutes
//!   hand-authored defaults and the pipeline continues
//! - `Fatal` — the pipeline cannot produce a useful result (missing mandatory
//!   input, matching engine down); the orchestrator records the error and halts
//!
//! Every invocation contributes exactly one log line, prefixed by outcome.

use async_trait::async_trait;
use thiserror::Error;

use crate::pipeline::state::{AnalysisState, CompanyIntel, InterviewQuestion, TailoredSuggestion};
use crate::pipeline::PipelineDeps;

pub const OK_PREFIX: &str = "✅";
pub const DEGRADED_PREFIX: &str = "⚠️";
pub const FATAL_PREFIX: &str = "❌";

#[derive(Debug, Error)]
pub enum StageError {
    /// The stage could not do its job but the pipeline can continue with defaults.
    #[error("{0}")]
    Recoverable(String),

    /// The pipeline cannot continue past this stage.
    #[error("{0}")]
    Fatal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// An enhancement stage's output delta. Each variant owns exactly the state
/// fields its stage is allowed to write, which is what makes the parallel
/// phase race-free by construction.
#[derive(Debug, Clone)]
pub enum EnhancementOutput {
    Advice {
        ats_recommendations: Vec<String>,
        career_advice: Vec<String>,
        improvement_suggestions: Vec<String>,
    },
    CompanyIntel(CompanyIntel),
    InterviewQuestions(Vec<InterviewQuestion>),
    ResumeSuggestions(Vec<TailoredSuggestion>),
}

/// What a finished enhancement stage hands back to the coordinator.
#[derive(Debug, Clone)]
pub struct Enhanced {
    pub output: EnhancementOutput,
    /// One human-readable log line (without prefix).
    pub summary: String,
    /// True when the stage substituted defaults after an internal failure.
    pub degraded: bool,
}

impl Enhanced {
    pub fn ok(output: EnhancementOutput, summary: impl Into<String>) -> Self {
        Self {
            output,
            summary: summary.into(),
            degraded: false,
        }
    }

    pub fn degraded(output: EnhancementOutput, summary: impl Into<String>) -> Self {
        Self {
            output,
            summary: summary.into(),
            degraded: true,
        }
    }
}

/// An independent advice-generating stage run by the fan-out coordinator.
///
/// Implementations read the post-match state snapshot and return their own
/// fields only. They are expected to catch their own collaborator failures
/// and degrade via [`Enhancer::fallback`]; the coordinator enforces the same
/// substitution for anything that still escapes (panic, timeout, stray error).
#[async_trait]
pub trait Enhancer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Gating predicate. A stage that does not apply is never scheduled and
    /// leaves no trace — no log line, no default output.
    fn applies(&self, _state: &AnalysisState) -> bool {
        true
    }

    async fn enhance(&self, state: &AnalysisState, deps: &PipelineDeps) -> StageResult<Enhanced>;

    /// Hand-authored static defaults for this stage's fields.
    fn fallback(&self, state: &AnalysisState) -> EnhancementOutput;
}
