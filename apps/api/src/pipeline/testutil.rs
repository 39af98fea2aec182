//! Deterministic collaborator stubs shared by the pipeline tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::agents::prompts;
use crate::cache::AnalysisCache;
use crate::extract::{ExtractError, TextExtractor};
use crate::llm::{LlmError, Reasoner};
use crate::pipeline::state::{AnalysisInput, AnalysisState};
use crate::pipeline::PipelineDeps;
use crate::scraper::{CompanySearch, CompanySearchResult, ScrapeError};
use crate::similarity::{SimilarityError, SimilarityScorer};

pub const RESUME_FIXTURE: &str = "Jane Doe\n\nSummary\nBackend engineer.\n\nSkills\nPython, AWS, Docker\n\nExperience\nBuilt Python services on AWS with Docker.";

pub fn test_input(job_description: &str, company_name: Option<&str>) -> AnalysisInput {
    AnalysisInput {
        resume_file: Bytes::from_static(b"%PDF-1.4 stub"),
        resume_filename: "resume.pdf".to_string(),
        job_description: job_description.to_string(),
        job_url: None,
        company_name: company_name.map(|c| c.to_string()),
    }
}

/// A state as the matcher would leave it, for fan-out tests that do not want
/// to run the earlier phases.
pub fn state_after_match() -> AnalysisState {
    let mut state = AnalysisState::new(test_input(
        "We need a Python engineer with Kubernetes experience.",
        None,
    ));
    state.resume_text = RESUME_FIXTURE.to_string();
    state.resume_skills = ["python", "aws", "docker"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    state.job_title = "Backend Engineer".to_string();
    state.job_skills = ["python", "kubernetes"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    state.match_score = 68.0;
    state.matched_skills = ["python".to_string()].into_iter().collect();
    state.missing_skills = ["kubernetes".to_string()].into_iter().collect();
    state.current_step = "matched".to_string();
    state
}

// ────────────────────────────────────────────────────────────────────────────
// Reasoner stubs
// ────────────────────────────────────────────────────────────────────────────

/// Always fails, counting invocations — lets tests assert that no reasoning
/// call happened at all (e.g. after a fatal error).
pub struct FailingReasoner {
    pub calls: AtomicUsize,
}

impl FailingReasoner {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Reasoner for FailingReasoner {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LlmError::Api {
            status: 500,
            message: "stubbed outage".to_string(),
        })
    }
}

/// Answers each known system prompt with canned, schema-valid JSON.
pub struct ScriptedReasoner;

#[async_trait]
impl Reasoner for ScriptedReasoner {
    async fn complete(&self, system: &str, _prompt: &str) -> Result<String, LlmError> {
        let canned = if system == prompts::RESUME_PARSE_SYSTEM {
            r#"{"skills": ["python", "terraform"], "summary": "Backend engineer.", "key_highlights": []}"#
        } else if system == prompts::JOB_PARSE_SYSTEM {
            r#"{"job_title": "Backend Engineer", "position_type": "Full-time", "required_skills": ["python", "kubernetes"], "required_experience": "5+ years", "key_requirements": ["Operate services"], "nice_to_have": ["Kafka"]}"#
        } else if system == prompts::ADVICE_SYSTEM {
            r#"{"ats_recommendations": ["Use exact keywords"], "career_advice": ["Learn Kubernetes"], "improvement_suggestions": ["Quantify impact"]}"#
        } else if system == prompts::INTERVIEW_PREP_SYSTEM {
            r#"[{"question": "Explain Kubernetes pods", "why": "Listed as required", "tip": "Contrast with containers"}]"#
        } else if system == prompts::RESUME_COACH_SYSTEM {
            r#"[{"section": "Skills", "change": "Add Kubernetes", "reason": "Required by the JD"}]"#
        } else if system == prompts::INVESTIGATOR_SYSTEM {
            r#"{"recent_tech": ["Rust"], "talking_points": ["Mention their blog"], "culture_notes": "Engineering-led."}"#
        } else {
            return Err(LlmError::Api {
                status: 400,
                message: format!("unscripted system prompt: {system}"),
            });
        };
        Ok(canned.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Other collaborator stubs
// ────────────────────────────────────────────────────────────────────────────

pub struct FixedSimilarity(pub f64);

#[async_trait]
impl SimilarityScorer for FixedSimilarity {
    async fn score(&self, _a: &str, _b: &str) -> Result<f64, SimilarityError> {
        Ok(self.0)
    }
}

pub struct FailingSimilarity;

#[async_trait]
impl SimilarityScorer for FailingSimilarity {
    async fn score(&self, _a: &str, _b: &str) -> Result<f64, SimilarityError> {
        Err(SimilarityError::Api {
            status: 503,
            message: "stubbed outage".to_string(),
        })
    }
}

pub struct StaticExtractor(pub &'static str);

#[async_trait]
impl TextExtractor for StaticExtractor {
    async fn extract_text(&self, _data: &[u8], _filename: &str) -> Result<String, ExtractError> {
        Ok(self.0.to_string())
    }
}

pub struct NoSearch;

#[async_trait]
impl CompanySearch for NoSearch {
    async fn company_info(&self, _company: &str) -> Result<CompanySearchResult, ScrapeError> {
        Ok(CompanySearchResult::default())
    }
}

/// Deps with a memory cache, no-op search and a static resume extractor.
pub fn deps_with(
    llm: Arc<dyn Reasoner>,
    similarity: Arc<dyn SimilarityScorer>,
    enhancer_timeout: Duration,
) -> Arc<PipelineDeps> {
    Arc::new(PipelineDeps {
        llm,
        similarity,
        extractor: Arc::new(StaticExtractor(RESUME_FIXTURE)),
        search: Arc::new(NoSearch),
        cache: Arc::new(AnalysisCache::connect(None)),
        enhancer_timeout,
    })
}
