//! Shared analysis state — the single record threaded through every stage.
//!
//! Field groups and their write discipline:
//! - input: set at request entry, never touched again
//! - derived-parse: written exactly once by the resume/job parsers
//! - match: written exactly once by the matching engine
//! - enhancement: each field written by exactly one enhancement stage, so
//!   concurrent stages never contend on a field
//! - report: written last, read only by the HTTP boundary
//! - metadata: append-only message log, current-step marker, terminal error
//!
//! Skills live in `BTreeSet`s so intersection, difference and top-N
//! truncation iterate in one fixed (lexicographic) order.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::pipeline::orchestrator::PipelinePhase;
use crate::pipeline::stage::EnhancementOutput;

/// Immutable request inputs.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub resume_file: Bytes,
    pub resume_filename: String,
    pub job_description: String,
    pub job_url: Option<String>,
    pub company_name: Option<String>,
}

/// One likely interview question with the reasoning behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    pub why: String,
    pub tip: String,
}

/// A concrete resume edit: which section, what to change, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoredSuggestion {
    pub section: String,
    pub change: String,
    pub reason: String,
}

/// Company research synthesized for interview preparation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyIntel {
    pub company_name: String,
    pub recent_tech: Vec<String>,
    pub talking_points: Vec<String>,
    pub culture_notes: String,
    pub sources: Vec<String>,
}

impl CompanyIntel {
    pub fn is_empty(&self) -> bool {
        self.recent_tech.is_empty()
            && self.talking_points.is_empty()
            && self.culture_notes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisState {
    pub id: Uuid,
    pub input: AnalysisInput,

    // Derived-parse fields (resume side)
    pub resume_text: String,
    pub resume_sections: BTreeMap<String, String>,
    pub resume_skills: BTreeSet<String>,

    // Derived-parse fields (job side)
    pub job_title: String,
    pub position_type: String,
    pub job_requirements: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub job_skills: BTreeSet<String>,
    pub job_experience_required: String,

    // Match fields
    pub match_score: f64,
    pub matched_skills: BTreeSet<String>,
    pub missing_skills: BTreeSet<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,

    // Enhancement fields — one writer each
    pub ats_recommendations: Vec<String>,
    pub career_advice: Vec<String>,
    pub improvement_suggestions: Vec<String>,
    pub company_intel: CompanyIntel,
    pub interview_questions: Vec<InterviewQuestion>,
    pub tailored_resume_suggestions: Vec<TailoredSuggestion>,

    // Report fields
    pub html_report: Option<String>,
    pub text_report: Option<String>,

    // Metadata
    pub messages: Vec<String>,
    pub current_step: String,
    pub error: Option<String>,
}

impl AnalysisState {
    pub fn new(input: AnalysisInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            input,
            resume_text: String::new(),
            resume_sections: BTreeMap::new(),
            resume_skills: BTreeSet::new(),
            job_title: String::new(),
            position_type: String::new(),
            job_requirements: Vec::new(),
            nice_to_have: Vec::new(),
            job_skills: BTreeSet::new(),
            job_experience_required: String::new(),
            match_score: 0.0,
            matched_skills: BTreeSet::new(),
            missing_skills: BTreeSet::new(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            ats_recommendations: Vec::new(),
            career_advice: Vec::new(),
            improvement_suggestions: Vec::new(),
            company_intel: CompanyIntel::default(),
            interview_questions: Vec::new(),
            tailored_resume_suggestions: Vec::new(),
            html_report: None,
            text_report: None,
            messages: Vec::new(),
            current_step: PipelinePhase::Init.as_str().to_string(),
            error: None,
        }
    }

    /// Appends one log line. Each stage gets exactly one per invocation;
    /// parallel stages are merged post-join, so appends never interleave.
    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Writes an enhancement stage's field-disjoint delta into the state.
    /// Variants map one-to-one onto field groups, so merge order between
    /// stages cannot matter.
    pub fn apply_enhancement(&mut self, output: EnhancementOutput) {
        match output {
            EnhancementOutput::Advice {
                ats_recommendations,
                career_advice,
                improvement_suggestions,
            } => {
                self.ats_recommendations = ats_recommendations;
                self.career_advice = career_advice;
                self.improvement_suggestions = improvement_suggestions;
            }
            EnhancementOutput::CompanyIntel(intel) => {
                self.company_intel = intel;
            }
            EnhancementOutput::InterviewQuestions(questions) => {
                self.interview_questions = questions;
            }
            EnhancementOutput::ResumeSuggestions(suggestions) => {
                self.tailored_resume_suggestions = suggestions;
            }
        }
    }

    /// Public projection returned by the API and kept in the results cache.
    /// Raw inputs, resume text and report bodies are deliberately excluded.
    pub fn to_response(&self) -> AnalysisResponse {
        AnalysisResponse {
            analysis_id: self.id,
            job_title: self.job_title.clone(),
            position_type: self.position_type.clone(),
            match_score: self.match_score,
            matched_skills: self.matched_skills.iter().cloned().collect(),
            missing_skills: self.missing_skills.iter().cloned().collect(),
            strengths: self.strengths.clone(),
            weaknesses: self.weaknesses.clone(),
            resume_skills: self.resume_skills.iter().cloned().collect(),
            job_skills: self.job_skills.iter().cloned().collect(),
            ats_recommendations: self.ats_recommendations.clone(),
            career_advice: self.career_advice.clone(),
            improvement_suggestions: self.improvement_suggestions.clone(),
            company_intel: self.company_intel.clone(),
            interview_questions: self.interview_questions.clone(),
            tailored_resume_suggestions: self.tailored_resume_suggestions.clone(),
            has_report: self.html_report.is_some(),
            messages: self.messages.clone(),
        }
    }
}

/// The JSON shape callers receive (and later re-fetch by analysis id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis_id: Uuid,
    pub job_title: String,
    pub position_type: String,
    pub match_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub resume_skills: Vec<String>,
    pub job_skills: Vec<String>,
    pub ats_recommendations: Vec<String>,
    pub career_advice: Vec<String>,
    pub improvement_suggestions: Vec<String>,
    pub company_intel: CompanyIntel,
    pub interview_questions: Vec<InterviewQuestion>,
    pub tailored_resume_suggestions: Vec<TailoredSuggestion>,
    pub has_report: bool,
    pub messages: Vec<String>,
}
