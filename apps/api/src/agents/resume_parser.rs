//! Resume parsing stage.
//!
//! Extracts text from the uploaded file, splits sections, and builds the
//! resume skill set: deterministic dictionary lookup unioned with
//! LLM-extracted skills. The LLM call is optional quality — its failure
//! degrades to dictionary-only extraction. A resume that yields no text at
//! all is fatal: nothing downstream can run without it.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::agents::{clip_chars, prompts};
use crate::extract::skills::{extract_skills, normalize_skills};
use crate::extract::split_sections;
use crate::llm::complete_json;
use crate::pipeline::stage::{StageError, StageResult};
use crate::pipeline::state::{AnalysisInput, AnalysisState};
use crate::pipeline::PipelineDeps;

/// How much resume text the enrichment prompt carries.
const PROMPT_TEXT_LIMIT: usize = 4000;

// The prompt also asks for a summary and highlights (useful context that
// keeps skill extraction honest); only the skills feed the pipeline, so
// serde simply ignores the rest.
#[derive(Debug, Deserialize)]
struct ResumeLlmOutput {
    skills: Vec<String>,
}

/// Delta produced by this stage — exactly the resume-side parse fields.
#[derive(Debug)]
pub struct ParsedResume {
    pub text: String,
    pub sections: BTreeMap<String, String>,
    pub skills: BTreeSet<String>,
    pub summary: String,
    pub degraded: bool,
}

impl ParsedResume {
    pub fn apply(self, state: &mut AnalysisState) {
        state.resume_text = self.text;
        state.resume_sections = self.sections;
        state.resume_skills = self.skills;
    }
}

pub async fn run(input: &AnalysisInput, deps: &PipelineDeps) -> StageResult<ParsedResume> {
    let text = deps
        .extractor
        .extract_text(&input.resume_file, &input.resume_filename)
        .await
        .map_err(|e| StageError::Fatal(format!("Resume parsing failed: {e}")))?;

    if text.trim().is_empty() {
        return Err(StageError::Fatal(
            "Resume parsing failed: document contains no extractable text".to_string(),
        ));
    }

    let sections = split_sections(&text);
    let mut skills = extract_skills(&text);

    // LLM enrichment — dictionary extraction already succeeded, so any
    // failure here only costs coverage, never the stage.
    let prompt = prompts::RESUME_PARSE_PROMPT_TEMPLATE
        .replace("{resume_text}", clip_chars(&text, PROMPT_TEXT_LIMIT));

    match complete_json::<ResumeLlmOutput>(deps.llm.as_ref(), prompts::RESUME_PARSE_SYSTEM, &prompt)
        .await
    {
        Ok(output) => {
            skills.extend(normalize_skills(output.skills));
            Ok(ParsedResume {
                summary: format!("Resume parsed: {} skills identified", skills.len()),
                text,
                sections,
                skills,
                degraded: false,
            })
        }
        Err(e) => Ok(ParsedResume {
            summary: format!(
                "Resume parsed with dictionary skills only ({} found); enrichment unavailable: {e}",
                skills.len()
            ),
            text,
            sections,
            skills,
            degraded: true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::state::AnalysisState;
    use bytes::Bytes;

    fn state_input() -> AnalysisInput {
        AnalysisInput {
            resume_file: Bytes::from_static(b"unused"),
            resume_filename: "resume.pdf".to_string(),
            job_description: "A job.".to_string(),
            job_url: None,
            company_name: None,
        }
    }

    #[test]
    fn apply_writes_only_resume_fields() {
        let mut state = AnalysisState::new(state_input());
        let delta = ParsedResume {
            text: "text".to_string(),
            sections: BTreeMap::new(),
            skills: ["python".to_string()].into_iter().collect(),
            summary: "ok".to_string(),
            degraded: false,
        };
        delta.apply(&mut state);

        assert_eq!(state.resume_text, "text");
        assert!(state.resume_skills.contains("python"));
        assert!(state.job_skills.is_empty());
        assert!(state.job_title.is_empty());
    }
}
