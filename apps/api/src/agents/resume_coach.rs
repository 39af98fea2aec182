//! Resume tailoring enhancement stage.
//!
//! Maps the candidate's experience onto the job's requirements as concrete
//! edits: which section, what to change, why. The degraded default points at
//! the skills section with the top missing skills, which is the one edit
//! that is always defensible.

use async_trait::async_trait;

use crate::agents::{clip_chars, join_top, prompts};
use crate::llm::complete_json;
use crate::pipeline::stage::{Enhanced, EnhancementOutput, Enhancer, StageResult};
use crate::pipeline::state::{AnalysisState, TailoredSuggestion};
use crate::pipeline::PipelineDeps;

const MAX_SUGGESTIONS: usize = 5;
const PROMPT_TEXT_LIMIT: usize = 2000;

pub struct ResumeCoach;

#[async_trait]
impl Enhancer for ResumeCoach {
    fn name(&self) -> &'static str {
        "resume_coach"
    }

    async fn enhance(&self, state: &AnalysisState, deps: &PipelineDeps) -> StageResult<Enhanced> {
        let prompt = prompts::RESUME_COACH_PROMPT_TEMPLATE
            .replace("{job_title}", &state.job_title)
            .replace("{job_requirements}", &state.job_requirements.join("; "))
            .replace("{job_skills}", &join_top(&state.job_skills, 15))
            .replace(
                "{resume_text}",
                clip_chars(&state.resume_text, PROMPT_TEXT_LIMIT),
            )
            .replace("{resume_skills}", &join_top(&state.resume_skills, 15))
            .replace("{missing_skills}", &join_top(&state.missing_skills, 10))
            .replace("{match_score}", &format!("{:.2}", state.match_score));

        match complete_json::<Vec<TailoredSuggestion>>(
            deps.llm.as_ref(),
            prompts::RESUME_COACH_SYSTEM,
            &prompt,
        )
        .await
        {
            Ok(mut suggestions) => {
                suggestions.retain(|s| !s.change.trim().is_empty());
                suggestions.truncate(MAX_SUGGESTIONS);

                if suggestions.is_empty() {
                    return Ok(Enhanced::degraded(
                        self.fallback(state),
                        "Resume coach returned no suggestions; using defaults".to_string(),
                    ));
                }

                let summary = format!("Generated {} resume tailoring suggestions", suggestions.len());
                Ok(Enhanced::ok(
                    EnhancementOutput::ResumeSuggestions(suggestions),
                    summary,
                ))
            }
            Err(e) => Ok(Enhanced::degraded(
                self.fallback(state),
                format!("Resume coach error: {e}"),
            )),
        }
    }

    fn fallback(&self, state: &AnalysisState) -> EnhancementOutput {
        let top_missing = join_top(&state.missing_skills, 3);
        let change = if top_missing.is_empty() {
            "Mirror the job description's terminology for your strongest skills".to_string()
        } else {
            format!("Add missing skills you genuinely have: {top_missing}")
        };

        EnhancementOutput::ResumeSuggestions(vec![TailoredSuggestion {
            section: "Skills section".to_string(),
            change,
            reason: "These skills are explicitly mentioned in the job description".to_string(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn state_with_missing(missing: &[&str]) -> AnalysisState {
        let mut state = AnalysisState::new(crate::pipeline::state::AnalysisInput {
            resume_file: Bytes::from_static(b"x"),
            resume_filename: "r.pdf".to_string(),
            job_description: "jd".to_string(),
            job_url: None,
            company_name: None,
        });
        state.missing_skills = missing.iter().map(|s| s.to_string()).collect();
        state
    }

    #[test]
    fn fallback_names_top_missing_skills() {
        let state = state_with_missing(&["kubernetes", "java", "kafka", "terraform"]);
        match ResumeCoach.fallback(&state) {
            EnhancementOutput::ResumeSuggestions(suggestions) => {
                assert_eq!(suggestions.len(), 1);
                // Lexicographic top-3 of the missing set.
                assert!(suggestions[0].change.contains("java, kafka, kubernetes"));
            }
            other => panic!("unexpected output variant: {other:?}"),
        }
    }

    #[test]
    fn fallback_without_missing_skills_still_gives_an_edit() {
        let state = state_with_missing(&[]);
        match ResumeCoach.fallback(&state) {
            EnhancementOutput::ResumeSuggestions(suggestions) => {
                assert!(!suggestions[0].change.is_empty());
            }
            other => panic!("unexpected output variant: {other:?}"),
        }
    }
}
