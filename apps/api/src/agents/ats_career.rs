//! Combined ATS + career advice enhancement stage.
//!
//! One LLM call produces all three advice lists (ATS recommendations, career
//! advice, improvement suggestions) — they share the same inputs, and one
//! call halves the latency of the fan-out's slowest path. Any failure
//! degrades to the static defaults below.

use async_trait::async_trait;
use serde::Deserialize;

use crate::agents::{join_top, prompts};
use crate::llm::complete_json;
use crate::pipeline::stage::{Enhanced, EnhancementOutput, Enhancer, StageResult};
use crate::pipeline::state::AnalysisState;
use crate::pipeline::PipelineDeps;

const MAX_ITEMS: usize = 7;
const PROMPT_SKILLS: usize = 10;

#[derive(Debug, Deserialize)]
struct AdviceLlmOutput {
    #[serde(default)]
    ats_recommendations: Vec<String>,
    #[serde(default)]
    career_advice: Vec<String>,
    #[serde(default)]
    improvement_suggestions: Vec<String>,
}

pub struct AtsCareerAdvisor;

fn default_ats_recommendations() -> Vec<String> {
    [
        "Ensure keywords from the job description are present in your resume",
        "Use standard section headers (Experience, Education, Skills)",
        "Include measurable achievements with numbers",
        "Match job title keywords in your experience section",
        "Use industry-standard terminology",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_career_advice() -> Vec<String> {
    [
        "Continue developing your technical skills",
        "Build projects showcasing missing skills",
        "Network with professionals in your target role",
        "Keep your resume updated with recent achievements",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[async_trait]
impl Enhancer for AtsCareerAdvisor {
    fn name(&self) -> &'static str {
        "ats_career"
    }

    async fn enhance(&self, state: &AnalysisState, deps: &PipelineDeps) -> StageResult<Enhanced> {
        let prompt = prompts::ADVICE_PROMPT_TEMPLATE
            .replace("{match_score}", &format!("{:.2}", state.match_score))
            .replace(
                "{matched_skills}",
                &join_top(&state.matched_skills, PROMPT_SKILLS),
            )
            .replace(
                "{missing_skills}",
                &join_top(&state.missing_skills, PROMPT_SKILLS),
            )
            .replace("{job_title}", &state.job_title);

        match complete_json::<AdviceLlmOutput>(deps.llm.as_ref(), prompts::ADVICE_SYSTEM, &prompt)
            .await
        {
            Ok(mut output) => {
                output.ats_recommendations.truncate(MAX_ITEMS);
                output.career_advice.truncate(MAX_ITEMS);
                output.improvement_suggestions.truncate(MAX_ITEMS);

                // A syntactically valid but empty answer is worse than defaults.
                if output.ats_recommendations.is_empty() && output.career_advice.is_empty() {
                    return Ok(Enhanced::degraded(
                        self.fallback(state),
                        "ATS/career advisor returned no suggestions; using defaults".to_string(),
                    ));
                }

                let summary = format!(
                    "Generated {} ATS recommendations and {} career advice entries",
                    output.ats_recommendations.len(),
                    output.career_advice.len()
                );
                Ok(Enhanced::ok(
                    EnhancementOutput::Advice {
                        ats_recommendations: output.ats_recommendations,
                        career_advice: output.career_advice,
                        improvement_suggestions: output.improvement_suggestions,
                    },
                    summary,
                ))
            }
            Err(e) => Ok(Enhanced::degraded(
                self.fallback(state),
                format!("ATS/career advisor error: {e}"),
            )),
        }
    }

    fn fallback(&self, _state: &AnalysisState) -> EnhancementOutput {
        EnhancementOutput::Advice {
            ats_recommendations: default_ats_recommendations(),
            career_advice: default_career_advice(),
            improvement_suggestions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_carries_static_advice() {
        let state = AnalysisState::new(crate::pipeline::state::AnalysisInput {
            resume_file: bytes::Bytes::from_static(b"x"),
            resume_filename: "r.pdf".to_string(),
            job_description: "jd".to_string(),
            job_url: None,
            company_name: None,
        });

        match AtsCareerAdvisor.fallback(&state) {
            EnhancementOutput::Advice {
                ats_recommendations,
                career_advice,
                improvement_suggestions,
            } => {
                assert_eq!(ats_recommendations.len(), 5);
                assert_eq!(career_advice.len(), 4);
                assert!(improvement_suggestions.is_empty());
            }
            other => panic!("unexpected output variant: {other:?}"),
        }
    }
}
