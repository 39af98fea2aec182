//! Interview preparation enhancement stage.
//!
//! Generates likely interview questions with the reasoning behind each and a
//! preparation tip, targeting the candidate's weak spots. Degrades to two
//! STAR-method staples when the LLM is unavailable.

use async_trait::async_trait;

use crate::agents::{join_top, prompts};
use crate::llm::complete_json;
use crate::pipeline::stage::{Enhanced, EnhancementOutput, Enhancer, StageResult};
use crate::pipeline::state::{AnalysisState, InterviewQuestion};
use crate::pipeline::PipelineDeps;

const MAX_QUESTIONS: usize = 5;

pub struct InterviewPrep;

fn default_questions() -> Vec<InterviewQuestion> {
    vec![
        InterviewQuestion {
            question: "Tell me about a challenging project you worked on.".to_string(),
            why: "Standard behavioral question".to_string(),
            tip: "Use the STAR method: Situation, Task, Action, Result".to_string(),
        },
        InterviewQuestion {
            question: "How do you approach debugging a complex issue?".to_string(),
            why: "Tests problem-solving skills".to_string(),
            tip: "Walk through your systematic approach".to_string(),
        },
    ]
}

#[async_trait]
impl Enhancer for InterviewPrep {
    fn name(&self) -> &'static str {
        "interview_prep"
    }

    async fn enhance(&self, state: &AnalysisState, deps: &PipelineDeps) -> StageResult<Enhanced> {
        // Company intel is produced concurrently by the investigator, so this
        // stage can only use what was known before the fan-out started.
        let company_tech = if state.company_intel.recent_tech.is_empty() {
            "Not available".to_string()
        } else {
            state.company_intel.recent_tech.join(", ")
        };

        let prompt = prompts::INTERVIEW_PREP_PROMPT_TEMPLATE
            .replace("{job_title}", &state.job_title)
            .replace("{job_skills}", &join_top(&state.job_skills, 15))
            .replace("{resume_skills}", &join_top(&state.resume_skills, 15))
            .replace("{missing_skills}", &join_top(&state.missing_skills, 10))
            .replace("{match_score}", &format!("{:.2}", state.match_score))
            .replace("{company_tech}", &company_tech);

        match complete_json::<Vec<InterviewQuestion>>(
            deps.llm.as_ref(),
            prompts::INTERVIEW_PREP_SYSTEM,
            &prompt,
        )
        .await
        {
            Ok(mut questions) => {
                questions.retain(|q| !q.question.trim().is_empty());
                questions.truncate(MAX_QUESTIONS);

                if questions.is_empty() {
                    return Ok(Enhanced::degraded(
                        self.fallback(state),
                        "Interview prep returned no questions; using defaults".to_string(),
                    ));
                }

                let summary = format!("Generated {} interview questions", questions.len());
                Ok(Enhanced::ok(
                    EnhancementOutput::InterviewQuestions(questions),
                    summary,
                ))
            }
            Err(e) => Ok(Enhanced::degraded(
                self.fallback(state),
                format!("Interview prep error: {e}"),
            )),
        }
    }

    fn fallback(&self, _state: &AnalysisState) -> EnhancementOutput {
        EnhancementOutput::InterviewQuestions(default_questions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_star_method_staples() {
        match InterviewPrep.fallback(&AnalysisState::new(crate::pipeline::state::AnalysisInput {
            resume_file: bytes::Bytes::from_static(b"x"),
            resume_filename: "r.pdf".to_string(),
            job_description: "jd".to_string(),
            job_url: None,
            company_name: None,
        })) {
            EnhancementOutput::InterviewQuestions(questions) => {
                assert_eq!(questions.len(), 2);
                assert!(questions[0].tip.contains("STAR"));
            }
            other => panic!("unexpected output variant: {other:?}"),
        }
    }
}
