//! Pipeline orchestrator — drives one analysis from `init` to `done`.
//!
//! Phase machine:
//!
//! ```text
//! init ──► parsed ──► matched ──► enhanced ──► reported ──► done
//!   │         │          │
//!   └─────────┴──────────┴──► failed   (fatal errors only)
//! ```
//!
//! `failed` is reachable only from the first three phases: missing mandatory
//! input and matching-engine failures are fatal, while enhancement and report
//! failures are always absorbed into defaults. The entry point is one-shot
//! and never retries a stage; retrying external calls is the collaborators'
//! own business.

use std::sync::Arc;
use tracing::{info, warn};

use crate::agents::{job_parser, matcher, report, resume_parser};
use crate::pipeline::fanout::{self, default_enhancers};
use crate::pipeline::stage::{
    Enhancer, StageError, DEGRADED_PREFIX, FATAL_PREFIX, OK_PREFIX,
};
use crate::pipeline::state::AnalysisState;
use crate::pipeline::PipelineDeps;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Init,
    Parsed,
    Matched,
    Enhanced,
    Reported,
    Done,
    Failed,
}

impl PipelinePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelinePhase::Init => "init",
            PipelinePhase::Parsed => "parsed",
            PipelinePhase::Matched => "matched",
            PipelinePhase::Enhanced => "enhanced",
            PipelinePhase::Reported => "reported",
            PipelinePhase::Done => "done",
            PipelinePhase::Failed => "failed",
        }
    }
}

/// Runs the full pipeline with the production enhancement roster.
pub async fn run(deps: &Arc<PipelineDeps>, state: AnalysisState) -> AnalysisState {
    run_with_enhancers(deps, state, &default_enhancers()).await
}

/// Same as [`run`], with an explicit enhancement roster (used by tests).
pub async fn run_with_enhancers(
    deps: &Arc<PipelineDeps>,
    mut state: AnalysisState,
    enhancers: &[Arc<dyn Enhancer>],
) -> AnalysisState {
    // Mandatory inputs gate the whole pipeline; nothing runs without them.
    if state.input.job_description.trim().is_empty() {
        return fail(state, "Job description text is required".to_string());
    }
    if state.input.resume_file.is_empty() {
        return fail(state, "Resume file is required".to_string());
    }

    info!("Pipeline {} starting", state.id);

    // init → parsed. The two parsers read only the immutable input and write
    // disjoint deltas, so they run concurrently; matching waits for both.
    let (resume_result, job_result) = tokio::join!(
        resume_parser::run(&state.input, deps),
        job_parser::run(&state.input, deps),
    );

    let parsed_resume = match resume_result {
        Ok(delta) => delta,
        Err(e) => return fail(state, fatal_text(e)),
    };
    let parsed_job = match job_result {
        Ok(delta) => delta,
        Err(e) => return fail(state, fatal_text(e)),
    };

    let resume_line = stage_line(parsed_resume.degraded, &parsed_resume.summary);
    parsed_resume.apply(&mut state);
    state.push_message(resume_line);

    let job_line = stage_line(parsed_job.degraded, &parsed_job.summary);
    parsed_job.apply(&mut state);
    state.push_message(job_line);

    state.current_step = PipelinePhase::Parsed.as_str().to_string();

    // parsed → matched. The match fields are load-bearing downstream, so a
    // failure here is fatal and no enhancement stage is ever scheduled.
    match matcher::run(&state, deps).await {
        Ok(delta) => {
            let line = format!(
                "{OK_PREFIX} Match analysis complete: {:.2}% match",
                delta.match_score
            );
            delta.apply(&mut state);
            state.push_message(line);
            state.current_step = PipelinePhase::Matched.as_str().to_string();
        }
        Err(e) => return fail(state, fatal_text(e)),
    }

    // matched → enhanced. Never fatal: every sub-failure degrades to defaults.
    fanout::run_enhancements(deps, &mut state, enhancers).await;
    state.current_step = PipelinePhase::Enhanced.as_str().to_string();

    // enhanced → reported. Report failure is recoverable; fields stay absent.
    match report::render(&state) {
        Ok(artifacts) => {
            artifacts.apply(&mut state);
            state.push_message(format!("{OK_PREFIX} Report rendered"));
        }
        Err(e) => {
            state.push_message(format!("{DEGRADED_PREFIX} Report unavailable: {e}"));
        }
    }
    state.current_step = PipelinePhase::Reported.as_str().to_string();

    // reported → done.
    state.current_step = PipelinePhase::Done.as_str().to_string();
    info!(
        "Pipeline {} done: score {:.2}, {} log lines",
        state.id,
        state.match_score,
        state.messages.len()
    );

    state
}

fn stage_line(degraded: bool, summary: &str) -> String {
    let prefix = if degraded { DEGRADED_PREFIX } else { OK_PREFIX };
    format!("{prefix} {summary}")
}

fn fatal_text(e: StageError) -> String {
    match e {
        StageError::Fatal(msg) | StageError::Recoverable(msg) => msg,
    }
}

fn fail(mut state: AnalysisState, message: String) -> AnalysisState {
    warn!("Pipeline {} failed: {message}", state.id);
    state.push_message(format!("{FATAL_PREFIX} {message}"));
    state.error = Some(message);
    state.current_step = PipelinePhase::Failed.as_str().to_string();
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testutil::{
        deps_with, test_input, FailingReasoner, FailingSimilarity, FixedSimilarity,
        ScriptedReasoner,
    };
    use std::time::Duration;

    const JD: &str = "We need a Python engineer with Kubernetes experience.";

    fn scripted_deps() -> Arc<PipelineDeps> {
        deps_with(
            Arc::new(ScriptedReasoner),
            Arc::new(FixedSimilarity(80.0)),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn happy_path_reaches_done_with_reference_score() {
        let deps = scripted_deps();
        let state = run(&deps, AnalysisState::new(test_input(JD, None))).await;

        assert!(state.error.is_none());
        assert_eq!(state.current_step, "done");

        // Dictionary + LLM resume skills vs JD skills: {python} of
        // {python, kubernetes} matched → skillPct 50, 0.6·80 + 0.4·50 = 68.
        assert_eq!(state.match_score, 68.0);
        assert!(state.matched_skills.contains("python"));
        assert!(state.missing_skills.contains("kubernetes"));

        // Enhancement outputs from the scripted reasoner.
        assert_eq!(state.ats_recommendations, vec!["Use exact keywords"]);
        assert_eq!(state.interview_questions.len(), 1);
        assert_eq!(state.tailored_resume_suggestions.len(), 1);

        // Report rendered and job parse carried through.
        assert!(state.html_report.is_some());
        assert_eq!(state.job_title, "Backend Engineer");
        assert_eq!(state.job_experience_required, "5+ years");
    }

    #[tokio::test]
    async fn identical_inputs_produce_identical_match_results() {
        let deps = scripted_deps();
        let first = run(&deps, AnalysisState::new(test_input(JD, None))).await;
        let second = run(&deps, AnalysisState::new(test_input(JD, None))).await;

        assert_eq!(first.match_score, second.match_score);
        assert_eq!(first.matched_skills, second.matched_skills);
        assert_eq!(first.missing_skills, second.missing_skills);
        assert_eq!(first.strengths, second.strengths);
    }

    #[tokio::test]
    async fn all_enhancers_failing_still_reaches_done_with_defaults() {
        let deps = deps_with(
            Arc::new(FailingReasoner::new()),
            Arc::new(FixedSimilarity(80.0)),
            Duration::from_secs(5),
        );
        let state = run(&deps, AnalysisState::new(test_input(JD, None))).await;

        assert!(state.error.is_none());
        assert_eq!(state.current_step, "done");

        // Dictionary-only skills give the same sets, so the score holds.
        assert_eq!(state.match_score, 68.0);

        // Every advice field carries its stage's hand-authored defaults.
        assert_eq!(state.ats_recommendations.len(), 5);
        assert_eq!(state.career_advice.len(), 4);
        assert_eq!(state.interview_questions.len(), 2);
        assert!(state.interview_questions[0].tip.contains("STAR"));
        assert_eq!(state.tailored_resume_suggestions.len(), 1);
    }

    #[tokio::test]
    async fn empty_job_description_fails_before_any_stage_runs() {
        let llm = Arc::new(FailingReasoner::new());
        let deps = deps_with(
            llm.clone(),
            Arc::new(FixedSimilarity(80.0)),
            Duration::from_secs(5),
        );
        let state = run(&deps, AnalysisState::new(test_input("   ", None))).await;

        assert_eq!(state.current_step, "failed");
        assert!(state.error.as_deref().unwrap().contains("Job description"));
        assert!(state.messages.iter().any(|m| m.starts_with(FATAL_PREFIX)));

        // No stage ran: zero reasoning calls, no enhancement side effects.
        assert_eq!(llm.call_count(), 0);
        assert!(state.ats_recommendations.is_empty());
        assert!(state.interview_questions.is_empty());
        assert!(state.company_intel.is_empty());
        assert!(state.html_report.is_none());
    }

    #[tokio::test]
    async fn similarity_outage_is_fatal_and_skips_enhancement() {
        let llm = Arc::new(FailingReasoner::new());
        let deps = deps_with(llm.clone(), Arc::new(FailingSimilarity), Duration::from_secs(5));
        let state = run(&deps, AnalysisState::new(test_input(JD, None))).await;

        assert_eq!(state.current_step, "failed");
        assert!(state.error.as_deref().unwrap().contains("Matching failed"));

        // Only the two parsers touched the reasoner before the fatal stop.
        assert_eq!(llm.call_count(), 2);
        assert!(state.ats_recommendations.is_empty());
        assert!(state.interview_questions.is_empty());
    }

    #[tokio::test]
    async fn empty_resume_file_is_fatal() {
        let deps = scripted_deps();
        let mut input = test_input(JD, None);
        input.resume_file = bytes::Bytes::new();
        let state = run(&deps, AnalysisState::new(input)).await;

        assert_eq!(state.current_step, "failed");
        assert!(state.error.as_deref().unwrap().contains("Resume file"));
    }

    #[tokio::test]
    async fn investigator_runs_when_company_name_is_given() {
        let deps = scripted_deps();
        let state = run(&deps, AnalysisState::new(test_input(JD, Some("Globex")))).await;

        assert_eq!(state.company_intel.company_name, "Globex");
        assert_eq!(state.company_intel.recent_tech, vec!["Rust"]);
        assert!(state
            .messages
            .iter()
            .any(|m| m.contains("Company intel gathered for Globex")));
    }

    #[tokio::test]
    async fn investigator_gated_off_leaves_no_trace() {
        let deps = scripted_deps();
        let state = run(&deps, AnalysisState::new(test_input(JD, None))).await;

        assert!(state.company_intel.is_empty());
        assert_eq!(state.company_intel.company_name, "");
        assert!(state
            .messages
            .iter()
            .all(|m| !m.to_lowercase().contains("company intel")));
    }

    #[test]
    fn phase_names_are_stable() {
        assert_eq!(PipelinePhase::Init.as_str(), "init");
        assert_eq!(PipelinePhase::Done.as_str(), "done");
        assert_eq!(PipelinePhase::Failed.as_str(), "failed");
    }
}
