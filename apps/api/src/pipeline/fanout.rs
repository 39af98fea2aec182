//! Enhancement fan-out coordinator.
//!
//! Runs the independent advice stages concurrently against a shared
//! read-only snapshot of the post-match state, joins them all, and merges
//! their field-disjoint outputs back into the canonical state on one thread.
//!
//! Isolation is layered: stages catch their own collaborator failures and
//! degrade internally; the coordinator additionally converts anything that
//! still escapes — a stray error, a panic, a timeout — into that stage's
//! hand-authored defaults. One stage can never take down another, and the
//! enhancement phase as a whole can never fail the pipeline.

use std::sync::Arc;
use tracing::{info, warn};

use crate::agents::ats_career::AtsCareerAdvisor;
use crate::agents::interview_prep::InterviewPrep;
use crate::agents::investigator::Investigator;
use crate::agents::resume_coach::ResumeCoach;
use crate::pipeline::stage::{Enhancer, DEGRADED_PREFIX, OK_PREFIX};
use crate::pipeline::state::AnalysisState;
use crate::pipeline::PipelineDeps;

/// The production enhancement roster, in merge order.
pub fn default_enhancers() -> Vec<Arc<dyn Enhancer>> {
    vec![
        Arc::new(AtsCareerAdvisor) as Arc<dyn Enhancer>,
        Arc::new(Investigator),
        Arc::new(InterviewPrep),
        Arc::new(ResumeCoach),
    ]
}

pub async fn run_enhancements(
    deps: &Arc<PipelineDeps>,
    state: &mut AnalysisState,
    enhancers: &[Arc<dyn Enhancer>],
) {
    // One immutable snapshot shared by every stage. Stage bodies cannot
    // reach the canonical state at all during the parallel section.
    let snapshot = Arc::new(state.clone());

    let scheduled: Vec<Arc<dyn Enhancer>> = enhancers
        .iter()
        .filter(|e| e.applies(&snapshot))
        .cloned()
        .collect();

    let skipped = enhancers.len() - scheduled.len();
    if skipped > 0 {
        info!("Enhancement fan-out: {skipped} stage(s) gated off");
    }

    let mut handles = Vec::with_capacity(scheduled.len());
    for enhancer in &scheduled {
        let enhancer = Arc::clone(enhancer);
        let deps_for_task = Arc::clone(deps);
        let snap = Arc::clone(&snapshot);
        handles.push(tokio::spawn(async move {
            tokio::time::timeout(
                deps_for_task.enhancer_timeout,
                enhancer.enhance(&snap, &deps_for_task),
            )
            .await
        }));
    }

    // Join barrier: every stage finishes (or times out) before any merge.
    // The merge itself is single-threaded and runs in declaration order;
    // outputs are field-disjoint, so that order is cosmetic.
    for (enhancer, handle) in scheduled.iter().zip(handles) {
        match handle.await {
            Ok(Ok(Ok(enhanced))) => {
                let prefix = if enhanced.degraded {
                    DEGRADED_PREFIX
                } else {
                    OK_PREFIX
                };
                state.apply_enhancement(enhanced.output);
                state.push_message(format!("{prefix} {}", enhanced.summary));
            }
            Ok(Ok(Err(stage_err))) => {
                warn!("{} escaped its failure isolation: {stage_err}", enhancer.name());
                state.apply_enhancement(enhancer.fallback(&snapshot));
                state.push_message(format!(
                    "{DEGRADED_PREFIX} {} error: {stage_err}; using defaults",
                    enhancer.name()
                ));
            }
            Ok(Err(_elapsed)) => {
                warn!(
                    "{} exceeded its {}s deadline",
                    enhancer.name(),
                    deps.enhancer_timeout.as_secs()
                );
                state.apply_enhancement(enhancer.fallback(&snapshot));
                state.push_message(format!(
                    "{DEGRADED_PREFIX} {} timed out after {}s; using defaults",
                    enhancer.name(),
                    deps.enhancer_timeout.as_secs()
                ));
            }
            Err(join_err) => {
                warn!("{} task failed: {join_err}", enhancer.name());
                state.apply_enhancement(enhancer.fallback(&snapshot));
                state.push_message(format!(
                    "{DEGRADED_PREFIX} {} aborted unexpectedly; using defaults",
                    enhancer.name()
                ));
            }
        }
    }

    info!(
        "Enhancement fan-out complete: {} stage(s) merged",
        scheduled.len()
    );
}
