//! Matching engine — compatibility score and skill gap analysis.
//!
//! Blends two signals: semantic similarity of the full texts (from the
//! embedding collaborator, 0–100) and the skill-overlap percentage, weighted
//! 60/40. The result is load-bearing for every later stage, so unlike the
//! enhancement stages this one is allowed to fail the pipeline: a similarity
//! outage is fatal, not defaulted.
//!
//! Skill sets are case-normalized before comparison and kept sorted, so
//! matched/missing sets and the top-10 strengths/weaknesses are the same for
//! the same inputs every run.

use std::collections::BTreeSet;

use crate::pipeline::stage::{StageError, StageResult};
use crate::pipeline::state::AnalysisState;
use crate::pipeline::PipelineDeps;

const SIMILARITY_WEIGHT: f64 = 0.6;
const SKILL_WEIGHT: f64 = 0.4;
/// Bound on the strengths/weaknesses lists.
const TOP_N: usize = 10;

/// Delta produced by the matching engine — exactly the match field group.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDelta {
    pub match_score: f64,
    pub matched_skills: BTreeSet<String>,
    pub missing_skills: BTreeSet<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl MatchDelta {
    pub fn apply(self, state: &mut AnalysisState) {
        state.match_score = self.match_score;
        state.matched_skills = self.matched_skills;
        state.missing_skills = self.missing_skills;
        state.strengths = self.strengths;
        state.weaknesses = self.weaknesses;
    }
}

pub async fn run(state: &AnalysisState, deps: &PipelineDeps) -> StageResult<MatchDelta> {
    let similarity = deps
        .similarity
        .score(&state.resume_text, &state.input.job_description)
        .await
        .map_err(|e| StageError::Fatal(format!("Matching failed: {e}")))?;

    Ok(compute_match(
        similarity,
        &state.resume_skills,
        &state.job_skills,
    ))
}

/// Pure scoring core, separated from the collaborator call for testability.
pub fn compute_match(
    similarity: f64,
    resume_skills: &BTreeSet<String>,
    job_skills: &BTreeSet<String>,
) -> MatchDelta {
    let matched: BTreeSet<String> = resume_skills.intersection(job_skills).cloned().collect();
    let missing: BTreeSet<String> = job_skills.difference(resume_skills).cloned().collect();

    let skill_pct = if job_skills.is_empty() {
        0.0
    } else {
        matched.len() as f64 / job_skills.len() as f64 * 100.0
    };

    MatchDelta {
        match_score: blend_score(similarity, skill_pct),
        strengths: matched.iter().take(TOP_N).cloned().collect(),
        weaknesses: missing.iter().take(TOP_N).cloned().collect(),
        matched_skills: matched,
        missing_skills: missing,
    }
}

/// `0.6 × similarity + 0.4 × skillPct`, clamped to `[0, 100]` and rounded to
/// two decimal places.
pub fn blend_score(similarity: f64, skill_pct: f64) -> f64 {
    let blended = SIMILARITY_WEIGHT * similarity + SKILL_WEIGHT * skill_pct;
    (blended.clamp(0.0, 100.0) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn matched_is_intersection_and_missing_is_difference() {
        let delta = compute_match(
            80.0,
            &set(&["python", "aws", "docker"]),
            &set(&["python", "java", "aws", "kubernetes"]),
        );

        assert_eq!(delta.matched_skills, set(&["aws", "python"]));
        assert_eq!(delta.missing_skills, set(&["java", "kubernetes"]));
        assert!(delta
            .missing_skills
            .intersection(&delta.matched_skills)
            .next()
            .is_none());
    }

    #[test]
    fn reference_scenario_scores_68() {
        // resume {python, aws, docker} vs job {python, java, aws, kubernetes},
        // similarity 80 → skillPct 50 → 0.6·80 + 0.4·50 = 68.00
        let delta = compute_match(
            80.0,
            &set(&["python", "aws", "docker"]),
            &set(&["python", "java", "aws", "kubernetes"]),
        );
        assert_eq!(delta.match_score, 68.0);
    }

    #[test]
    fn empty_job_skills_means_zero_skill_pct() {
        let delta = compute_match(70.0, &set(&["python", "rust"]), &set(&[]));
        assert_eq!(delta.match_score, 42.0); // 0.6 · 70
        assert!(delta.matched_skills.is_empty());
        assert!(delta.missing_skills.is_empty());
    }

    #[test]
    fn superset_resume_means_full_skill_pct() {
        let delta = compute_match(50.0, &set(&["a", "b", "c"]), &set(&["a", "b"]));
        // skillPct 100 → 0.6·50 + 0.4·100 = 70
        assert_eq!(delta.match_score, 70.0);
    }

    #[test]
    fn blend_is_clamped_to_0_100() {
        assert_eq!(blend_score(150.0, 150.0), 100.0);
        assert_eq!(blend_score(-10.0, -10.0), 0.0);
    }

    #[test]
    fn blend_rounds_to_two_decimals() {
        // 0.6·33.333 + 0.4·10 = 23.9998 → 24.00
        assert_eq!(blend_score(33.333, 10.0), 24.0);
        // 0.6·55.55 + 0.4·44.44 = 51.106 → 51.11
        assert_eq!(blend_score(55.55, 44.44), 51.11);
    }

    #[test]
    fn strengths_and_weaknesses_are_sorted_and_bounded() {
        let many: Vec<String> = (0..15).map(|i| format!("skill{i:02}")).collect();
        let job: BTreeSet<String> = many.iter().cloned().collect();
        let delta = compute_match(0.0, &set(&[]), &job);

        assert_eq!(delta.weaknesses.len(), TOP_N);
        let mut sorted = delta.weaknesses.clone();
        sorted.sort();
        assert_eq!(delta.weaknesses, sorted);
        assert_eq!(delta.weaknesses[0], "skill00");
    }

    #[test]
    fn identical_inputs_produce_identical_deltas() {
        let resume = set(&["python", "go", "aws"]);
        let job = set(&["python", "terraform"]);
        let a = compute_match(64.2, &resume, &job);
        let b = compute_match(64.2, &resume, &job);
        assert_eq!(a, b);
    }
}
