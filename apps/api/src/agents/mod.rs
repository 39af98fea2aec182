//! Stage bodies for the analysis pipeline.
//!
//! Parse and match stages return typed deltas the orchestrator applies;
//! enhancement stages implement [`crate::pipeline::stage::Enhancer`] and are
//! scheduled by the fan-out coordinator.

pub mod ats_career;
pub mod interview_prep;
pub mod investigator;
pub mod job_parser;
pub mod matcher;
pub mod prompts;
pub mod report;
pub mod resume_coach;
pub mod resume_parser;

use std::collections::BTreeSet;

/// Truncates on a char boundary; prompts cap how much raw text they carry.
pub(crate) fn clip_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Comma-joins the first `n` entries of a sorted skill set for prompt use.
pub(crate) fn join_top(set: &BTreeSet<String>, n: usize) -> String {
    set.iter()
        .take(n)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}
