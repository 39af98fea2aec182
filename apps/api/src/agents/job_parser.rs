//! Job description parsing stage.
//!
//! Primary path is a schema-validated LLM parse. When that fails the stage
//! degrades to heuristics — regex title extraction, position-type keyword
//! scan, bullet-line requirements — rather than failing the pipeline, since
//! the matcher only strictly needs the JD text and skill set, and dictionary
//! skill extraction never fails.

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;

use crate::agents::{clip_chars, prompts};
use crate::extract::skills::{extract_skills, normalize_skills};
use crate::llm::complete_json;
use crate::pipeline::stage::{StageError, StageResult};
use crate::pipeline::state::{AnalysisInput, AnalysisState};
use crate::pipeline::PipelineDeps;

const PROMPT_TEXT_LIMIT: usize = 6000;
const MAX_REQUIREMENTS: usize = 8;

#[derive(Debug, Deserialize)]
struct JobLlmOutput {
    job_title: String,
    #[serde(default)]
    position_type: String,
    #[serde(default)]
    required_skills: Vec<String>,
    #[serde(default)]
    required_experience: String,
    #[serde(default)]
    key_requirements: Vec<String>,
    #[serde(default)]
    nice_to_have: Vec<String>,
}

/// Delta produced by this stage — exactly the job-side parse fields.
#[derive(Debug)]
pub struct ParsedJob {
    pub job_title: String,
    pub position_type: String,
    pub requirements: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub skills: BTreeSet<String>,
    pub experience_required: String,
    pub summary: String,
    pub degraded: bool,
}

impl ParsedJob {
    pub fn apply(self, state: &mut AnalysisState) {
        state.job_title = self.job_title;
        state.position_type = self.position_type;
        state.job_requirements = self.requirements;
        state.nice_to_have = self.nice_to_have;
        state.job_skills = self.skills;
        state.job_experience_required = self.experience_required;
    }
}

pub async fn run(input: &AnalysisInput, deps: &PipelineDeps) -> StageResult<ParsedJob> {
    let jd_text = input.job_description.trim();
    if jd_text.is_empty() {
        return Err(StageError::Fatal(
            "Job parsing failed: job description text is empty".to_string(),
        ));
    }

    // Dictionary skills are the floor; the LLM can only add to them.
    let mut skills = extract_skills(jd_text);

    let prompt = prompts::JOB_PARSE_PROMPT_TEMPLATE
        .replace("{jd_text}", clip_chars(jd_text, PROMPT_TEXT_LIMIT));

    match complete_json::<JobLlmOutput>(deps.llm.as_ref(), prompts::JOB_PARSE_SYSTEM, &prompt).await
    {
        Ok(output) => {
            skills.extend(normalize_skills(output.required_skills));
            let job_title = if output.job_title.trim().is_empty() {
                extract_job_title(jd_text).unwrap_or_else(|| "Unknown".to_string())
            } else {
                output.job_title.trim().to_string()
            };
            Ok(ParsedJob {
                summary: format!("Job parsed: '{job_title}', {} required skills", skills.len()),
                job_title,
                position_type: normalize_position_type(&output.position_type),
                requirements: output.key_requirements,
                nice_to_have: output.nice_to_have,
                skills,
                experience_required: output.required_experience,
                degraded: false,
            })
        }
        Err(e) => {
            let job_title = extract_job_title(jd_text).unwrap_or_else(|| "Unknown".to_string());
            Ok(ParsedJob {
                summary: format!("Job parsed heuristically ('{job_title}'); structured parse unavailable: {e}"),
                job_title,
                position_type: detect_position_type(jd_text),
                requirements: bullet_lines(jd_text),
                nice_to_have: Vec::new(),
                skills,
                experience_required: detect_experience(jd_text).unwrap_or_default(),
                degraded: true,
            })
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Heuristic fallbacks
// ────────────────────────────────────────────────────────────────────────────

const COMMON_TITLES: &[&str] = &[
    "Staff Software Engineer",
    "Senior Software Engineer",
    "Machine Learning Engineer",
    "Site Reliability Engineer",
    "Full Stack Engineer",
    "Software Engineer",
    "Data Scientist",
    "Data Engineer",
    "Backend Engineer",
    "Frontend Engineer",
    "DevOps Engineer",
    "Platform Engineer",
    "Infrastructure Engineer",
    "Cloud Engineer",
    "Engineering Manager",
    "Product Manager",
];

/// Extracts a job title from raw JD text.
///
/// Tries explicit label lines first ("Position:", "Role:"), then hiring
/// phrasings, then a scan for well-known titles. Returns `None` when nothing
/// plausible is found.
pub fn extract_job_title(text: &str) -> Option<String> {
    let label = Regex::new(r"(?im)^(?:position|role|job title|title)\s*[:\-]\s*(.+)$")
        .expect("static title pattern");
    if let Some(caps) = label.captures(text) {
        let title = tidy_title(&caps[1]);
        if (3..=80).contains(&title.len()) {
            return Some(title);
        }
    }

    let hiring = Regex::new(
        r"(?:hiring|looking for|seeking)\s+(?:a\s|an\s)?([A-Z][A-Za-z+#/ ]{2,60}?(?:Engineer|Developer|Scientist|Analyst|Manager|Lead|Architect))",
    )
    .expect("static hiring pattern");
    if let Some(caps) = hiring.captures(text) {
        return Some(tidy_title(&caps[1]));
    }

    let join_as = Regex::new(
        r"join\s+.{0,60}?\s+as\s+(?:a\s|an\s)?([A-Z][A-Za-z+#/ ]{2,60}?(?:Engineer|Developer|Scientist|Analyst|Manager|Lead))",
    )
    .expect("static join-as pattern");
    if let Some(caps) = join_as.captures(text) {
        return Some(tidy_title(&caps[1]));
    }

    COMMON_TITLES
        .iter()
        .find(|title| text.contains(*title))
        .map(|title| title.to_string())
}

fn tidy_title(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', ',', ';', ':'])
        .to_string()
}

fn detect_position_type(text: &str) -> String {
    let lowered = text.to_lowercase();
    if lowered.contains("intern") {
        "Internship".to_string()
    } else if lowered.contains("part-time") || lowered.contains("part time") {
        "Part-time".to_string()
    } else if lowered.contains("contract") {
        "Contract".to_string()
    } else if lowered.contains("full-time") || lowered.contains("full time") {
        "Full-time".to_string()
    } else {
        "Unknown".to_string()
    }
}

fn normalize_position_type(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        "Unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

fn detect_experience(text: &str) -> Option<String> {
    let years = Regex::new(r"(?i)(\d{1,2}\s*\+?\s*(?:years?|yrs?))").expect("static years pattern");
    years.captures(text).map(|caps| caps[1].trim().to_string())
}

fn bullet_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            trimmed
                .strip_prefix(['-', '*', '•'])
                .map(|rest| rest.trim().to_string())
        })
        .filter(|line| !line.is_empty())
        .take(MAX_REQUIREMENTS)
        .collect()
}
