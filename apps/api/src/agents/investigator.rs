//! Company research enhancement stage.
//!
//! The only gated stage: it is scheduled when a company name is resolvable —
//! either supplied with the request or recognizable in the JD text — and
//! otherwise never runs, leaving the company-intel fields untouched.
//!
//! Intel is cached for a day per company, since it changes slowly and the
//! search + synthesis path is by far the most expensive stage.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use crate::agents::{join_top, prompts};
use crate::cache::{company_intel_key, COMPANY_INTEL_TTL};
use crate::llm::complete_json;
use crate::pipeline::stage::{Enhanced, EnhancementOutput, Enhancer, StageResult};
use crate::pipeline::state::{AnalysisState, CompanyIntel};
use crate::pipeline::PipelineDeps;
use crate::scraper::SearchHit;

const MAX_SOURCES: usize = 3;
const MAX_SNIPPET_CHARS: usize = 300;

#[derive(Debug, Deserialize)]
struct IntelLlmOutput {
    #[serde(default)]
    recent_tech: Vec<String>,
    #[serde(default)]
    talking_points: Vec<String>,
    #[serde(default)]
    culture_notes: String,
}

pub struct Investigator;

/// Company name for this request, if one can be found.
pub fn resolve_company(state: &AnalysisState) -> Option<String> {
    if let Some(name) = &state.input.company_name {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    extract_company_name(&state.input.job_description)
}

/// Pulls a company name out of JD prose ("at Acme", "Acme is hiring",
/// "About Acme"). Conservative: a miss just means the stage is skipped.
fn extract_company_name(text: &str) -> Option<String> {
    let patterns = [
        r"(?:at|@)\s+([A-Z][A-Za-z0-9& ]{1,40}?)(?:\s+is|\s+we|\.|,)",
        r"([A-Z][A-Za-z0-9]{1,30})\s+is\s+(?:looking|hiring|seeking)",
        r"About\s+([A-Z][A-Za-z0-9& ]{1,40}?)(?:\n|:)",
    ];

    for pattern in patterns {
        let re = Regex::new(pattern).expect("static company pattern");
        if let Some(caps) = re.captures(text) {
            let name = caps[1].trim().to_string();
            if name.len() >= 2 {
                return Some(name);
            }
        }
    }
    None
}

fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No search results available.".to_string();
    }
    hits.iter()
        .map(|hit| {
            let snippet = crate::agents::clip_chars(&hit.snippet, MAX_SNIPPET_CHARS);
            format!("- {} ({})\n  {}", hit.title, hit.url, snippet)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Enhancer for Investigator {
    fn name(&self) -> &'static str {
        "investigator"
    }

    fn applies(&self, state: &AnalysisState) -> bool {
        resolve_company(state).is_some()
    }

    async fn enhance(&self, state: &AnalysisState, deps: &PipelineDeps) -> StageResult<Enhanced> {
        let Some(company) = resolve_company(state) else {
            // Should be unreachable behind applies(); degrade, don't guess.
            return Ok(Enhanced::degraded(
                self.fallback(state),
                "Investigator could not resolve a company name".to_string(),
            ));
        };

        let cache_key = company_intel_key(&company);
        if let Some(cached) = deps.cache.get_json::<CompanyIntel>(&cache_key).await {
            return Ok(Enhanced::ok(
                EnhancementOutput::CompanyIntel(cached),
                format!("Company intel loaded from cache for {company}"),
            ));
        }

        // Search is best-effort: with zero hits the LLM still gets a chance
        // to produce generic-but-labeled intel from the company name alone.
        let hits = match deps.search.company_info(&company).await {
            Ok(result) => result.hits,
            Err(e) => {
                tracing::warn!("Company search failed for {company}: {e}");
                Vec::new()
            }
        };

        let prompt = prompts::INVESTIGATOR_PROMPT_TEMPLATE
            .replace("{company_name}", &company)
            .replace("{search_results}", &format_hits(&hits))
            .replace("{job_skills}", &join_top(&state.job_skills, 10))
            .replace("{resume_skills}", &join_top(&state.resume_skills, 10));

        match complete_json::<IntelLlmOutput>(
            deps.llm.as_ref(),
            prompts::INVESTIGATOR_SYSTEM,
            &prompt,
        )
        .await
        {
            Ok(output) => {
                let intel = CompanyIntel {
                    company_name: company.clone(),
                    recent_tech: output.recent_tech,
                    talking_points: output.talking_points,
                    culture_notes: output.culture_notes,
                    sources: hits.iter().take(MAX_SOURCES).map(|h| h.url.clone()).collect(),
                };

                deps.cache
                    .set_json(&cache_key, &intel, COMPANY_INTEL_TTL)
                    .await;

                Ok(Enhanced::ok(
                    EnhancementOutput::CompanyIntel(intel),
                    format!("Company intel gathered for {company}"),
                ))
            }
            Err(e) => Ok(Enhanced::degraded(
                self.fallback(state),
                format!("Investigator error: {e}"),
            )),
        }
    }

    fn fallback(&self, state: &AnalysisState) -> EnhancementOutput {
        EnhancementOutput::CompanyIntel(CompanyIntel {
            company_name: resolve_company(state).unwrap_or_else(|| "Unknown".to_string()),
            recent_tech: Vec::new(),
            talking_points: vec!["Research the company website before the interview".to_string()],
            culture_notes: "Unable to gather company intel".to_string(),
            sources: Vec::new(),
        })
    }
}
