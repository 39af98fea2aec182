//! Company research collaborator — best-effort web search and scrape.
//!
//! Feeds exactly one enhancement stage (the investigator). Any failure here
//! is absorbed by that stage; nothing in the pipeline depends on it.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";
const MAX_RESULTS: usize = 6;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search returned status {0}")]
    Status(u16),

    #[error("could not parse search results: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanySearchResult {
    pub hits: Vec<SearchHit>,
}

#[async_trait]
pub trait CompanySearch: Send + Sync {
    async fn company_info(&self, company: &str) -> Result<CompanySearchResult, ScrapeError>;
}

pub struct WebScraper {
    http: Client,
}

impl WebScraper {
    pub fn new() -> Self {
        Self {
            http: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for WebScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompanySearch for WebScraper {
    async fn company_info(&self, company: &str) -> Result<CompanySearchResult, ScrapeError> {
        let query = format!("{company} engineering blog tech stack");
        let response = self
            .http
            .get(SEARCH_URL)
            .query(&[("q", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let hits = parse_search_results(&body)?;
        debug!("company search for '{company}': {} hits", hits.len());

        Ok(CompanySearchResult { hits })
    }
}

/// Pulls result links and snippets out of the DuckDuckGo HTML page.
/// Parsing stays synchronous — `scraper`'s DOM types are not `Send`.
fn parse_search_results(body: &str) -> Result<Vec<SearchHit>, ScrapeError> {
    let link_selector =
        Selector::parse("a.result__a").map_err(|e| ScrapeError::Parse(e.to_string()))?;
    let snippet_selector =
        Selector::parse(".result__snippet").map_err(|e| ScrapeError::Parse(e.to_string()))?;

    let document = Html::parse_document(body);

    let snippets: Vec<String> = document
        .select(&snippet_selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .collect();

    let hits = document
        .select(&link_selector)
        .enumerate()
        .take(MAX_RESULTS)
        .map(|(i, el)| SearchHit {
            title: el.text().collect::<String>().trim().to_string(),
            url: el.value().attr("href").unwrap_or_default().to_string(),
            snippet: snippets.get(i).cloned().unwrap_or_default(),
        })
        .filter(|hit| !hit.url.is_empty())
        .collect();

    Ok(hits)
}
