//! Document text extraction — the file-reading collaborator.
//!
//! The pipeline only ever sees plain text; how it comes out of an uploaded
//! file is this module's problem. PDF is handled in-process via `pdf-extract`.
//! DOCX is delegated to an external converter service, the same way CV
//! uploads are converted elsewhere in our stack. Anything else is rejected
//! as `UnsupportedFormat` before the pipeline starts.

pub mod skills;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file format '{0}' — only PDF and DOCX are accepted")]
    UnsupportedFormat(String),

    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("DOCX extraction service is not configured")]
    ConverterUnavailable,

    #[error("DOCX conversion failed: {0}")]
    Converter(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// File-to-text collaborator. Stubbed in tests with fixed text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, data: &[u8], filename: &str) -> Result<String, ExtractError>;
}

/// Returns the lowercase extension of `filename`, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    filename.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

/// Whether the upload boundary should accept this filename at all.
pub fn is_supported(filename: &str) -> bool {
    matches!(file_extension(filename).as_deref(), Some("pdf") | Some("docx"))
}

#[derive(Debug, Deserialize)]
struct ConverterResponse {
    text: String,
}

/// Production extractor: PDF in-process, DOCX via the converter service.
pub struct DocumentExtractor {
    http: Client,
    converter_url: Option<String>,
}

impl DocumentExtractor {
    pub fn new(converter_url: Option<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            converter_url,
        }
    }

    async fn convert_docx(&self, data: &[u8]) -> Result<String, ExtractError> {
        let base = self
            .converter_url
            .as_deref()
            .ok_or(ExtractError::ConverterUnavailable)?;

        let response = self
            .http
            .post(format!("{base}/extract"))
            .header(
                "content-type",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            )
            .body(data.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExtractError::Converter(format!("status {status}: {message}")));
        }

        let decoded: ConverterResponse = response.json().await?;
        Ok(decoded.text)
    }
}

#[async_trait]
impl TextExtractor for DocumentExtractor {
    async fn extract_text(&self, data: &[u8], filename: &str) -> Result<String, ExtractError> {
        match file_extension(filename).as_deref() {
            Some("pdf") => {
                // pdf-extract is CPU-bound and synchronous; keep it off the runtime.
                let owned = data.to_vec();
                tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&owned))
                    .await
                    .map_err(|e| ExtractError::Pdf(format!("extraction task failed: {e}")))?
                    .map_err(|e| ExtractError::Pdf(e.to_string()))
            }
            Some("docx") => self.convert_docx(data).await,
            _ => Err(ExtractError::UnsupportedFormat(filename.to_string())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resume section splitting
// ────────────────────────────────────────────────────────────────────────────

const SECTION_HEADERS: &[(&str, &[&str])] = &[
    ("summary", &["summary", "objective", "profile"]),
    ("experience", &["experience", "work history", "employment"]),
    ("education", &["education", "academic"]),
    ("skills", &["skills", "technical skills", "competencies"]),
    ("certifications", &["certifications", "certificates"]),
    ("projects", &["projects", "portfolio"]),
];

/// Splits resume text into a section-name → body map.
///
/// A line is treated as a section header when it is short and starts with a
/// known header keyword. Text before the first recognized header lands under
/// `"header"`. The map is ordered so downstream output is stable.
pub fn split_sections(text: &str) -> BTreeMap<String, String> {
    let mut sections: BTreeMap<String, String> = BTreeMap::new();
    let mut current = "header".to_string();

    for line in text.lines() {
        if let Some(name) = header_name(line) {
            current = name.to_string();
            continue;
        }
        let body = sections.entry(current.clone()).or_default();
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(line);
    }

    // Drop whitespace-only sections.
    sections.retain(|_, body| !body.trim().is_empty());
    sections
}

fn header_name(line: &str) -> Option<&'static str> {
    let lowered = line.trim().trim_end_matches(':').to_lowercase();
    if lowered.is_empty() || lowered.len() > 40 {
        return None;
    }
    SECTION_HEADERS
        .iter()
        .find(|(_, keywords)| {
            keywords.iter().any(|k| {
                lowered == *k
                    || lowered
                        .strip_prefix(k)
                        .is_some_and(|rest| rest.starts_with([' ', ':', '-']))
            })
        })
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_detection_is_case_insensitive() {
        assert_eq!(file_extension("Resume.PDF").as_deref(), Some("pdf"));
        assert_eq!(file_extension("cv.docx").as_deref(), Some("docx"));
        assert_eq!(file_extension("noext"), None);
    }

    #[test]
    fn supported_formats_are_pdf_and_docx_only() {
        assert!(is_supported("a.pdf"));
        assert!(is_supported("a.docx"));
        assert!(!is_supported("a.txt"));
        assert!(!is_supported("a"));
    }

    #[tokio::test]
    async fn unknown_extension_is_rejected() {
        let extractor = DocumentExtractor::new(None);
        let result = extractor.extract_text(b"hello", "resume.txt").await;
        assert!(matches!(result, Err(ExtractError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn docx_without_converter_is_an_error() {
        let extractor = DocumentExtractor::new(None);
        let result = extractor.extract_text(b"PK...", "resume.docx").await;
        assert!(matches!(result, Err(ExtractError::ConverterUnavailable)));
    }

    #[test]
    fn sections_split_on_known_headers() {
        let text = "Jane Doe\njane@example.com\n\nSummary\nSeasoned engineer.\n\nExperience\nAcme Corp - built things.\n\nSkills:\nPython, AWS";
        let sections = split_sections(text);

        assert!(sections.get("header").unwrap().contains("Jane Doe"));
        assert_eq!(sections.get("summary").unwrap().trim(), "Seasoned engineer.");
        assert!(sections.get("experience").unwrap().contains("Acme Corp"));
        assert!(sections.get("skills").unwrap().contains("Python"));
    }

    #[test]
    fn long_lines_are_not_mistaken_for_headers() {
        let text = "Experienced engineer with a decade of professional work across many skills and domains";
        let sections = split_sections(text);
        assert!(sections.contains_key("header"));
        assert!(!sections.contains_key("experience"));
    }
}
