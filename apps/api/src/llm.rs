//! Reasoning-service collaborator — the single entry point for all LLM calls.
//!
//! Every stage that talks to the model goes through the [`Reasoner`] trait so
//! the pipeline can be exercised with deterministic stubs. The production
//! implementation wraps the Anthropic Messages API with retry on 429/5xx.
//!
//! Model output is never executed or free-text-scraped: structured stages
//! decode it as JSON via [`complete_json`] and fall back to their defaults
//! when decoding fails.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("LLM returned empty completion")]
    EmptyCompletion,

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}

/// Abstraction over the external reasoning service.
///
/// `complete` returns the raw completion text for a (system, prompt) pair.
/// Stage code should prefer [`complete_json`] for schema-validated output.
#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Calls the reasoner and decodes the completion as JSON into `T`.
///
/// Markdown code fences are stripped first, since models occasionally wrap
/// JSON in them despite instructions. A decode failure is an `LlmError` the
/// calling stage treats like any other collaborator failure.
pub async fn complete_json<T: DeserializeOwned>(
    reasoner: &dyn Reasoner,
    system: &str,
    prompt: &str,
) -> Result<T, LlmError> {
    let raw = reasoner.complete(system, prompt).await?;
    let body = strip_code_fences(&raw);
    if body.is_empty() {
        return Err(LlmError::EmptyCompletion);
    }
    serde_json::from_str(body).map_err(LlmError::Decode)
}

/// Removes a surrounding ``` or ```json fence, if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag (e.g. "json") up to the first newline.
    let body = match rest.split_once('\n') {
        Some((_tag, body)) => body,
        None => rest,
    };
    body.trim().trim_end_matches("```").trim()
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic Messages API client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Production [`Reasoner`] backed by the Anthropic Messages API.
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string())
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Reasoner for LlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let mut last = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!("LLM attempt {attempt}/{MAX_ATTEMPTS} after failure, backing off {delay:?}");
                tokio::time::sleep(delay).await;
            }

            let sent = self
                .http
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await;

            let response = match sent {
                Ok(r) => r,
                Err(e) => {
                    last = e.to_string();
                    continue;
                }
            };

            let status = response.status();

            // Retry rate limits and server-side failures; everything else is final.
            if status.as_u16() == 429 || status.is_server_error() {
                last = response.text().await.unwrap_or_default();
                warn!("LLM API returned {status}: {last}");
                continue;
            }

            if !status.is_success() {
                let raw = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&raw)
                    .map(|e| e.error.message)
                    .unwrap_or(raw);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let decoded: MessagesResponse = response.json().await?;
            debug!(
                "LLM call ok: input_tokens={}, output_tokens={}",
                decoded.usage.input_tokens, decoded.usage.output_tokens
            );

            return decoded
                .content
                .iter()
                .find(|b| b.block_type == "text")
                .and_then(|b| b.text.clone())
                .ok_or(LlmError::EmptyCompletion);
        }

        Err(LlmError::Exhausted {
            attempts: MAX_ATTEMPTS,
            last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedReasoner(&'static str);

    #[async_trait]
    impl Reasoner for CannedReasoner {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn strip_fences_with_language_tag() {
        let input = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(input), "{\"a\": 1}");
    }

    #[test]
    fn strip_fences_without_language_tag() {
        let input = "```\n[1, 2]\n```";
        assert_eq!(strip_code_fences(input), "[1, 2]");
    }

    #[test]
    fn strip_fences_passthrough_for_plain_json() {
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[tokio::test]
    async fn complete_json_decodes_fenced_object() {
        #[derive(Deserialize)]
        struct Out {
            a: u32,
        }
        let reasoner = CannedReasoner("```json\n{\"a\": 7}\n```");
        let out: Out = complete_json(&reasoner, "sys", "prompt").await.unwrap();
        assert_eq!(out.a, 7);
    }

    #[tokio::test]
    async fn complete_json_surfaces_decode_failure() {
        #[derive(Deserialize)]
        struct Out {
            #[allow(dead_code)]
            a: u32,
        }
        let reasoner = CannedReasoner("I am not JSON, sorry.");
        let result: Result<Out, _> = complete_json(&reasoner, "sys", "prompt").await;
        assert!(matches!(result, Err(LlmError::Decode(_))));
    }

    #[tokio::test]
    async fn complete_json_rejects_empty_completion() {
        #[derive(Deserialize)]
        struct Out {
            #[allow(dead_code)]
            a: u32,
        }
        let reasoner = CannedReasoner("``````");
        let result: Result<Out, _> = complete_json(&reasoner, "sys", "prompt").await;
        assert!(matches!(result, Err(LlmError::EmptyCompletion)));
    }
}
