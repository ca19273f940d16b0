//! Thin proxy to an external generative-AI text service.
//!
//! The upstream is treated as an opaque request/response text generator;
//! prompts and input thresholds live here, everything else (routing, model
//! internals) is the provider's concern.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AiConfig;
use crate::error::{ErrorCode, QuillError, Result};

/// Minimum keyword count for title generation.
const MIN_TITLE_KEYWORDS: usize = 3;
/// Minimum content length for enhancement.
const MIN_ENHANCE_LEN: usize = 50;
/// Minimum content length for summarization.
const MIN_SUMMARIZE_LEN: usize = 100;

// ═══════════════════════════════════════════════════════════════════════════════
// Wire Types
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Client
// ═══════════════════════════════════════════════════════════════════════════════

/// HTTP client for the generative-AI upstream.
#[derive(Clone)]
pub struct AiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl AiClient {
    pub fn new(config: &AiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(QuillError::from)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Generate catchy blog titles from a keyword list.
    pub async fn generate_title(&self, keywords: &[String]) -> Result<String> {
        if keywords.len() < MIN_TITLE_KEYWORDS {
            return Err(QuillError::validation(
                "At least 3 keywords are required",
            ));
        }

        let prompt = format!(
            "provide json of an array of catchy blog titles using the following \
             keywords without giving extra information and prefixes: {}",
            keywords.join(", ")
        );
        self.generate(&prompt).await
    }

    /// Rewrite blog content for engagement and readability.
    pub async fn enhance_content(&self, content: &str) -> Result<String> {
        if content.len() < MIN_ENHANCE_LEN {
            return Err(QuillError::validation(
                "Content must be at least 50 characters long",
            ));
        }

        let prompt = format!(
            "Improve and refine the following blog content, making it more engaging \
             and readable and don't give any prefixes or conclusions only to the \
             point answer:\n\n{}",
            content
        );
        self.generate(&prompt).await
    }

    /// Summarize blog content.
    pub async fn summarize(&self, content: &str) -> Result<String> {
        if content.len() < MIN_SUMMARIZE_LEN {
            return Err(QuillError::validation(
                "Content must be at least 100 characters long for summarization",
            ));
        }

        let prompt = format!(
            "Summarize the following blog content in a concise and clear way without \
             any prefixes and conclusions:\n\n{}",
            content
        );
        self.generate(&prompt).await
    }

    /// Send one prompt upstream and return the first candidate's text.
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            QuillError::new(
                ErrorCode::MissingConfiguration,
                "Generative-AI API key is not configured",
            )
        })?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: GenerateResponse = response.json().await?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                QuillError::new(
                    ErrorCode::AiApiError,
                    "External service returned an empty response",
                )
            })
    }
}
