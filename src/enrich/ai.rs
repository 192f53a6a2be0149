//! Client for the external AI structuring capability
//!
//! Talks to an OpenAI-style chat-completions endpoint. Failures are
//! classified so callers can fall back: missing/rejected credential,
//! quota exhaustion, or a response that cannot be interpreted.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, trace};

use super::StructuredContent;
use crate::kb::FaqEntry;

/// Default chat-completions endpoint
const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model for structuring and classification
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are a helpful assistant that analyzes web content and \
    creates structured knowledge base entries for chatbots. \
    Always respond with valid JSON format.";

/// Error type for AI structuring calls
#[derive(Debug, Error)]
pub enum AiError {
    /// Missing or rejected credential
    #[error("AI capability unavailable: {0}")]
    Unavailable(String),

    /// Request quota exhausted
    #[error("AI quota exhausted: {0}")]
    Quota(String),

    /// Response could not be interpreted
    #[error("Malformed AI response: {0}")]
    Malformed(String),

    /// Transport failure
    #[error("AI HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<AiError> for crate::error::Error {
    fn from(err: AiError) -> Self {
        crate::error::Error::Enrich(err.to_string())
    }
}

/// Configuration for the AI structuring client
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Chat-completions endpoint URL
    pub api_url: String,

    /// Model name
    pub model: String,

    /// Token budget per completion
    pub max_tokens: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1000,
            timeout_secs: 60,
        }
    }
}

/// Client for AI-backed structuring and classification
#[derive(Debug, Clone)]
pub struct AiStructurer {
    client: reqwest::Client,
    config: AiConfig,
    api_key: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// Wire shape of the structuring reply; every field optional so a
/// partially valid reply still parses
#[derive(Deserialize)]
struct StructuredWire {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    faqs: Vec<FaqWire>,
}

#[derive(Deserialize)]
struct FaqWire {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
}

impl AiStructurer {
    /// Create a client; fails with [`AiError::Unavailable`] when the
    /// credential is empty
    pub fn new(api_key: impl Into<String>, config: AiConfig) -> Result<Self, AiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AiError::Unavailable("missing API credential".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Request FAQ pairs, summary, and keywords for page text
    pub async fn structure(&self, text: &str) -> Result<StructuredContent, AiError> {
        debug!("Requesting structuring for {} chars", text.len());

        let prompt = format!(
            "Analyze the following web page content and create a structured knowledge \
             base entry for an automated chatbot.\n\n\
             Content:\n{}\n\n\
             Respond with a JSON object of this shape:\n\
             {{\"summary\": \"2-3 sentence summary\", \
             \"keywords\": [\"keyword1\", \"keyword2\"], \
             \"faqs\": [{{\"question\": \"...\", \"answer\": \"...\"}}]}}\n\n\
             All answers must be directly derived from the provided content. \
             Return only valid JSON, no additional text or formatting.",
            text
        );

        let raw = self.complete(&prompt).await?;
        let json_text = extract_json(&raw)
            .ok_or_else(|| AiError::Malformed(format!("no JSON object in reply: {}", raw)))?;
        let wire: StructuredWire = serde_json::from_str(json_text)
            .map_err(|e| AiError::Malformed(format!("bad structuring JSON: {}", e)))?;

        Ok(StructuredContent {
            summary: wire.summary,
            keywords: wire.keywords,
            faqs: wire
                .faqs
                .into_iter()
                .map(|f| FaqEntry {
                    question: f.question,
                    answer: f.answer,
                })
                .collect(),
        })
    }

    /// Ask the model to pick one category label for a Q&A pair
    ///
    /// Returns the raw lowercase label; validation against the fixed
    /// category set is the caller's concern.
    pub async fn classify_category(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<String, AiError> {
        let prompt = format!(
            "Classify this question and answer pair into one of these categories:\n\
             - services: what services/products are offered\n\
             - pricing: costs, prices, fees\n\
             - contact: how to contact, location, hours\n\
             - support: help, troubleshooting, technical issues\n\
             - policies: terms, conditions, policies, procedures\n\
             - general: anything else\n\n\
             Question: {}\n\
             Answer: {}\n\n\
             Return only the category name.",
            question, answer
        );

        let raw = self.complete(&prompt).await?;
        Ok(raw.trim().trim_matches('"').to_lowercase())
    }

    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt},
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": 0.3,
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(AiError::Quota(format!("status {}", status)));
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AiError::Unavailable(format!(
                    "credential rejected with status {}",
                    status
                )));
            }
            s if !s.is_success() => {
                return Err(AiError::Malformed(format!("status {}", status)));
            }
            _ => {}
        }

        let text = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| AiError::Malformed(format!("bad completion envelope: {}", e)))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AiError::Malformed("empty choices".to_string()))?;

        trace!("Completion reply of {} chars", content.len());
        Ok(content)
    }
}

/// Locate the JSON object in a model reply, tolerating markdown fences
fn extract_json(text: &str) -> Option<&str> {
    if let Some(fence_start) = text.find("```json") {
        let rest = &text[fence_start + 7..];
        if let Some(fence_end) = rest.find("```") {
            return Some(rest[..fence_end].trim());
        }
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end >= start).then(|| &text[start..=end])
}
