//! Content enrichment: AI structuring with a deterministic fallback
//!
//! Given a normalized page, produces FAQ pairs, a summary, and keywords.
//! Two strategies share the same output shape so the assembler never
//! knows which one ran: an AI-backed structurer and a heuristic
//! extractor. AI enrichment is best-effort; any failure falls back to
//! the heuristic instead of propagating.

mod ai;
mod heuristic;

pub use ai::{AiConfig, AiError, AiStructurer};
pub use heuristic::heuristic_enrich;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::crawler::ExtractedPage;
use crate::kb::FaqEntry;

/// Which strategy produced a page's enrichment fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichMethod {
    /// External AI structuring capability
    Ai,
    /// Deterministic heuristic extractor
    Heuristic,
}

impl std::fmt::Display for EnrichMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrichMethod::Ai => f.write_str("ai"),
            EnrichMethod::Heuristic => f.write_str("heuristic"),
        }
    }
}

/// Structured content produced by either strategy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredContent {
    /// Short summary of the page
    pub summary: Option<String>,

    /// Derived keywords
    pub keywords: Vec<String>,

    /// FAQ pairs; question and answer are always non-empty
    pub faqs: Vec<FaqEntry>,
}

/// Options shared by both enrichment strategies
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Maximum summary length in characters
    pub summary_length: usize,

    /// Maximum number of keywords to derive
    pub max_keywords: usize,

    /// Body text sent to the AI capability is truncated to this length
    pub max_content_length: usize,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            summary_length: 500,
            max_keywords: 10,
            max_content_length: 5000,
        }
    }
}

/// Enriches pages with the configured strategy
#[derive(Debug)]
pub struct Enricher {
    ai: Option<AiStructurer>,
    options: EnrichOptions,
}

impl Enricher {
    /// Heuristic-only enricher
    pub fn heuristic(options: EnrichOptions) -> Self {
        Self { ai: None, options }
    }

    /// AI-backed enricher with heuristic fallback
    pub fn with_ai(ai: AiStructurer, options: EnrichOptions) -> Self {
        Self {
            ai: Some(ai),
            options,
        }
    }

    /// Derive FAQ pairs, summary, and keywords for a page
    ///
    /// Never fails: any AI error (credential, quota, malformed response,
    /// transport) degrades to the heuristic strategy.
    pub async fn enrich(&self, page: &ExtractedPage) -> (StructuredContent, EnrichMethod) {
        if let Some(ai) = &self.ai {
            let input = compose_ai_input(page, self.options.max_content_length);
            match ai.structure(&input).await {
                Ok(content) => {
                    debug!("AI structuring succeeded for {}", page.url);
                    return (sanitize(content), EnrichMethod::Ai);
                }
                Err(e) => {
                    warn!(
                        "AI structuring failed for {} ({}); falling back to heuristic",
                        page.url, e
                    );
                }
            }
        }

        (
            heuristic_enrich(page, &self.options),
            EnrichMethod::Heuristic,
        )
    }
}

/// Assemble the text sent to the AI capability
///
/// Meta description and headings first so the model sees page structure,
/// then the body, truncated to the configured maximum.
fn compose_ai_input(page: &ExtractedPage, max_len: usize) -> String {
    let mut parts = Vec::new();
    if let Some(description) = &page.meta_description {
        parts.push(format!("Description: {}", description));
    }
    for heading in &page.headings {
        parts.push(format!(
            "{} {}",
            "#".repeat(heading.level as usize),
            heading.text
        ));
    }
    parts.push(page.body_text.clone());

    let mut text = parts.join("\n\n");
    if text.len() > max_len {
        let mut end = max_len;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

/// Enforce the output contract on AI-produced content
///
/// FAQ pairs must have a non-empty question and answer or be omitted.
fn sanitize(content: StructuredContent) -> StructuredContent {
    StructuredContent {
        summary: content
            .summary
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        keywords: content
            .keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect(),
        faqs: content
            .faqs
            .into_iter()
            .map(|f| FaqEntry {
                question: f.question.trim().to_string(),
                answer: f.answer.trim().to_string(),
            })
            .filter(|f| !f.question.is_empty() && !f.answer.is_empty())
            .collect(),
    }
}
