//! Knowledge base data model and assembly
//!
//! This module owns the page records produced by the crawl and the
//! knowledge base aggregate built from them: the search, topics, and
//! keywords indexes, the consolidated FAQ section, and run metadata.

mod assembler;
mod chatbot;

pub use assembler::KbAssembler;
pub use chatbot::{ChatbotDataset, TrainingExample, build_dataset};

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enrich::EnrichMethod;

/// Knowledge base format version written into metadata
pub const KB_FORMAT_VERSION: &str = "1.0";

/// A heading extracted from a page, in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level, 1 through 6
    pub level: u8,

    /// Heading text
    pub text: String,
}

/// A question/answer pair attached to a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    /// The question, never empty
    pub question: String,

    /// The answer, never empty
    pub answer: String,
}

/// Detected content type of a page
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Long-form editorial content
    Article,
    /// Product or commerce page
    Product,
    /// Help or documentation page
    Help,
    /// Frequently-asked-questions page
    Faq,
    /// Anything else
    Other,
}

impl ContentType {
    /// Stable lowercase label, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Product => "product",
            ContentType::Help => "help",
            ContentType::Faq => "faq",
            ContentType::Other => "other",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One crawled page, fully normalized and enriched
///
/// Created once per visited URL and owned by the assembler; the
/// enrichment fields (`faqs`, `summary`, `keywords`) are filled at most
/// once, before the record reaches [`KbAssembler::add_page`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Normalized page URL, also the page identifier in the indexes
    pub url: String,

    /// Page title
    pub title: String,

    /// Significant text of the page, boilerplate excluded
    pub body_text: String,

    /// Headings in document order
    pub headings: Vec<Heading>,

    /// Outbound links discovered on the page
    pub outbound_links: BTreeSet<String>,

    /// Detected content type
    pub content_type: ContentType,

    /// Length of `body_text` in bytes
    pub content_length: usize,

    /// FAQ pairs derived from the page
    pub faqs: Vec<FaqEntry>,

    /// Short summary of the page
    pub summary: Option<String>,

    /// Keywords derived from the page
    pub keywords: BTreeSet<String>,

    /// Which strategy produced the enrichment fields
    pub enriched_by: EnrichMethod,

    /// When the page was scraped
    pub scraped_at: DateTime<Utc>,
}

/// Aggregate metadata for a knowledge base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbMetadata {
    /// Seed URL of the crawl
    pub website_url: String,

    /// When the knowledge base build started (ISO-8601)
    pub created_at: DateTime<Utc>,

    /// Number of accepted pages
    pub total_pages: usize,

    /// Number of FAQ pairs across all pages
    pub total_faqs: usize,

    /// Number of distinct keywords across all pages
    pub total_keywords: usize,

    /// Histogram of content types over accepted pages
    pub content_types: BTreeMap<ContentType, usize>,

    /// Pages fetched but discarded for insufficient content
    pub skipped_pages: usize,

    /// Pages that failed to fetch or parse
    pub failed_pages: usize,

    /// Knowledge base format version
    pub version: String,
}

/// An FAQ entry in the consolidated FAQ section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqSectionEntry {
    /// The question
    pub question: String,

    /// The answer
    pub answer: String,

    /// URL of the page the pair came from
    pub source_page: String,
}

/// The assembled knowledge base
///
/// Every index is a pure function of `pages`; page identifiers appearing
/// in any index always exist in `pages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    /// Aggregate metadata
    pub metadata: KbMetadata,

    /// Accepted pages, in crawl-completion order
    pub pages: Vec<PageRecord>,

    /// Normalized token -> page identifiers whose title or body contain it
    pub search_index: BTreeMap<String, BTreeSet<String>>,

    /// Content type -> page identifiers, in page order
    pub topics_index: BTreeMap<ContentType, Vec<String>>,

    /// All FAQ pairs, in page order
    pub faq_section: Vec<FaqSectionEntry>,

    /// Keyword -> page identifiers
    pub keywords_index: BTreeMap<String, BTreeSet<String>>,
}
