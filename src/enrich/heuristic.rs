//! Deterministic enrichment strategy
//!
//! Produces the same output shape as the AI structurer without any
//! external dependency: a sentence-boundary summary, frequency-ranked
//! keywords, and FAQ pairs recovered from question-looking headings.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use super::{EnrichOptions, StructuredContent};
use crate::crawler::ExtractedPage;
use crate::kb::FaqEntry;

/// Longest answer slice taken from the section under a question heading
const ANSWER_LIMIT: usize = 300;

/// Words too common to be useful keywords
const STOPWORDS: &[&str] = &[
    "about", "after", "also", "and", "are", "been", "before", "being", "between", "both", "but",
    "can", "could", "does", "each", "for", "from", "has", "have", "her", "here", "him", "his",
    "how", "into", "its", "just", "like", "more", "most", "not", "only", "other", "our", "out",
    "over", "should", "some", "such", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "under", "very", "was", "were", "what", "when",
    "where", "which", "while", "who", "why", "will", "with", "would", "you", "your",
];

/// Derive summary, keywords, and FAQs without external calls
pub fn heuristic_enrich(page: &ExtractedPage, options: &EnrichOptions) -> StructuredContent {
    let summary = summarize(&page.body_text, options.summary_length);

    StructuredContent {
        summary: (!summary.is_empty()).then_some(summary),
        keywords: top_keywords(&page.body_text, options.max_keywords),
        faqs: heading_faqs(page),
    }
}

/// First `limit` characters of `text`, preferring a sentence boundary
fn summarize(text: &str, limit: usize) -> String {
    let text = text.trim();
    if text.len() <= limit {
        return text.to_string();
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let slice = &text[..end];

    // Cut after the last sentence end, unless that loses most of the slice
    if let Some(pos) = slice.rfind(['.', '!', '?']) {
        if pos + 1 > limit / 2 {
            return slice[..=pos].trim_end().to_string();
        }
    }
    slice.trim_end().to_string()
}

/// Top-K non-stopword tokens by frequency, ties broken alphabetically
fn top_keywords(text: &str, k: usize) -> Vec<String> {
    let mut frequency: HashMap<String, usize> = HashMap::new();
    for token in text
        .split(|c: char| !c.is_alphabetic())
        .map(|t| t.to_lowercase())
        .filter(|t| t.len() > 3 && !STOPWORDS.contains(&t.as_str()))
    {
        *frequency.entry(token).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = frequency.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(k).map(|(word, _)| word).collect()
}

/// FAQ pairs from headings that look like questions
///
/// A heading qualifies when it ends in `?` or opens with an interrogative
/// lead; the answer is the leading slice of the section under it. Pairs
/// with an empty answer are omitted.
fn heading_faqs(page: &ExtractedPage) -> Vec<FaqEntry> {
    page.sections
        .iter()
        .filter_map(|section| {
            let heading = section.heading.as_ref()?;
            if !is_question(&heading.text) || section.text.is_empty() {
                return None;
            }
            let answer = summarize(&section.text, ANSWER_LIMIT);
            (!answer.is_empty()).then(|| FaqEntry {
                question: heading.text.clone(),
                answer,
            })
        })
        .collect()
}

fn is_question(text: &str) -> bool {
    text.trim_end().ends_with('?') || interrogative_lead_regex().is_match(text)
}

fn interrogative_lead_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(what|how|why|when|where|who|which|can|could|do|does|did|is|are|should|will)\b")
            .expect("valid interrogative pattern")
    })
}
