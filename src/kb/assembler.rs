//! Knowledge base assembler
//!
//! Folds page records into the knowledge base aggregate. Indexes are
//! updated incrementally as pages arrive, but [`KbAssembler::finalize`]
//! rebuilds them from the page list alone, so the published indexes are
//! always a pure function of `pages` and finalize is idempotent.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{
    ContentType, FaqSectionEntry, KB_FORMAT_VERSION, KbMetadata, KnowledgeBase, PageRecord,
};

/// Accumulates pages and derived indexes during a crawl
#[derive(Debug)]
pub struct KbAssembler {
    website_url: String,
    created_at: DateTime<Utc>,
    pages: Vec<PageRecord>,
    search_index: BTreeMap<String, BTreeSet<String>>,
    topics_index: BTreeMap<ContentType, Vec<String>>,
    keywords_index: BTreeMap<String, BTreeSet<String>>,
    faq_section: Vec<FaqSectionEntry>,
    skipped_pages: usize,
    failed_pages: usize,
}

impl KbAssembler {
    /// Create an assembler for a crawl of `website_url`
    ///
    /// The creation timestamp is fixed here so repeated finalize calls
    /// produce identical metadata.
    pub fn new(website_url: impl Into<String>) -> Self {
        Self {
            website_url: website_url.into(),
            created_at: Utc::now(),
            pages: Vec::new(),
            search_index: BTreeMap::new(),
            topics_index: BTreeMap::new(),
            keywords_index: BTreeMap::new(),
            faq_section: Vec::new(),
            skipped_pages: 0,
            failed_pages: 0,
        }
    }

    /// Fold a page into the aggregate, updating all indexes
    pub fn add_page(&mut self, page: PageRecord) {
        debug!("Adding page {} ({})", page.url, page.content_type);
        index_page(
            &mut self.search_index,
            &mut self.topics_index,
            &mut self.keywords_index,
            &mut self.faq_section,
            &page,
        );
        self.pages.push(page);
    }

    /// Record a page that was fetched but discarded for thin content
    pub fn record_skipped(&mut self) {
        self.skipped_pages += 1;
    }

    /// Record a page that failed to fetch or parse
    pub fn record_failed(&mut self) {
        self.failed_pages += 1;
    }

    /// Number of accepted pages so far
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Pages discarded for thin content so far
    pub fn skipped_count(&self) -> usize {
        self.skipped_pages
    }

    /// Pages that failed to fetch or parse so far
    pub fn failed_count(&self) -> usize {
        self.failed_pages
    }

    /// Whether no page has been accepted
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Build the knowledge base
    ///
    /// Rebuilds every index from `pages` and verifies the rebuilt indexes
    /// agree with the incrementally maintained ones. Calling finalize
    /// twice without an intervening `add_page` yields identical output.
    pub fn finalize(&self) -> KnowledgeBase {
        let mut search_index = BTreeMap::new();
        let mut topics_index = BTreeMap::new();
        let mut keywords_index = BTreeMap::new();
        let mut faq_section = Vec::new();

        for page in &self.pages {
            index_page(
                &mut search_index,
                &mut topics_index,
                &mut keywords_index,
                &mut faq_section,
                page,
            );
        }

        debug_assert_eq!(search_index, self.search_index);
        debug_assert_eq!(topics_index, self.topics_index);
        debug_assert_eq!(keywords_index, self.keywords_index);
        debug_assert_eq!(faq_section, self.faq_section);

        let mut content_types: BTreeMap<ContentType, usize> = BTreeMap::new();
        let mut all_keywords: BTreeSet<&str> = BTreeSet::new();
        let mut total_faqs = 0;
        for page in &self.pages {
            *content_types.entry(page.content_type).or_insert(0) += 1;
            total_faqs += page.faqs.len();
            all_keywords.extend(page.keywords.iter().map(String::as_str));
        }

        let kb = KnowledgeBase {
            metadata: KbMetadata {
                website_url: self.website_url.clone(),
                created_at: self.created_at,
                total_pages: self.pages.len(),
                total_faqs,
                total_keywords: all_keywords.len(),
                content_types,
                skipped_pages: self.skipped_pages,
                failed_pages: self.failed_pages,
                version: KB_FORMAT_VERSION.to_string(),
            },
            pages: self.pages.clone(),
            search_index,
            topics_index,
            faq_section,
            keywords_index,
        };

        debug_assert!(indexes_consistent(&kb));
        info!(
            "Assembled knowledge base: {} pages, {} FAQs, {} keywords",
            kb.metadata.total_pages, kb.metadata.total_faqs, kb.metadata.total_keywords
        );
        kb
    }
}

/// Fold one page into the index structures
fn index_page(
    search_index: &mut BTreeMap<String, BTreeSet<String>>,
    topics_index: &mut BTreeMap<ContentType, Vec<String>>,
    keywords_index: &mut BTreeMap<String, BTreeSet<String>>,
    faq_section: &mut Vec<FaqSectionEntry>,
    page: &PageRecord,
) {
    for token in tokenize(&page.title).chain(tokenize(&page.body_text)) {
        search_index
            .entry(token)
            .or_default()
            .insert(page.url.clone());
    }

    topics_index
        .entry(page.content_type)
        .or_default()
        .push(page.url.clone());

    for keyword in &page.keywords {
        keywords_index
            .entry(keyword.clone())
            .or_default()
            .insert(page.url.clone());
    }

    for faq in &page.faqs {
        faq_section.push(FaqSectionEntry {
            question: faq.question.clone(),
            answer: faq.answer.clone(),
            source_page: page.url.clone(),
        });
    }
}

/// Normalize text into searchable tokens
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 3)
        .map(|t| t.to_lowercase())
}

/// Every page identifier referenced by an index must exist in `pages`
fn indexes_consistent(kb: &KnowledgeBase) -> bool {
    let known: BTreeSet<&str> = kb.pages.iter().map(|p| p.url.as_str()).collect();

    kb.search_index
        .values()
        .flatten()
        .chain(kb.keywords_index.values().flatten())
        .all(|id| known.contains(id.as_str()))
        && kb
            .topics_index
            .values()
            .flatten()
            .all(|id| known.contains(id.as_str()))
        && kb
            .faq_section
            .iter()
            .all(|f| known.contains(f.source_page.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::EnrichMethod;
    use crate::kb::FaqEntry;

    fn page(url: &str, title: &str, body: &str, content_type: ContentType) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: title.to_string(),
            body_text: body.to_string(),
            headings: Vec::new(),
            outbound_links: BTreeSet::new(),
            content_type,
            content_length: body.len(),
            faqs: Vec::new(),
            summary: Some(format!("Summary of {}", title)),
            keywords: BTreeSet::from(["widgets".to_string()]),
            enriched_by: EnrichMethod::Heuristic,
            scraped_at: Utc::now(),
        }
    }

    fn page_with_faq(url: &str, question: &str, answer: &str) -> PageRecord {
        let mut p = page(url, "FAQ", "Answers to common questions", ContentType::Faq);
        p.faqs.push(FaqEntry {
            question: question.to_string(),
            answer: answer.to_string(),
        });
        p
    }

    #[test]
    fn test_search_index_maps_tokens_to_pages() {
        let mut assembler = KbAssembler::new("https://example.com");
        assembler.add_page(page(
            "https://example.com/a",
            "Widget Catalog",
            "Widgets of every size",
            ContentType::Product,
        ));

        let kb = assembler.finalize();
        let hits = kb.search_index.get("widget").unwrap();
        assert!(hits.contains("https://example.com/a"));
        // tokens shorter than 3 chars are dropped
        assert!(!kb.search_index.contains_key("of"));
    }

    #[test]
    fn test_index_consistency() {
        let mut assembler = KbAssembler::new("https://example.com");
        assembler.add_page(page(
            "https://example.com/a",
            "Alpha",
            "Alpha page body text",
            ContentType::Article,
        ));
        assembler.add_page(page_with_faq(
            "https://example.com/faq",
            "How do refunds work?",
            "Email us within 30 days.",
        ));

        let kb = assembler.finalize();
        assert!(indexes_consistent(&kb));
        assert_eq!(kb.faq_section.len(), 1);
        assert_eq!(kb.faq_section[0].source_page, "https://example.com/faq");
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut assembler = KbAssembler::new("https://example.com");
        assembler.add_page(page(
            "https://example.com/a",
            "Alpha",
            "Alpha page body text",
            ContentType::Article,
        ));
        assembler.record_skipped();

        let first = serde_json::to_string(&assembler.finalize()).unwrap();
        let second = serde_json::to_string(&assembler.finalize()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_metadata_counts() {
        let mut assembler = KbAssembler::new("https://example.com");
        assembler.add_page(page(
            "https://example.com/a",
            "Alpha",
            "Alpha body",
            ContentType::Article,
        ));
        assembler.add_page(page(
            "https://example.com/b",
            "Beta",
            "Beta body",
            ContentType::Article,
        ));
        assembler.add_page(page_with_faq(
            "https://example.com/faq",
            "How do refunds work?",
            "Email us within 30 days.",
        ));
        assembler.record_skipped();
        assembler.record_failed();

        let kb = assembler.finalize();
        assert_eq!(kb.metadata.total_pages, 3);
        assert_eq!(kb.metadata.total_faqs, 1);
        assert_eq!(kb.metadata.total_keywords, 1);
        assert_eq!(kb.metadata.content_types[&ContentType::Article], 2);
        assert_eq!(kb.metadata.content_types[&ContentType::Faq], 1);
        assert_eq!(kb.metadata.skipped_pages, 1);
        assert_eq!(kb.metadata.failed_pages, 1);
        assert_eq!(kb.metadata.website_url, "https://example.com");
    }

    #[test]
    fn test_topics_index_keeps_page_order() {
        let mut assembler = KbAssembler::new("https://example.com");
        assembler.add_page(page(
            "https://example.com/b",
            "Beta",
            "Beta body",
            ContentType::Article,
        ));
        assembler.add_page(page(
            "https://example.com/a",
            "Alpha",
            "Alpha body",
            ContentType::Article,
        ));

        let kb = assembler.finalize();
        assert_eq!(
            kb.topics_index[&ContentType::Article],
            vec!["https://example.com/b", "https://example.com/a"]
        );
    }
}
