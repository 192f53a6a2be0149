//! Deterministic content extraction for fetched pages
//!
//! Turns a parsed HTML document into a normalized [`ExtractedPage`]:
//! title, headings, significant body text with boilerplate excluded,
//! outbound links, and a detected content type. No AI involvement; the
//! enrichment fields of the final page record are filled later.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::crawler::config::CrawlerConfig;
use crate::crawler::error::CrawlError;
use crate::kb::{ContentType, Heading};

/// Elements whose subtree never counts as page content
const BOILERPLATE: &[&str] = &[
    "nav", "header", "footer", "aside", "script", "style", "noscript",
];

/// Minimum length for a text node to count as significant
const MIN_TEXT_NODE_LEN: usize = 20;

/// A heading together with the text that follows it, in document order
#[derive(Debug, Clone)]
pub struct Section {
    /// Heading opening the section, absent for leading text
    pub heading: Option<Heading>,

    /// Concatenated significant text of the section
    pub text: String,
}

/// Normalized page content, before enrichment
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// URL of the page
    pub url: Url,

    /// Page title: `<title>` tag, falling back to the first heading
    pub title: String,

    /// Meta description, when present
    pub meta_description: Option<String>,

    /// All headings h1-h6 in document order
    pub headings: Vec<Heading>,

    /// Heading-delimited sections in document order
    pub sections: Vec<Section>,

    /// Significant text of the whole page, boilerplate excluded
    pub body_text: String,

    /// Links found on the page, resolved against the page URL
    pub outbound_links: Vec<Url>,

    /// Detected content type
    pub content_type: ContentType,
}

/// Extract normalized content from a fetched document
///
/// Returns `Ok(None)` when the page's body text is below the configured
/// minimum; such pages are discarded before reaching the assembler.
pub fn extract(
    html: &str,
    url: &Url,
    config: &CrawlerConfig,
) -> Result<Option<ExtractedPage>, CrawlError> {
    let document = Html::parse_document(html);

    let content_selector = parse_selector("h1, h2, h3, h4, h5, h6, p, li")?;

    let mut headings = Vec::new();
    let mut sections: Vec<Section> = Vec::new();
    let mut current = Section {
        heading: None,
        text: String::new(),
    };

    for element in document.select(&content_selector) {
        if has_boilerplate_ancestor(&element) {
            continue;
        }

        let text = collapse_whitespace(&element.text().collect::<String>());
        let name = element.value().name();

        if let Some(level) = heading_level(name) {
            if text.is_empty() {
                continue;
            }
            if current.heading.is_some() || !current.text.is_empty() {
                sections.push(current);
            }
            let heading = Heading {
                level,
                text: text.clone(),
            };
            headings.push(heading.clone());
            current = Section {
                heading: Some(heading),
                text: String::new(),
            };
        } else if text.len() >= MIN_TEXT_NODE_LEN {
            if !current.text.is_empty() {
                current.text.push(' ');
            }
            current.text.push_str(&text);
        }
    }
    if current.heading.is_some() || !current.text.is_empty() {
        sections.push(current);
    }

    let body_text = sections
        .iter()
        .filter(|s| !s.text.is_empty())
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    if body_text.len() < config.min_content_length {
        debug!(
            "Discarding {}: body text {} chars, minimum {}",
            url,
            body_text.len(),
            config.min_content_length
        );
        return Ok(None);
    }

    let title_selector = parse_selector("title")?;
    let title = document
        .select(&title_selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .or_else(|| headings.first().map(|h| h.text.clone()))
        .unwrap_or_else(|| url.to_string());

    let description_selector = parse_selector("meta[name='description']")?;
    let meta_description = document
        .select(&description_selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| collapse_whitespace(s))
        .filter(|s| !s.is_empty());

    let link_selector = parse_selector("a[href]")?;
    let outbound_links = document
        .select(&link_selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| url.join(href).ok())
        .collect();

    let content_type = detect_content_type(url, &headings, &body_text);

    Ok(Some(ExtractedPage {
        url: url.clone(),
        title,
        meta_description,
        headings,
        sections,
        body_text,
        outbound_links,
        content_type,
    }))
}

/// Classify a page from URL path keywords and structural signals
///
/// Fixed priority order: faq > product > help > article > other.
fn detect_content_type(url: &Url, headings: &[Heading], body_text: &str) -> ContentType {
    let path = url.path().to_ascii_lowercase();

    let question_headings = headings
        .iter()
        .filter(|h| h.text.trim_end().ends_with('?'))
        .count();
    if path.contains("faq") || path.contains("frequently-asked") || question_headings >= 2 {
        return ContentType::Faq;
    }

    let product_path = ["product", "shop", "store", "item"]
        .iter()
        .any(|kw| path.contains(kw));
    if product_path || price_token_regex().is_match(body_text) {
        return ContentType::Product;
    }

    if ["help", "support", "docs", "guide"]
        .iter()
        .any(|kw| path.contains(kw))
    {
        return ContentType::Help;
    }

    if ["blog", "article", "news", "post"]
        .iter()
        .any(|kw| path.contains(kw))
    {
        return ContentType::Article;
    }

    ContentType::Other
}

fn parse_selector(selector: &str) -> Result<Selector, CrawlError> {
    Selector::parse(selector)
        .map_err(|e| CrawlError::Parse(format!("bad selector '{}': {}", selector, e)))
}

fn heading_level(tag_name: &str) -> Option<u8> {
    match tag_name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn has_boilerplate_ancestor(element: &ElementRef) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|el| BOILERPLATE.contains(&el.name()))
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn price_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[$€£]\s?\d").expect("valid price pattern"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head>
            <title>Acme Widgets</title>
            <meta name="description" content="Widgets for every need">
          </head>
          <body>
            <nav><ul><li>Home is where the navigation lives</li></ul></nav>
            <h1>Welcome to Acme</h1>
            <p>We build the finest widgets known to humankind, shipped worldwide.</p>
            <h2>How do I order a widget?</h2>
            <p>Ordering is easy: pick a widget, add it to your cart, and check out.</p>
            <a href="/about">About us</a>
            <a href="https://other.com/external">External</a>
            <footer><p>Copyright notice that should never appear in body text.</p></footer>
          </body>
        </html>
    "#;

    fn config(min_len: usize) -> CrawlerConfig {
        CrawlerConfig::builder().min_content_length(min_len).build()
    }

    fn page_url(path: &str) -> Url {
        Url::parse(&format!("https://example.com{}", path)).unwrap()
    }

    #[test]
    fn test_extracts_title_headings_and_body() {
        let page = extract(PAGE, &page_url("/"), &config(10)).unwrap().unwrap();

        assert_eq!(page.title, "Acme Widgets");
        assert_eq!(page.meta_description.as_deref(), Some("Widgets for every need"));
        assert_eq!(page.headings.len(), 2);
        assert_eq!(page.headings[0].level, 1);
        assert_eq!(page.headings[1].text, "How do I order a widget?");
        assert!(page.body_text.contains("finest widgets"));
    }

    #[test]
    fn test_excludes_boilerplate() {
        let page = extract(PAGE, &page_url("/"), &config(10)).unwrap().unwrap();
        assert!(!page.body_text.contains("navigation lives"));
        assert!(!page.body_text.contains("Copyright notice"));
    }

    #[test]
    fn test_resolves_outbound_links() {
        let page = extract(PAGE, &page_url("/"), &config(10)).unwrap().unwrap();
        let links: Vec<&str> = page.outbound_links.iter().map(|u| u.as_str()).collect();
        assert!(links.contains(&"https://example.com/about"));
        assert!(links.contains(&"https://other.com/external"));
    }

    #[test]
    fn test_title_falls_back_to_first_heading() {
        let html = "<html><body><h1>Only Heading</h1>\
            <p>Some paragraph with enough text to pass the length gate.</p></body></html>";
        let page = extract(html, &page_url("/"), &config(10)).unwrap().unwrap();
        assert_eq!(page.title, "Only Heading");
    }

    #[test]
    fn test_thin_page_is_discarded() {
        let html = "<html><body><p>too short</p></body></html>";
        assert!(extract(html, &page_url("/"), &config(100)).unwrap().is_none());
    }

    #[test]
    fn test_sections_follow_headings() {
        let page = extract(PAGE, &page_url("/"), &config(10)).unwrap().unwrap();
        let order_section = page
            .sections
            .iter()
            .find(|s| {
                s.heading
                    .as_ref()
                    .is_some_and(|h| h.text.starts_with("How do I order"))
            })
            .unwrap();
        assert!(order_section.text.contains("Ordering is easy"));
    }

    #[test]
    fn test_content_type_from_path() {
        let page = extract(PAGE, &page_url("/help/ordering"), &config(10))
            .unwrap()
            .unwrap();
        assert_eq!(page.content_type, ContentType::Help);

        let page = extract(PAGE, &page_url("/blog/widgets"), &config(10))
            .unwrap()
            .unwrap();
        assert_eq!(page.content_type, ContentType::Article);
    }

    #[test]
    fn test_content_type_priority() {
        // faq path keyword wins over the price token in the body
        let html = "<html><body><h1>FAQ</h1>\
            <p>Our widgets cost $25 each and ship within two business days.</p></body></html>";
        let page = extract(html, &page_url("/faq"), &config(10)).unwrap().unwrap();
        assert_eq!(page.content_type, ContentType::Faq);

        // same body on a neutral path classifies as product via the price token
        let page = extract(html, &page_url("/widgets"), &config(10)).unwrap().unwrap();
        assert_eq!(page.content_type, ContentType::Product);
    }

    #[test]
    fn test_two_question_headings_classify_as_faq() {
        let html = "<html><body>\
            <h2>How do I pay?</h2><p>You can pay with any major payment method today.</p>\
            <h2>Where do you ship?</h2><p>We ship worldwide from our warehouse in Oslo.</p>\
            </body></html>";
        let page = extract(html, &page_url("/info"), &config(10)).unwrap().unwrap();
        assert_eq!(page.content_type, ContentType::Faq);
    }
}
