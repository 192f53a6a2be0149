//! Crawl frontier: traversal order, dedup, origin scoping, and page budget
//!
//! The frontier owns ordering only; politeness timing belongs to the crawl
//! loop. URLs are visited in FIFO order, so the crawl is breadth-first
//! relative to discovery. A URL enters the queue at most once across the
//! whole crawl, and the page budget decreases only when a page is accepted
//! into the knowledge base.

use std::collections::{HashSet, VecDeque};

use tracing::trace;
use url::{Origin, Url};

use crate::crawler::error::CrawlError;

/// File extensions that never carry crawlable page content
const SKIP_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".ico", ".webp", ".css", ".js", ".xml",
    ".zip", ".doc", ".docx",
];

/// FIFO crawl frontier with same-origin scoping and a page budget
#[derive(Debug)]
pub struct Frontier {
    seed: Url,
    origin: Origin,
    queue: VecDeque<Url>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    budget_remaining: u32,
}

impl Frontier {
    /// Create a frontier seeded with `seed_url` and a page budget
    ///
    /// Fails with [`CrawlError::InvalidSeed`] for unparsable URLs or
    /// non-http(s) schemes, before any crawling starts.
    pub fn new(seed_url: &str, max_pages: u32) -> Result<Self, CrawlError> {
        let parsed = Url::parse(seed_url)
            .map_err(|e| CrawlError::InvalidSeed(format!("{}: {}", seed_url, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(CrawlError::InvalidSeed(format!(
                "unsupported scheme '{}' in {}",
                parsed.scheme(),
                seed_url
            )));
        }

        let seed = strip_tracking_parts(&parsed);
        let origin = seed.origin();

        let mut frontier = Self {
            seed: seed.clone(),
            origin,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            budget_remaining: max_pages,
        };

        frontier.queue.push_back(seed.clone());
        frontier.queued.insert(seed.to_string());

        Ok(frontier)
    }

    /// The normalized seed URL
    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Dequeue the next URL to visit, or `None` when the crawl is done
    ///
    /// The crawl is done once the queue is empty or the page budget is
    /// spent, even if URLs remain queued.
    pub fn next(&mut self) -> Option<Url> {
        if self.budget_remaining == 0 {
            return None;
        }
        let url = self.queue.pop_front()?;
        self.queued.remove(url.as_str());
        Some(url)
    }

    /// Record a URL as visited
    ///
    /// Also used for failed fetches so they are never retried.
    pub fn mark_visited(&mut self, url: &Url) {
        self.visited.insert(url.to_string());
    }

    /// Offer a discovered URL to the frontier
    ///
    /// Rejected (no-op, returns `false`) when the URL is already visited or
    /// queued, points outside the seed origin, looks like a static asset,
    /// or the page budget is already spent.
    pub fn enqueue(&mut self, url: &Url) -> bool {
        if self.budget_remaining == 0 {
            return false;
        }

        let Some(normalized) = normalize_link(url) else {
            return false;
        };

        if normalized.origin() != self.origin {
            trace!("Rejecting off-origin link: {}", normalized);
            return false;
        }

        let key = normalized.to_string();
        if self.visited.contains(&key) || self.queued.contains(&key) {
            return false;
        }

        trace!("Enqueued {}", normalized);
        self.queued.insert(key);
        self.queue.push_back(normalized);
        true
    }

    /// Consume one unit of the page budget for an accepted page
    pub fn page_accepted(&mut self) {
        self.budget_remaining = self.budget_remaining.saturating_sub(1);
    }

    /// Remaining page budget
    pub fn budget_remaining(&self) -> u32 {
        self.budget_remaining
    }

    /// Number of URLs visited so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Normalize a link for dedup, or reject it as uncrawlable
///
/// Strips fragments and query strings (the original page is the same
/// resource) and drops non-http(s) schemes and static-asset extensions.
fn normalize_link(url: &Url) -> Option<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    let path = url.path().to_ascii_lowercase();
    if SKIP_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return None;
    }

    Some(strip_tracking_parts(url))
}

fn strip_tracking_parts(url: &Url) -> Url {
    let mut clean = url.clone();
    clean.set_fragment(None);
    clean.set_query(None);
    clean
}
