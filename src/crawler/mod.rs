//! Website crawler module
//!
//! Drives the whole per-page pipeline: the frontier yields a URL, the
//! fetcher retrieves it, the extractor normalizes it, the enricher adds
//! structure, and the assembler folds it into the knowledge base.
//! Fetch and parse failures are non-fatal: the URL is marked visited and
//! the crawl continues.

mod config;
mod error;
mod extract;
mod fetch;
mod frontier;

pub use config::{CrawlerConfig, CrawlerConfigBuilder};
pub use error::CrawlError;
pub use extract::{ExtractedPage, Section, extract};
pub use fetch::{HttpFetcher, PageFetcher};
pub use frontier::Frontier;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::enrich::{EnrichMethod, Enricher, StructuredContent};
use crate::error::{Error, Result};
use crate::kb::{KbAssembler, KnowledgeBase, PageRecord};
use crate::progress::{CrawlEvent, CancelFlag, ProgressSender};

/// Crawl a website and assemble its knowledge base
///
/// Visits pages in breadth-first order from `seed_url`, within the seed
/// origin and the configured page budget, waiting the politeness delay
/// between requests. The cancellation flag is checked once per page
/// boundary. Fails up front for an invalid seed and, after the crawl,
/// when no page was accepted.
#[instrument(skip(fetcher, enricher, config, progress, cancel))]
pub async fn crawl_site<F: PageFetcher>(
    seed_url: &str,
    fetcher: &F,
    enricher: &Enricher,
    config: &CrawlerConfig,
    progress: Option<ProgressSender>,
    cancel: CancelFlag,
) -> Result<KnowledgeBase> {
    let mut frontier = Frontier::new(seed_url, config.max_pages)?;
    let mut assembler = KbAssembler::new(frontier.seed().as_str());

    info!(
        "Starting crawl of {} with a budget of {} pages",
        frontier.seed(),
        config.max_pages
    );

    while let Some(url) = frontier.next() {
        if cancel.is_cancelled() {
            info!("Cancellation requested; stopping after current page");
            break;
        }

        frontier.mark_visited(&url);
        emit(&progress, CrawlEvent::Fetching {
            url: url.to_string(),
        })
        .await;

        match fetch_and_extract(fetcher, &url, config).await {
            Ok(Some(page)) => {
                for link in &page.outbound_links {
                    frontier.enqueue(link);
                }

                let (structured, method) = enricher.enrich(&page).await;
                let record = into_record(page, structured, method);

                emit(&progress, CrawlEvent::PageAdded {
                    url: record.url.clone(),
                    title: record.title.clone(),
                    pages_so_far: assembler.page_count() + 1,
                })
                .await;

                info!("Accepted page {}: {}", assembler.page_count() + 1, record.url);
                assembler.add_page(record);
                frontier.page_accepted();
            }
            Ok(None) => {
                debug!("Skipped {}: insufficient content", url);
                assembler.record_skipped();
                emit(&progress, CrawlEvent::PageSkipped {
                    url: url.to_string(),
                    reason: "insufficient content".to_string(),
                })
                .await;
            }
            Err(e) => {
                warn!("Failed to process {}: {}", url, e);
                assembler.record_failed();
                emit(&progress, CrawlEvent::PageFailed {
                    url: url.to_string(),
                    error: e.to_string(),
                })
                .await;
            }
        }

        tokio::time::sleep(config.delay()).await;
    }

    if assembler.is_empty() {
        return Err(Error::EmptyCrawl {
            website: seed_url.to_string(),
        });
    }

    emit(&progress, CrawlEvent::Finished {
        pages: assembler.page_count(),
        skipped: assembler.skipped_count(),
        failed: assembler.failed_count(),
    })
    .await;

    info!(
        "Crawl finished: {} pages accepted, {} skipped, {} failed",
        assembler.page_count(),
        assembler.skipped_count(),
        assembler.failed_count()
    );

    Ok(assembler.finalize())
}

async fn fetch_and_extract<F: PageFetcher>(
    fetcher: &F,
    url: &Url,
    config: &CrawlerConfig,
) -> std::result::Result<Option<ExtractedPage>, CrawlError> {
    let html = fetcher.fetch(url).await?;
    extract(&html, url, config)
}

/// Combine extracted content and enrichment into the final page record
fn into_record(
    page: ExtractedPage,
    structured: StructuredContent,
    method: EnrichMethod,
) -> PageRecord {
    PageRecord {
        url: page.url.to_string(),
        title: page.title,
        content_length: page.body_text.len(),
        body_text: page.body_text,
        headings: page.headings,
        outbound_links: page
            .outbound_links
            .iter()
            .map(|u| u.to_string())
            .collect(),
        content_type: page.content_type,
        faqs: structured.faqs,
        summary: structured.summary,
        keywords: structured.keywords.into_iter().collect(),
        enriched_by: method,
        scraped_at: Utc::now(),
    }
}

async fn emit(progress: &Option<ProgressSender>, event: CrawlEvent) {
    if let Some(tx) = progress {
        // A dropped receiver must never stall the crawl
        let _ = tx.send(event).await;
    }
}
