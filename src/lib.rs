//! # sitekb - Website Knowledge Base Builder
//!
//! This crate turns a website into a chatbot-ready knowledge base. It
//! crawls a site breadth-first within a page budget, extracts the
//! significant content of each page, enriches it with an AI structuring
//! capability (falling back to deterministic heuristics), and assembles
//! everything into an indexed knowledge base with a consolidated FAQ
//! section.
//!
//! ## Features
//!
//! - Polite same-origin crawling with a configurable page budget
//! - Boilerplate-free content extraction and content-type detection
//! - AI-backed summaries, keywords, and FAQ pairs with heuristic fallback
//! - Search, topics, and keywords indexes over the crawled pages
//! - Chatbot training dataset derived from the knowledge base
//! - Categorization and SQL conversion of chatbot datasets
//! - Async API with Tokio
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitekb::crawler::{CrawlerConfig, HttpFetcher, crawl_site};
//! use sitekb::enrich::{EnrichOptions, Enricher};
//! use sitekb::kb::build_dataset;
//! use sitekb::progress::CancelFlag;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CrawlerConfig::builder().max_pages(25).build();
//!     let fetcher = HttpFetcher::new(&config)?;
//!     let enricher = Enricher::heuristic(EnrichOptions::default());
//!
//!     let kb = crawl_site(
//!         "https://example.com",
//!         &fetcher,
//!         &enricher,
//!         &config,
//!         None,
//!         CancelFlag::new(),
//!     )
//!     .await?;
//!
//!     let dataset = build_dataset(&kb);
//!     println!(
//!         "{} pages, {} training examples",
//!         kb.metadata.total_pages,
//!         dataset.training_data.len()
//!     );
//!     Ok(())
//! }
//! ```

mod error;

pub mod convert;
pub mod crawler;
pub mod enrich;
pub mod kb;
pub mod progress;

pub use error::Error;

/// Re-export of common types for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
