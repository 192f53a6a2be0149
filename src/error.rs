//! Error types for the sitekb crate

use thiserror::Error;

/// Result type for sitekb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sitekb operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File read/write error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Web crawling error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Content enrichment error
    #[error("Enrich error: {0}")]
    Enrich(String),

    /// Invalid configuration, surfaced before any work starts
    #[error("Configuration error: {0}")]
    Config(String),

    /// A full crawl produced no accepted pages
    #[error("Crawl of {website} produced no pages with usable content")]
    EmptyCrawl {
        /// Seed URL of the failed crawl
        website: String,
    },
}
