//! Error types for the crawler module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Unreachable host, timeout, or non-2xx status
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed or non-HTML document
    #[error("Parse error: {0}")]
    Parse(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Seed URL rejected before the crawl starts
    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),
}

impl From<CrawlError> for CrateError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::Http(e) => CrateError::Http(e),
            CrawlError::InvalidSeed(msg) => CrateError::Config(msg),
            CrawlError::UrlParse(e) => CrateError::Crawl(format!("URL parse error: {}", e)),
            _ => CrateError::Crawl(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_to_crate_error() {
        let err: CrateError = CrawlError::InvalidSeed("ftp scheme".to_string()).into();
        assert!(matches!(err, CrateError::Config(_)));

        let parse = url::Url::parse("no base").unwrap_err();
        let err: CrateError = CrawlError::UrlParse(parse).into();
        assert!(matches!(err, CrateError::Crawl(_)));

        let err: CrateError = CrawlError::Network("host unreachable".to_string()).into();
        assert!(matches!(err, CrateError::Crawl(_)));

        let err: CrateError = CrawlError::Parse("not html".to_string()).into();
        assert!(matches!(err, CrateError::Crawl(_)));
    }
}
