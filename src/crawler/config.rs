//! # Crawler Configuration Module
//!
//! Configuration options for the crawler: page budget, politeness delay,
//! content-length gates, and HTTP client settings. Uses a builder pattern
//! for flexible configuration.

use std::time::Duration;

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum number of pages accepted into the knowledge base
    pub max_pages: u32,

    /// Politeness delay between requests, in seconds
    pub delay_seconds: f64,

    /// Minimum body-text length for a page to be kept
    pub min_content_length: usize,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent to use for requests
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            delay_seconds: 1.0,
            min_content_length: 100,
            request_timeout_secs: 30,
            user_agent: format!("sitekb/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the maximum number of pages to accept
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the politeness delay between requests, in seconds
    pub fn delay_seconds(mut self, delay_seconds: f64) -> Self {
        self.config.delay_seconds = delay_seconds;
        self
    }

    /// Set the minimum body-text length for a page to be kept
    pub fn min_content_length(mut self, min_content_length: usize) -> Self {
        self.config.min_content_length = min_content_length;
        self
    }

    /// Set the HTTP request timeout in seconds
    pub fn request_timeout_secs(mut self, request_timeout_secs: u64) -> Self {
        self.config.request_timeout_secs = request_timeout_secs;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Get the politeness delay as a Duration
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_seconds.max(0.0))
    }
}
