//! Page fetching abstraction for the crawler
//!
//! The crawl loop only depends on the [`PageFetcher`] trait, so tests can
//! drive it from an in-memory site graph while production uses
//! [`HttpFetcher`] over reqwest.

use tracing::debug;
use url::Url;

use crate::crawler::config::CrawlerConfig;
use crate::crawler::error::CrawlError;

/// Capability to fetch the raw HTML of a page
pub trait PageFetcher {
    /// Fetch the document at `url`, returning its HTML
    fn fetch(
        &self,
        url: &Url,
    ) -> impl std::future::Future<Output = Result<String, CrawlError>> + Send;
}

/// HTTP fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the crawler's user agent and timeout
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, CrawlError> {
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CrawlError::Network(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Network(format!(
                "{} returned status {}",
                url, status
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !content_type.is_empty() && !content_type.contains("text/html") {
            return Err(CrawlError::Parse(format!(
                "{} has non-HTML content type '{}'",
                url, content_type
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CrawlError::Network(format!("{}: {}", url, e)))?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> CrawlerConfig {
        CrawlerConfig::builder().request_timeout_secs(5).build()
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html><body><p>hello</p></body></html>")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let url = Url::parse(&format!("{}/page", server.url())).unwrap();
        let body = fetcher.fetch(&url).await.unwrap();

        assert!(body.contains("hello"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let url = Url::parse(&format!("{}/missing", server.url())).unwrap();

        assert!(matches!(
            fetcher.fetch(&url).await,
            Err(CrawlError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_html() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let url = Url::parse(&format!("{}/data.json", server.url())).unwrap();

        assert!(matches!(
            fetcher.fetch(&url).await,
            Err(CrawlError::Parse(_))
        ));
    }
}
