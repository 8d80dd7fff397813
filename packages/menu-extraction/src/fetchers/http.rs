//! HTTP-based fetcher implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::Fetcher;
use crate::types::config::FetchConfig;
use crate::types::document::Document;

/// Fetcher that downloads documents over HTTP(S).
///
/// One GET per call: no retries, no caching. Redirects are followed and
/// the final URL is kept on the returned [`Document`].
///
/// # Example
///
/// ```rust,ignore
/// use menu_extraction::fetchers::HttpFetcher;
///
/// let fetcher = HttpFetcher::new().with_timeout_secs(10);
/// let document = fetcher.fetch("https://example.com/lunch.pdf").await?;
/// ```
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
    timeout: Duration,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with default settings (30 s timeout).
    pub fn new() -> Self {
        Self::from_config(&FetchConfig::default())
    }

    /// Create a fetcher from the fetch section of the pipeline config.
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Strip the query string before a locator goes into the logs; social
/// endpoints carry access tokens there.
pub(crate) fn redact(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) if parsed.query().is_some() => {
            parsed.set_query(Some("[redacted]"));
            parsed.to_string()
        }
        Ok(parsed) => parsed.to_string(),
        Err(_) => url.split('?').next().unwrap_or("").to_string(),
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<Document> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
            });
        }

        let shown = redact(url);
        debug!(url = %shown, "HTTP fetch starting");

        let response = self
            .client
            .get(parsed)
            .header("User-Agent", &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %shown, error = %e, "HTTP request failed");
                if e.is_timeout() {
                    FetchError::Timeout { url: shown.clone() }
                } else {
                    FetchError::Http(Box::new(e.without_url()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %shown, status = status.as_u16(), "HTTP status not successful");
            return Err(FetchError::Status {
                url: shown,
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout { url: shown.clone() }
            } else {
                FetchError::Http(Box::new(e.without_url()))
            }
        })?;

        let document = Document::new(url, content_type, bytes.to_vec())
            .with_final_url(final_url)
            .with_status(status.as_u16());

        debug!(
            url = %shown,
            kind = ?document.kind,
            bytes = document.bytes.len(),
            "HTTP fetch completed"
        );

        Ok(document)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_hides_query() {
        assert_eq!(
            redact("https://graph.facebook.com/v12.0/page/posts?access_token=secret&limit=5"),
            "https://graph.facebook.com/v12.0/page/posts?[redacted]"
        );
        assert_eq!(redact("https://x.se/lunch.pdf"), "https://x.se/lunch.pdf");
        assert_eq!(redact("not a url?token=1"), "not a url");
    }

    #[tokio::test]
    async fn test_rejects_invalid_urls() {
        let fetcher = HttpFetcher::new();

        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));

        let err = fetcher.fetch("ftp://x.se/menu.pdf").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn test_builder() {
        let fetcher = HttpFetcher::new()
            .with_user_agent("TestBot/2.0")
            .with_timeout_secs(5);

        assert_eq!(fetcher.user_agent, "TestBot/2.0");
        assert_eq!(fetcher.timeout, Duration::from_secs(5));
        assert_eq!(fetcher.name(), "http");
    }
}
