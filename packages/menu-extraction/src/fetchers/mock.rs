//! Mock fetcher for testing.
//!
//! Provides a configurable mock implementation of the Fetcher trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::Fetcher;
use crate::types::document::Document;

/// Mock fetcher for testing.
///
/// Serves canned documents by URL; unknown URLs answer with HTTP 404.
///
/// # Example
///
/// ```rust
/// use menu_extraction::fetchers::MockFetcher;
///
/// let mock = MockFetcher::new()
///     .with_html("https://example.com", "<a href='lunch.pdf'>Lunch</a>")
///     .with_pdf("https://example.com/lunch.pdf", b"%PDF-1.4".to_vec());
/// ```
#[derive(Default)]
pub struct MockFetcher {
    /// Canned documents indexed by URL
    documents: Arc<RwLock<HashMap<String, Document>>>,
    /// URLs that fail with a timeout
    timeouts: Arc<RwLock<Vec<String>>>,
    /// Track calls for verification
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a new empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document that will be returned for its URL.
    pub fn add_document(&self, document: Document) {
        let mut documents = self.documents.write().unwrap();
        documents.insert(document.url.clone(), document);
    }

    /// Serve an arbitrary document (builder pattern).
    pub fn with_document(self, document: Document) -> Self {
        self.add_document(document);
        self
    }

    /// Serve an HTML page.
    pub fn with_html(self, url: &str, html: &str) -> Self {
        self.with_document(Document::new(
            url,
            Some("text/html; charset=utf-8".to_string()),
            html.as_bytes().to_vec(),
        ))
    }

    /// Serve a PDF.
    pub fn with_pdf(self, url: &str, bytes: Vec<u8>) -> Self {
        self.with_document(Document::new(
            url,
            Some("application/pdf".to_string()),
            bytes,
        ))
    }

    /// Serve an image with the given content type.
    pub fn with_image(self, url: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        self.with_document(Document::new(url, Some(content_type.to_string()), bytes))
    }

    /// Serve a JSON body.
    pub fn with_json(self, url: &str, body: &serde_json::Value) -> Self {
        self.with_document(Document::new(
            url,
            Some("application/json".to_string()),
            body.to_string().into_bytes(),
        ))
    }

    /// Make a URL time out.
    pub fn with_timeout(self, url: &str) -> Self {
        self.timeouts.write().unwrap().push(url.to_string());
        self
    }

    /// Get the number of fetch calls.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Get the URLs that were fetched, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Clear all recorded calls.
    pub fn reset_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            documents: Arc::clone(&self.documents),
            timeouts: Arc::clone(&self.timeouts),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<Document> {
        self.calls.write().unwrap().push(url.to_string());

        if self.timeouts.read().unwrap().iter().any(|u| u == url) {
            return Err(FetchError::Timeout {
                url: url.to_string(),
            });
        }

        self.documents
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
