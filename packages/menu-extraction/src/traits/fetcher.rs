//! Fetcher trait for retrieving documents by locator.

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::document::Document;

/// Fetches raw documents.
///
/// Implementations follow redirects, surface the HTTP status and apply a
/// timeout. Failures are returned, never retried internally; retrying is
/// the caller's decision.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a single locator.
    async fn fetch(&self, url: &str) -> FetchResult<Document>;

    /// Fetcher name for logging.
    fn name(&self) -> &str;
}
