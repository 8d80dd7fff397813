//! Rasterizer and text-layer traits for paginated documents.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::document::Page;

/// Renders a paginated document into ordered page images.
///
/// Same bytes produce the same pages. No page cap is applied here; skipping
/// long documents is a strategy decision.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, bytes: &[u8]) -> Result<Vec<Page>>;
}

/// Extracts the structural (selectable) text of a document without OCR.
#[async_trait]
pub trait TextLayer: Send + Sync {
    async fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}
