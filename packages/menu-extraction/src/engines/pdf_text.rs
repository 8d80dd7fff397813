//! Structural text layer of a PDF, read with `pdf-extract`.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ExtractionError, Result};
use crate::traits::raster::TextLayer;

/// Reads the embedded text of a PDF without rendering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextLayer;

impl PdfTextLayer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextLayer for PdfTextLayer {
    async fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        let bytes = bytes.to_vec();
        // pdf-extract panics on some malformed inputs; the join error catches it
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| ExtractionError::TextLayer(e.to_string()))?
            .map_err(|e| ExtractionError::TextLayer(e.to_string()))?;

        debug!(chars = text.trim().len(), "PDF text layer extracted");
        Ok(text)
    }
}
