//! OCR adapter trait.

use async_trait::async_trait;
use image::DynamicImage;

use crate::error::Result;

/// Segmentation assumption handed to the OCR engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcrMode {
    /// Default page segmentation (whole pages)
    Page,

    /// Assume a single uniform block of text (regions, photographed menus)
    SingleBlock,
}

impl OcrMode {
    /// Tesseract page segmentation mode number.
    pub fn psm(&self) -> u8 {
        match self {
            Self::Page => 3,
            Self::SingleBlock => 6,
        }
    }
}

/// Which kind of source the image came from; selects the engine mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// Rendered document page or a crop of one
    Document,

    /// Photograph or web image of a menu
    Photo,
}

/// Optical character recognition.
///
/// Low-quality or empty output is a valid result (an empty string), not an
/// error. Errors mean the engine itself could not run.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(
        &self,
        image: &DynamicImage,
        mode: OcrMode,
        source: ImageSource,
    ) -> Result<String>;
}
