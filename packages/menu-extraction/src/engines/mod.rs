//! Reference implementations of the OCR, rasterizer, text-layer and
//! renderer collaborators.

pub mod pdf_text;
pub mod poppler;
pub mod render;
pub mod tesseract;

pub use pdf_text::PdfTextLayer;
pub use poppler::PopplerRasterizer;
pub use render::{PlaywrightRenderer, StaticRenderer};
pub use tesseract::TesseractOcr;
