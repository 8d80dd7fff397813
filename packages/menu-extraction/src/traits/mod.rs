//! Core trait abstractions for the menu extraction library.
//!
//! These traits are the seams to the collaborators the pipeline does not
//! own: fetching, page rendering, OCR, the semantic service and storage.

pub mod fetcher;
pub mod interpreter;
pub mod ocr;
pub mod raster;
pub mod render;
pub mod store;
