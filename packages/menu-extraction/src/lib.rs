//! Lunch Menu Extraction Library
//!
//! Turns restaurant menu locators (PDFs, menu photos, web pages, social
//! posts, script-rendered pages) into plain text, hands the text to a
//! semantic service for structuring, and pins the resulting dishes to
//! concrete dates.
//!
//! # Design Philosophy
//!
//! - Heuristics are pure functions over text; they never fail
//! - Every collaborator (fetching, OCR, rasterizing, rendering, the
//!   semantic service, storage) sits behind a trait
//! - "Nothing found" is a categorized error, never an empty string
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use menu_extraction::{HttpFetcher, MenuFormat, MenuPipeline, PipelineConfig, ScrapeRequest};
//!
//! let config = PipelineConfig::default();
//! let pipeline = MenuPipeline::new(config.clone(), Arc::new(HttpFetcher::from_config(&config.fetch)));
//!
//! let text = pipeline
//!     .extract_text(&ScrapeRequest::new(MenuFormat::Pdf, "https://example.com/lunch"))
//!     .await?;
//! ```
//!
//! # Modules
//!
//! - [`gate`] - Document Gate and PDF link discovery
//! - [`heuristics`] - Text heuristics (weeks, days, sections, keywords)
//! - [`imaging`] - Image preprocessing and region segmentation
//! - [`engines`] - Reference OCR, rasterizer, text layer and renderers
//! - [`pipeline`] - Strategies, format dispatch, date resolution, batch refresh
//! - [`stores`] - Storage implementations
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod engines;
pub mod error;
pub mod fetchers;
pub mod gate;
pub mod heuristics;
pub mod html;
pub mod imaging;
pub mod pipeline;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ErrorCategory, ExtractionError, FetchError, Result};
pub use traits::{
    fetcher::Fetcher,
    interpreter::MenuInterpreter,
    ocr::{ImageSource, OcrEngine, OcrMode},
    raster::{Rasterizer, TextLayer},
    render::PageRenderer,
    store::MenuStore,
};
pub use types::{
    config::PipelineConfig,
    document::{assemble, ContentKind, Document, ExtractedText, Page, Region},
    menu::{MenuItem, WeekField},
    request::{MenuFormat, ScrapeRequest, Strategy, StrategyHint},
    restaurant::{Periodicity, Restaurant},
    week::WeekNumber,
};

// Re-export pipeline components
pub use pipeline::{
    refresh_all, resolve_menu_dates, DateWarning, MenuPipeline, MenuScrape, RefreshReport,
    StrategyRunner,
};

pub use engines::{PdfTextLayer, PlaywrightRenderer, PopplerRasterizer, StaticRenderer, TesseractOcr};
pub use fetchers::{HttpFetcher, MockFetcher};
pub use security::{SecretString, ServiceCredentials};
pub use stores::MemoryMenuStore;

#[cfg(feature = "openai")]
pub use ai::OpenAiInterpreter;

// Re-export testing utilities
pub use testing::{MockInterpreter, MockOcr, MockRasterizer, MockRenderer, MockTextLayer};
