//! Extraction pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Format dispatch (PDF, image, web text, social post, rendered page)
//! - Strategy selection for PDFs (direct text, region OCR, whole-page OCR)
//! - Menu date resolution
//! - Batch refresh into a store

pub mod batch;
pub mod dates;
pub mod dispatch;
pub mod formats;
pub mod strategy;

pub use batch::{default_concurrency, refresh_all, RefreshFailure, RefreshReport};
pub use dates::{resolve_menu_dates, week_start, DateWarning, DateWarningKind};
pub use dispatch::{MenuPipeline, MenuScrape, GRAPH_API_BASE};
pub use formats::{facebook_page_id, pick_post};
pub use strategy::{choose_ocr_strategy, Engines, StrategyRunner};
