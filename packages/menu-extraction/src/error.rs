//! Typed errors for the menu extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Heuristics never return
//! errors; only collaborators (fetch, rasterize, OCR, semantic service,
//! storage) and the dispatch layer do.

use std::fmt;

use thiserror::Error;

/// Errors that can occur while turning a document into menu text or items.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Fetching a document failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The requested menu format is not one we know how to handle
    #[error("unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// The document could not be rendered into page images
    #[error("rasterization failed: {0}")]
    Rasterize(String),

    /// The Document Gate (or link discovery) left nothing to process
    #[error("no qualifying document found at: {url}")]
    NoDocumentFound { url: String },

    /// The document's embedded text layer could not be read
    #[error("text layer unreadable: {0}")]
    TextLayer(String),

    /// Every strategy ran and none produced usable text
    #[error("no extractable text in: {url}")]
    NoExtractableText { url: String },

    /// OCR ran but produced no usable text
    #[error("OCR produced no usable text for: {url}")]
    OcrEmpty { url: String },

    /// The OCR engine itself failed (not a quality issue)
    #[error("OCR engine error: {0}")]
    Ocr(String),

    /// Image decoding or preprocessing failed
    #[error("image error: {0}")]
    Imaging(String),

    /// A week label could not be turned into a calendar week
    #[error("week number unresolved: {week}")]
    WeekUnresolved { week: String },

    /// The semantic service answered with something that is not a menu array
    #[error("malformed semantic-service response: {0}")]
    MalformedResponse(String),

    /// Semantic service unavailable or failed
    #[error("semantic service error: {0}")]
    Interpreter(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while fetching a document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed at the transport level
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Request timed out
    #[error("timeout fetching: {url}")]
    Timeout { url: String },
}

/// Stable, user-visible error category reported at the boundary.
///
/// "No menu keywords found" and "network timeout" must be distinguishable,
/// so each error kind maps to its own category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    FetchFailure,
    UnsupportedFormat,
    RasterizationFailure,
    NoDocumentFound,
    NoExtractableText,
    OcrEmpty,
    WeekUnresolved,
    MalformedResponse,
    ServiceFailure,
    StorageFailure,
    Configuration,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchFailure => "fetch_failure",
            Self::UnsupportedFormat => "unsupported_format",
            Self::RasterizationFailure => "rasterization_failure",
            Self::NoDocumentFound => "no_document_found",
            Self::NoExtractableText => "no_extractable_text",
            Self::OcrEmpty => "ocr_empty",
            Self::WeekUnresolved => "week_unresolved",
            Self::MalformedResponse => "malformed_response",
            Self::ServiceFailure => "service_failure",
            Self::StorageFailure => "storage_failure",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExtractionError {
    /// Category reported to callers at the boundary.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::FetchFailure,
            Self::UnsupportedFormat { .. } => ErrorCategory::UnsupportedFormat,
            Self::Rasterize(_) => ErrorCategory::RasterizationFailure,
            Self::NoDocumentFound { .. } => ErrorCategory::NoDocumentFound,
            Self::NoExtractableText { .. } | Self::TextLayer(_) => {
                ErrorCategory::NoExtractableText
            }
            Self::OcrEmpty { .. } | Self::Ocr(_) | Self::Imaging(_) => ErrorCategory::OcrEmpty,
            Self::WeekUnresolved { .. } => ErrorCategory::WeekUnresolved,
            Self::MalformedResponse(_) | Self::Json(_) => ErrorCategory::MalformedResponse,
            Self::Interpreter(_) => ErrorCategory::ServiceFailure,
            Self::Storage(_) => ErrorCategory::StorageFailure,
            Self::Config(_) => ErrorCategory::Configuration,
        }
    }

    /// Whether this error aborts the current document outright.
    ///
    /// Only fetch and rasterization failures are hard; everything else is
    /// "insufficient signal" and lets the caller try the next candidate.
    pub fn is_hard_failure(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Rasterize(_))
    }
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
