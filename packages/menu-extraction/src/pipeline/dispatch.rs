//! Format dispatch - the entry point from a scrape request to menu text.

use std::sync::Arc;

use tracing::{info, warn};

use crate::engines::{PdfTextLayer, PopplerRasterizer, StaticRenderer, TesseractOcr};
use crate::error::{ExtractionError, Result};
use crate::pipeline::dates::{resolve_menu_dates, DateWarning};
use crate::pipeline::strategy::Engines;
use crate::security::SecretString;
use crate::traits::{
    fetcher::Fetcher,
    interpreter::MenuInterpreter,
    ocr::OcrEngine,
    raster::{Rasterizer, TextLayer},
    render::PageRenderer,
};
use crate::types::{
    config::PipelineConfig,
    menu::MenuItem,
    request::{MenuFormat, ScrapeRequest},
};

/// Default Graph API root for social posts.
pub const GRAPH_API_BASE: &str = "https://graph.facebook.com/v12.0";

/// Result of a full scrape: text, resolved items and resolver warnings.
#[derive(Debug, Clone)]
pub struct MenuScrape {
    pub text: String,
    pub items: Vec<MenuItem>,
    pub warnings: Vec<DateWarning>,
}

/// Turns scrape requests into menu text (and, with an interpreter, into
/// dated menu items).
///
/// Collaborators default to the reference implementations and can be
/// swapped with the `with_*` builders.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use menu_extraction::{HttpFetcher, MenuPipeline, PipelineConfig, ScrapeRequest, MenuFormat};
///
/// let pipeline = MenuPipeline::new(PipelineConfig::default(), Arc::new(HttpFetcher::new()));
/// let text = pipeline
///     .extract_text(&ScrapeRequest::new(MenuFormat::Pdf, "https://example.com/lunch"))
///     .await?;
/// ```
pub struct MenuPipeline {
    pub(crate) config: PipelineConfig,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) engines: Engines,
    pub(crate) renderer: Arc<dyn PageRenderer>,
    pub(crate) facebook_token: Option<SecretString>,
    pub(crate) graph_base: String,
    interpreter: Option<Arc<dyn MenuInterpreter>>,
}

impl MenuPipeline {
    /// Create a pipeline with the reference OCR, rasterizer, text layer and
    /// a non-scripting renderer.
    pub fn new(config: PipelineConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let engines = Engines {
            ocr: Arc::new(TesseractOcr::new(config.ocr.clone())),
            rasterizer: Arc::new(PopplerRasterizer::new(config.raster.clone())),
            text_layer: Arc::new(PdfTextLayer::new()),
        };
        Self {
            renderer: Arc::new(StaticRenderer::new(Arc::clone(&fetcher))),
            config,
            fetcher,
            engines,
            facebook_token: None,
            graph_base: GRAPH_API_BASE.to_string(),
            interpreter: None,
        }
    }

    pub fn with_ocr(mut self, ocr: Arc<dyn OcrEngine>) -> Self {
        self.engines.ocr = ocr;
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.engines.rasterizer = rasterizer;
        self
    }

    pub fn with_text_layer(mut self, text_layer: Arc<dyn TextLayer>) -> Self {
        self.engines.text_layer = text_layer;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Access token for social page posts.
    pub fn with_facebook_token(mut self, token: impl Into<SecretString>) -> Self {
        self.facebook_token = Some(token.into());
        self
    }

    /// Override the Graph API root (tests, API version bumps).
    pub fn with_graph_base_url(mut self, base: impl Into<String>) -> Self {
        self.graph_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_interpreter(mut self, interpreter: Arc<dyn MenuInterpreter>) -> Self {
        self.interpreter = Some(interpreter);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract menu text for a request.
    ///
    /// Empty text is never returned; "nothing found" is an error with its
    /// own category.
    pub async fn extract_text(&self, request: &ScrapeRequest) -> Result<String> {
        let url = request.url.trim();
        if url.is_empty() {
            return Err(ExtractionError::Config("empty menu locator".to_string()));
        }

        info!(
            format = %request.format,
            url = %url,
            hint = ?request.hint,
            "Scrape request received"
        );

        let text = match request.format {
            MenuFormat::Pdf => self.pdf_menu(url, request.hint).await,
            MenuFormat::Image => self.image_menu(url).await,
            MenuFormat::Text => self.text_menu(url).await,
            MenuFormat::FacebookPost => self.facebook_menu(url).await,
            MenuFormat::Dynamic => self.dynamic_menu(url).await,
        };

        match &text {
            Ok(text) => info!(url = %url, chars = text.len(), "Menu text extracted"),
            Err(e) => warn!(url = %url, category = %e.category(), error = %e, "Menu text extraction failed"),
        }
        text
    }

    /// Extract text, interpret it into items and resolve their dates for
    /// `year`.
    pub async fn scrape(&self, request: &ScrapeRequest, year: i32) -> Result<MenuScrape> {
        let interpreter = self.interpreter.as_ref().ok_or_else(|| {
            ExtractionError::Config("no menu interpreter configured".to_string())
        })?;

        let text = self.extract_text(request).await?;
        let mut items = interpreter.interpret(&text, None).await?;
        let warnings = resolve_menu_dates(&mut items, year);

        info!(
            url = %request.url,
            items = items.len(),
            warnings = warnings.len(),
            "Menu interpreted"
        );

        Ok(MenuScrape {
            text,
            items,
            warnings,
        })
    }
}
