//! Testing utilities including mock implementations.
//!
//! These let applications exercise the pipeline without OCR binaries,
//! PDF tooling, browsers or a semantic service.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use image::{DynamicImage, GrayImage, ImageFormat, Luma};

use crate::error::{ExtractionError, Result};
use crate::traits::{
    interpreter::MenuInterpreter,
    ocr::{ImageSource, OcrEngine, OcrMode},
    raster::{Rasterizer, TextLayer},
    render::PageRenderer,
};
use crate::types::{document::Page, menu::MenuItem};

/// A blank (white) page image.
pub fn blank_page(index: usize) -> Page {
    Page::new(
        index,
        DynamicImage::ImageLuma8(GrayImage::from_pixel(200, 200, Luma([255]))),
    )
}

/// PNG bytes of a blank image of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([255])));
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// A mock OCR engine.
///
/// Answers queued responses first (in call order), then the default text.
#[derive(Default, Clone)]
pub struct MockOcr {
    default_text: Arc<RwLock<String>>,
    responses: Arc<RwLock<VecDeque<String>>>,
    fail: bool,

    /// 1-based call numbers that fail
    fail_on: Arc<RwLock<Vec<usize>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<(OcrMode, ImageSource)>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockOcr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text returned when no queued response is left.
    pub fn with_default_text(self, text: impl Into<String>) -> Self {
        *self.default_text.write().unwrap() = text.into();
        self
    }

    /// Queue a response for the next call.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.responses.write().unwrap().push_back(text.into());
        self
    }

    /// Make every call fail as if the engine could not run.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Make only the `n`th call (1-based) fail.
    pub fn failing_on_call(self, n: usize) -> Self {
        self.fail_on.write().unwrap().push(n);
        self
    }

    /// Most calls that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Modes of all calls, in order.
    pub fn calls(&self) -> Vec<OcrMode> {
        self.calls.read().unwrap().iter().map(|(m, _)| *m).collect()
    }

    /// Image sources of all calls, in order.
    pub fn sources(&self) -> Vec<ImageSource> {
        self.calls.read().unwrap().iter().map(|(_, s)| *s).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl OcrEngine for MockOcr {
    async fn recognize(
        &self,
        _image: &DynamicImage,
        mode: OcrMode,
        source: ImageSource,
    ) -> Result<String> {
        let call = {
            let mut calls = self.calls.write().unwrap();
            calls.push((mode, source));
            calls.len()
        };
        let fails = self.fail || self.fail_on.read().unwrap().contains(&call);
        let queued = if fails {
            None
        } else {
            self.responses.write().unwrap().pop_front()
        };

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if fails {
            return Err(ExtractionError::Ocr("mock OCR failure".to_string()));
        }
        Ok(queued.unwrap_or_else(|| self.default_text.read().unwrap().clone()))
    }
}

/// A mock rasterizer returning canned pages.
#[derive(Default, Clone)]
pub struct MockRasterizer {
    pages: Arc<RwLock<Vec<Page>>>,
    fail: bool,
    calls: Arc<RwLock<usize>>,
}

impl MockRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(self, pages: Vec<Page>) -> Self {
        *self.pages.write().unwrap() = pages;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.read().unwrap()
    }
}

#[async_trait]
impl Rasterizer for MockRasterizer {
    async fn rasterize(&self, _bytes: &[u8]) -> Result<Vec<Page>> {
        *self.calls.write().unwrap() += 1;
        if self.fail {
            return Err(ExtractionError::Rasterize("mock corrupt document".to_string()));
        }
        Ok(self.pages.read().unwrap().clone())
    }
}

/// A mock text layer. Empty unless configured.
#[derive(Default, Clone)]
pub struct MockTextLayer {
    text: Option<String>,
    fail: bool,
}

impl MockTextLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl TextLayer for MockTextLayer {
    async fn extract_text(&self, _bytes: &[u8]) -> Result<String> {
        if self.fail {
            return Err(ExtractionError::TextLayer("mock unreadable".to_string()));
        }
        Ok(self.text.clone().unwrap_or_default())
    }
}

/// A mock page renderer serving HTML by URL.
#[derive(Default, Clone)]
pub struct MockRenderer {
    pages: Arc<RwLock<HashMap<String, String>>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), html.into());
        self
    }
}

#[async_trait]
impl PageRenderer for MockRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ExtractionError::NoDocumentFound {
                url: url.to_string(),
            })
    }
}

/// A mock semantic service.
#[derive(Default, Clone)]
pub struct MockInterpreter {
    items: Arc<RwLock<Vec<MenuItem>>>,
    malformed: bool,

    /// Texts received, in call order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items returned for every call.
    pub fn with_items(self, items: Vec<MenuItem>) -> Self {
        *self.items.write().unwrap() = items;
        self
    }

    /// Answer every call with a malformed response.
    pub fn malformed(mut self) -> Self {
        self.malformed = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl MenuInterpreter for MockInterpreter {
    async fn interpret(&self, text: &str, _instructions: Option<&str>) -> Result<Vec<MenuItem>> {
        self.calls.write().unwrap().push(text.to_string());
        if self.malformed {
            return Err(ExtractionError::MalformedResponse(
                "expected a JSON array".to_string(),
            ));
        }
        Ok(self.items.read().unwrap().clone())
    }
}
