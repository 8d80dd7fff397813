//! Document types - fetched documents, rendered pages, regions, text.

use chrono::{DateTime, Utc};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Content classification of a fetched document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    Pdf,
    Image,
    Html,
    Other,
}

impl ContentKind {
    /// Classify from a content-type header, falling back to the locator's
    /// file extension when the header is missing or generic.
    pub fn classify(content_type: Option<&str>, url: &str) -> Self {
        let header = content_type
            .map(|ct| ct.split(';').next().unwrap_or("").trim().to_lowercase())
            .unwrap_or_default();

        if header == "application/pdf" {
            return Self::Pdf;
        }
        if header.starts_with("image/") {
            return Self::Image;
        }
        if header == "text/html" || header == "application/xhtml+xml" || header == "text/plain" {
            return Self::Html;
        }

        let path = url
            .split(['?', '#'])
            .next()
            .unwrap_or("")
            .to_lowercase();
        if path.ends_with(".pdf") {
            Self::Pdf
        } else if [".png", ".jpg", ".jpeg", ".gif", ".webp"]
            .iter()
            .any(|ext| path.ends_with(ext))
        {
            Self::Image
        } else if header.is_empty() || path.ends_with(".html") || path.ends_with(".htm") {
            Self::Html
        } else {
            Self::Other
        }
    }
}

/// A fetched document.
///
/// Immutable once fetched and never cached across calls.
#[derive(Debug, Clone)]
pub struct Document {
    /// Locator the document was requested from
    pub url: String,

    /// Locator after redirects
    pub final_url: String,

    /// HTTP status (200 for non-HTTP sources)
    pub status: u16,

    /// Raw content-type header, if any
    pub content_type: Option<String>,

    /// Classified content kind
    pub kind: ContentKind,

    /// Raw bytes
    pub bytes: Vec<u8>,

    /// When the document was fetched
    pub fetched_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document, classifying it from the content type and URL.
    pub fn new(url: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        let url = url.into();
        let kind = ContentKind::classify(content_type.as_deref(), &url);
        Self {
            final_url: url.clone(),
            url,
            status: 200,
            content_type,
            kind,
            bytes,
            fetched_at: Utc::now(),
        }
    }

    /// Set the final URL after redirects.
    pub fn with_final_url(mut self, final_url: impl Into<String>) -> Self {
        self.final_url = final_url.into();
        self
    }

    /// Set the HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Decode the body as (lossy) UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Whether the content-type header explicitly says PDF.
    pub fn declares_pdf(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_lowercase().contains("application/pdf"))
            .unwrap_or(false)
    }
}

/// One rasterized page of a document.
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page index
    pub index: usize,

    /// Rendered page image
    pub image: DynamicImage,
}

impl Page {
    pub fn new(index: usize, image: DynamicImage) -> Self {
        Self { index, image }
    }
}

/// A rectangular region of interest on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Smallest region covering both.
    pub fn union(&self, other: &Region) -> Region {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Region::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Reading-order key: top first, then left.
    pub fn reading_key(&self) -> (u32, u32) {
        (self.y, self.x)
    }

    /// Crop this region out of a page image.
    ///
    /// The rectangle is clamped to the image bounds.
    pub fn crop(&self, image: &DynamicImage) -> DynamicImage {
        image.crop_imm(self.x, self.y, self.width, self.height)
    }
}

/// Text extracted from a page or region, with provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,

    /// 1-based page index
    pub page_index: usize,

    /// Region the text came from, None for whole-page OCR
    pub region: Option<Region>,
}

impl ExtractedText {
    pub fn page(page_index: usize, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page_index,
            region: None,
        }
    }

    pub fn region(page_index: usize, region: Region, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page_index,
            region: Some(region),
        }
    }

    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Assemble extracted texts in page order, then region order within a page.
///
/// Parts are grouped by page; texts within a page are joined by a newline,
/// pages by a blank line. Blank parts are skipped. The relative order of
/// parts that share a page is kept as given (regions arrive in reading order).
pub fn assemble(parts: &[ExtractedText]) -> String {
    let mut ordered: Vec<&ExtractedText> = parts.iter().filter(|p| p.has_content()).collect();
    ordered.sort_by_key(|p| p.page_index);

    let mut pages: Vec<String> = Vec::new();
    let mut current: Option<usize> = None;
    for part in ordered {
        let text = part.text.trim();
        if current == Some(part.page_index) {
            if let Some(last) = pages.last_mut() {
                last.push('\n');
                last.push_str(text);
            }
        } else {
            pages.push(text.to_string());
            current = Some(part.page_index);
        }
    }

    pages.join("\n\n")
}
