//! Configuration for the extraction pipeline.
//!
//! Every threshold and keyword list lives here and is passed in at
//! construction time; nothing reads process-wide state at run time.

use serde::{Deserialize, Serialize};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Worker count used when the caller has no preference: one per core.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Configuration for the extraction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Direct text is accepted when its trimmed length exceeds this.
    ///
    /// Default: 50.
    pub min_direct_text_chars: usize,

    /// Region-based OCR skips documents with more pages than this.
    ///
    /// Default: 2.
    pub max_region_pages: usize,

    /// Automatic mode picks region OCR when page 1 has more qualifying
    /// regions than this.
    ///
    /// Default: 10.
    pub auto_region_threshold: usize,

    /// Filename keywords that make a document relevant (lowercase).
    pub gate_keywords: Vec<String>,

    /// Body keywords that confirm a rendered document is a lunch menu (lowercase).
    pub menu_keywords: Vec<String>,

    /// Uppercase keywords that start a new section when organizing text.
    pub section_keywords: Vec<String>,

    /// Weekly-special headings pulled out of the first page.
    pub special_sections: Vec<String>,

    /// Keywords an OCR'd image must contain to count as a menu.
    pub image_keywords: Vec<String>,

    /// Images smaller than this (either side) are skipped as logos/icons.
    pub min_image_width: u32,
    pub min_image_height: u32,

    /// Narrow OCR output to the lines around weekday names.
    ///
    /// Default: false (whole OCR text is kept).
    pub narrow_to_day_sentences: bool,

    /// Keywords a social post must contain to be picked (lowercase).
    pub post_keywords: Vec<String>,

    /// CSS selector of the menu element on rendered pages.
    ///
    /// Default: `#menu`.
    pub menu_selector: String,

    pub preprocess: PreprocessConfig,
    pub segment: SegmentConfig,
    pub ocr: OcrConfig,
    pub raster: RasterConfig,
    pub fetch: FetchConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_direct_text_chars: 50,
            max_region_pages: 2,
            auto_region_threshold: 10,
            gate_keywords: strings(&["lunch", "dagens"]),
            menu_keywords: strings(&["lunch", "dagens", "lunch menu"]),
            section_keywords: strings(&["MÅNDAG", "TISDAG", "ONSDAG", "TORSDAG", "FREDAG", "VECKANS"]),
            special_sections: strings(&["Veckans Fisk", "Veckans Vegetariska"]),
            image_keywords: strings(&[
                "lunchmeny", "veckans", "meny", "måndag", "tisdag", "onsdag", "torsdag", "fredag",
                "lördag", "söndag", "serveras", "pris",
            ]),
            min_image_width: 400,
            min_image_height: 400,
            narrow_to_day_sentences: false,
            post_keywords: strings(&["lunch", "dagens"]),
            menu_selector: "#menu".to_string(),
            preprocess: PreprocessConfig::default(),
            segment: SegmentConfig::default(),
            ocr: OcrConfig::default(),
            raster: RasterConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the direct-text acceptance threshold.
    pub fn with_min_direct_text_chars(mut self, chars: usize) -> Self {
        self.min_direct_text_chars = chars;
        self
    }

    /// Set the page limit for region OCR.
    pub fn with_max_region_pages(mut self, pages: usize) -> Self {
        self.max_region_pages = pages;
        self
    }

    /// Set the region-count threshold used by automatic selection.
    pub fn with_auto_region_threshold(mut self, regions: usize) -> Self {
        self.auto_region_threshold = regions;
        self
    }

    /// Set the minimum region area.
    pub fn with_min_region_area(mut self, area: u64) -> Self {
        self.segment.min_area = area;
        self
    }

    /// Narrow OCR output to weekday windows.
    pub fn with_day_sentences(mut self, enabled: bool) -> Self {
        self.narrow_to_day_sentences = enabled;
        self
    }

    /// Set the OCR language.
    pub fn with_ocr_language(mut self, language: impl Into<String>) -> Self {
        self.ocr.language = language.into();
        self
    }

    /// Cap how many OCR calls one document runs at once.
    pub fn with_ocr_concurrency(mut self, calls: usize) -> Self {
        self.ocr.max_concurrent = calls.max(1);
        self
    }

    /// Set the tesseract executable.
    pub fn with_tesseract_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.ocr.tesseract_cmd = cmd.into();
        self
    }

    /// Set the pdftoppm executable.
    pub fn with_pdftoppm_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.raster.pdftoppm_cmd = cmd.into();
        self
    }

    /// Set the fetch timeout.
    pub fn with_fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch.timeout_secs = secs;
        self
    }
}

/// Image preprocessing profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Adaptive threshold window radius (window = 2r + 1).
    pub adaptive_block_radius: u32,

    /// Upscale factor applied before OCR.
    pub upscale: f32,

    /// Median smoothing radius applied before binarization.
    pub denoise_radius: u32,

    /// Global binarization level.
    pub binarize_level: u8,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            adaptive_block_radius: 5,
            upscale: 1.5,
            denoise_radius: 1,
            binarize_level: 150,
        }
    }
}

/// Region segmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Bounding boxes smaller than this (px²) are noise, rules or logos.
    pub min_area: u64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self { min_area: 1000 }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Path or name of the tesseract executable.
    pub tesseract_cmd: String,

    /// Recognition language.
    pub language: String,

    /// Engine mode (oem) for rendered document pages.
    pub document_engine_mode: u8,

    /// Engine mode (oem) for photographed menus.
    pub photo_engine_mode: u8,

    /// OCR calls one document may run at once (pages and regions).
    ///
    /// Default: one per core.
    pub max_concurrent: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".to_string(),
            language: "swe".to_string(),
            document_engine_mode: 3,
            photo_engine_mode: 1,
            max_concurrent: default_concurrency(),
        }
    }
}

/// Rasterizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Path or name of the pdftoppm executable.
    pub pdftoppm_cmd: String,

    /// Render resolution.
    pub dpi: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            pdftoppm_cmd: "pdftoppm".to_string(),
            dpi: 200,
        }
    }
}

/// Fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "LunchMenuBot/1.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"auto_region_threshold": 4, "ocr": {"language": "eng"}}"#)
                .unwrap();

        assert_eq!(config.auto_region_threshold, 4);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.tesseract_cmd, "tesseract");
        assert_eq!(config.min_direct_text_chars, 50);
        assert_eq!(config.segment.min_area, 1000);
        assert!(config.ocr.max_concurrent >= 1);
    }

    #[test]
    fn test_builders() {
        let config = PipelineConfig::new()
            .with_min_region_area(500)
            .with_max_region_pages(3)
            .with_day_sentences(true)
            .with_ocr_concurrency(0);

        assert_eq!(config.ocr.max_concurrent, 1);
        assert_eq!(config.segment.min_area, 500);
        assert_eq!(config.max_region_pages, 3);
        assert!(config.narrow_to_day_sentences);
    }
}
