//! Scrape requests accepted at the boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Format tag a restaurant's lunch menu is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuFormat {
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "TEXT")]
    Text,
    #[serde(rename = "IMAGE")]
    Image,
    #[serde(rename = "FACEBOOK POST")]
    FacebookPost,
    #[serde(rename = "DYNAMIC")]
    Dynamic,
}

impl MenuFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Text => "TEXT",
            Self::Image => "IMAGE",
            Self::FacebookPost => "FACEBOOK POST",
            Self::Dynamic => "DYNAMIC",
        }
    }
}

impl fmt::Display for MenuFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MenuFormat {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_uppercase()
            .replace(['_', '-'], " ");
        match normalized.as_str() {
            "PDF" => Ok(Self::Pdf),
            "TEXT" => Ok(Self::Text),
            "IMAGE" => Ok(Self::Image),
            "FACEBOOK POST" | "FACEBOOK" => Ok(Self::FacebookPost),
            "DYNAMIC" => Ok(Self::Dynamic),
            _ => Err(ExtractionError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// A concrete PDF extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Structural text layer, no OCR
    DirectText,

    /// Contour-detected regions, OCR per region
    RegionOcr,

    /// Preprocessed whole-page OCR plus targeted weekly sections
    WholePageOcr,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectText => "direct_text",
            Self::RegionOcr => "region_ocr",
            Self::WholePageOcr => "whole_page_ocr",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied strategy hint. Automatic is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyHint {
    #[default]
    Auto,
    Fixed(Strategy),
}

impl FromStr for StrategyHint {
    type Err = ExtractionError;

    /// Accepts strategy names and the legacy solution numbers 1/2/3.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "" | "auto" | "automatic" => Ok(Self::Auto),
            "1" | "region" | "region_ocr" => Ok(Self::Fixed(Strategy::RegionOcr)),
            "2" | "direct" | "direct_text" => Ok(Self::Fixed(Strategy::DirectText)),
            "3" | "whole_page" | "whole_page_ocr" => Ok(Self::Fixed(Strategy::WholePageOcr)),
            other => Err(ExtractionError::Config(format!(
                "unknown strategy hint: {other}"
            ))),
        }
    }
}

/// A request to scrape one restaurant's menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub format: MenuFormat,

    /// Locator of the menu (or of a page listing menu documents)
    pub url: String,

    /// Strategy hint, only meaningful for PDF
    #[serde(default)]
    pub hint: StrategyHint,
}

impl ScrapeRequest {
    pub fn new(format: MenuFormat, url: impl Into<String>) -> Self {
        Self {
            format,
            url: url.into(),
            hint: StrategyHint::Auto,
        }
    }

    pub fn with_hint(mut self, hint: StrategyHint) -> Self {
        self.hint = hint;
        self
    }
}
