//! Extraction strategies for paginated documents.
//!
//! Three ways to get text out of a PDF:
//! - Direct text: read the embedded text layer, no OCR
//! - Region OCR: find text blocks on each page and recognize them one by one
//! - Whole-page OCR: preprocess and recognize each page as a unit
//!
//! Automatic selection tries direct text first and otherwise looks at how
//! fragmented page 1 is. Every strategy returns `Ok(None)` when it finds
//! too little signal; errors are reserved for failures (rasterization,
//! OCR engine). A failed region is recognized as empty text instead.
//!
//! At most `ocr.max_concurrent` OCR calls run at once per document.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::{ExtractionError, Result};
use crate::heuristics::{
    annotate_with_locator_week, clean_and_organize, contains_any, extract_day_sentences,
    extract_special_sections, extract_week_number, extract_week_number_from_locator, prefix_week,
};
use crate::imaging::{contour_profile, count_regions, crop_regions, ocr_profile, segment};
use crate::traits::ocr::{ImageSource, OcrEngine, OcrMode};
use crate::traits::raster::{Rasterizer, TextLayer};
use crate::types::config::PipelineConfig;
use crate::types::document::{assemble, ExtractedText, Page};
use crate::types::request::{Strategy, StrategyHint};

/// The collaborators a strategy needs.
#[derive(Clone)]
pub struct Engines {
    pub ocr: Arc<dyn OcrEngine>,
    pub rasterizer: Arc<dyn Rasterizer>,
    pub text_layer: Arc<dyn TextLayer>,
}

/// Pick between the two OCR strategies from the fragmentation of page 1.
pub fn choose_ocr_strategy(first_page_regions: usize, threshold: usize) -> Strategy {
    if first_page_regions > threshold {
        Strategy::RegionOcr
    } else {
        Strategy::WholePageOcr
    }
}

/// Run CPU-bound image work off the async runtime.
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ExtractionError::Imaging(e.to_string()))?
}

/// Runs strategies over one document.
pub struct StrategyRunner<'a> {
    engines: &'a Engines,
    config: &'a PipelineConfig,
}

impl<'a> StrategyRunner<'a> {
    pub fn new(engines: &'a Engines, config: &'a PipelineConfig) -> Self {
        Self { engines, config }
    }

    /// Extract text from a PDF following `hint`.
    ///
    /// Pages are rasterized at most once per call.
    pub async fn run(&self, bytes: &[u8], url: &str, hint: StrategyHint) -> Result<Option<String>> {
        match hint {
            StrategyHint::Fixed(Strategy::DirectText) => {
                if let Some(text) = self.direct_text(bytes).await {
                    return Ok(Some(annotate_with_locator_week(&text, url)));
                }
                info!(url = %url, "Text layer insufficient, falling back to plain page OCR");
                let pages = self.engines.rasterizer.rasterize(bytes).await?;
                let text = self.plain_ocr(&pages).await?;
                Ok(text.map(|t| annotate_with_locator_week(&t, url)))
            }
            StrategyHint::Fixed(Strategy::RegionOcr) => {
                let pages = self.engines.rasterizer.rasterize(bytes).await?;
                self.region_ocr(&pages, url).await
            }
            StrategyHint::Fixed(Strategy::WholePageOcr) => {
                let pages = self.engines.rasterizer.rasterize(bytes).await?;
                let text = self.whole_page_ocr(&pages).await?;
                Ok(text.map(|t| annotate_with_locator_week(&t, url)))
            }
            StrategyHint::Auto => self.auto(bytes, url).await,
        }
    }

    async fn auto(&self, bytes: &[u8], url: &str) -> Result<Option<String>> {
        if let Some(text) = self.direct_text(bytes).await {
            info!(url = %url, strategy = "direct_text", "Strategy selected");
            return Ok(Some(annotate_with_locator_week(&text, url)));
        }

        let pages = self.engines.rasterizer.rasterize(bytes).await?;
        let Some(first) = pages.first() else {
            return Ok(None);
        };

        let regions = self.count_first_page_regions(&first.image).await;
        let strategy = choose_ocr_strategy(regions, self.config.auto_region_threshold);
        info!(
            url = %url,
            pages = pages.len(),
            regions,
            strategy = strategy.as_str(),
            "Strategy selected"
        );

        match strategy {
            Strategy::RegionOcr => self.region_ocr(&pages, url).await,
            _ => {
                let text = self.whole_page_ocr(&pages).await?;
                Ok(text.map(|t| annotate_with_locator_week(&t, url)))
            }
        }
    }

    async fn count_first_page_regions(&self, image: &DynamicImage) -> usize {
        let image = image.clone();
        let preprocess = self.config.preprocess.clone();
        let min_area = self.config.segment.min_area;

        let counted = blocking(move || {
            let binary = contour_profile(&image, &preprocess)?;
            Ok(count_regions(&binary, min_area))
        })
        .await;

        counted.unwrap_or_else(|e| {
            warn!(error = %e, "Region count failed, assuming an unfragmented page");
            0
        })
    }

    /// Direct text: the text layer, accepted when long enough, organized into
    /// sections. `None` when the layer is missing, unreadable or too short.
    pub async fn direct_text(&self, bytes: &[u8]) -> Option<String> {
        let text = match self.engines.text_layer.extract_text(bytes).await {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "Text layer unavailable");
                return None;
            }
        };

        let chars = text.trim().chars().count();
        if chars <= self.config.min_direct_text_chars {
            debug!(chars, "Text layer too short");
            return None;
        }

        let organized = clean_and_organize(&text, &self.config.section_keywords);
        (!organized.is_empty()).then_some(organized)
    }

    /// Region OCR: confirm the document is a menu, then recognize each text
    /// block separately in reading order.
    pub async fn region_ocr(&self, pages: &[Page], url: &str) -> Result<Option<String>> {
        if pages.len() > self.config.max_region_pages {
            info!(url = %url, pages = pages.len(), "Too many pages for region OCR, skipping");
            return Ok(None);
        }

        let first_pass = self.ocr_pages(pages, OcrMode::Page).await?;
        let first_pass = assemble(&first_pass);
        if first_pass.trim().is_empty() {
            warn!(url = %url, "No text in first OCR pass");
            return Ok(None);
        }

        let week = extract_week_number(&first_pass);
        let has_keyword = contains_any(&first_pass, &self.config.menu_keywords);
        if week.is_none() && !has_keyword {
            info!(url = %url, "No week number or menu keyword, not a lunch menu");
            return Ok(None);
        }
        debug!(url = %url, week = ?week.as_ref().map(|w| w.label.as_str()), has_keyword, "Menu confirmed");

        // Pages in turn; the regions of a page share the OCR budget
        let mut parts = Vec::new();
        for page in pages {
            parts.extend(self.ocr_page_regions(page).await?);
        }

        let body = self.narrow(assemble(&parts));
        if body.trim().is_empty() {
            return Ok(None);
        }

        let week = week.or_else(|| extract_week_number_from_locator(url));
        Ok(Some(prefix_week(week.as_ref(), &body)))
    }

    async fn ocr_page_regions(&self, page: &Page) -> Result<Vec<ExtractedText>> {
        let image = page.image.clone();
        let preprocess = self.config.preprocess.clone();
        let min_area = self.config.segment.min_area;

        let regions = blocking(move || {
            let binary = contour_profile(&image, &preprocess)?;
            Ok(segment(&binary, min_area))
        })
        .await;

        let regions = match regions {
            Ok(regions) if !regions.is_empty() => regions,
            Ok(_) => {
                debug!(page = page.index, "No regions, recognizing whole page");
                let text = self.recognize(&page.image, OcrMode::Page).await?;
                return Ok(vec![ExtractedText::page(page.index, text)]);
            }
            Err(e) => {
                warn!(page = page.index, error = %e, "Preprocessing failed, recognizing whole page");
                let text = self.recognize(&page.image, OcrMode::Page).await?;
                return Ok(vec![ExtractedText::page(page.index, text)]);
            }
        };

        debug!(page = page.index, regions = regions.len(), "Regions found");
        let crops = crop_regions(&page.image, &regions);
        let texts: Vec<Result<String>> = stream::iter(&crops)
            .map(|(_, crop)| self.recognize(crop, OcrMode::SingleBlock))
            .buffered(self.parallelism())
            .collect()
            .await;

        Ok(crops
            .iter()
            .zip(texts)
            .map(|((region, _), text)| {
                let text = text.unwrap_or_else(|e| {
                    warn!(
                        page = page.index,
                        region = ?region,
                        error = %e,
                        "Region OCR failed, keeping it empty"
                    );
                    String::new()
                });
                ExtractedText::region(page.index, *region, text)
            })
            .collect())
    }

    /// Whole-page OCR: preprocess and recognize each page, then add the
    /// weekly-special sections found on page 1.
    pub async fn whole_page_ocr(&self, pages: &[Page]) -> Result<Option<String>> {
        let texts: Vec<Result<ExtractedText>> = stream::iter(pages)
            .map(|page| async move {
                let image = page.image.clone();
                let preprocess = self.config.preprocess.clone();
                let prepared = blocking(move || {
                    ocr_profile(&image, &preprocess).map(DynamicImage::ImageLuma8)
                })
                .await;

                let text = match prepared {
                    Ok(prepared) => self.recognize(&prepared, OcrMode::Page).await?,
                    Err(e) => {
                        warn!(page = page.index, error = %e, "Preprocessing failed, using original page");
                        self.recognize(&page.image, OcrMode::Page).await?
                    }
                };
                if text.trim().is_empty() {
                    warn!(page = page.index, "No text recognized on page");
                }
                Ok::<_, ExtractionError>(ExtractedText::page(page.index, text))
            })
            .buffered(self.parallelism())
            .collect()
            .await;

        let parts = texts.into_iter().collect::<Result<Vec<_>>>()?;
        let body = self.narrow(assemble(&parts));

        let specials = match pages.first() {
            Some(first) if !self.config.special_sections.is_empty() => {
                let raw = self.recognize(&first.image, OcrMode::Page).await?;
                extract_special_sections(&raw, &self.config.special_sections)
            }
            _ => String::new(),
        };

        let combined = [body.trim(), specials.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok((!combined.is_empty()).then_some(combined))
    }

    /// Plain OCR of every page, no preprocessing, default segmentation.
    pub async fn plain_ocr(&self, pages: &[Page]) -> Result<Option<String>> {
        let parts = self.ocr_pages(pages, OcrMode::Page).await?;
        let text = self.narrow(assemble(&parts));
        Ok((!text.trim().is_empty()).then_some(text))
    }

    async fn ocr_pages(&self, pages: &[Page], mode: OcrMode) -> Result<Vec<ExtractedText>> {
        let texts: Vec<Result<String>> = stream::iter(pages)
            .map(|page| self.recognize(&page.image, mode))
            .buffered(self.parallelism())
            .collect()
            .await;
        pages
            .iter()
            .zip(texts)
            .map(|(page, text)| Ok(ExtractedText::page(page.index, text?)))
            .collect()
    }

    fn parallelism(&self) -> usize {
        self.config.ocr.max_concurrent.max(1)
    }

    async fn recognize(&self, image: &DynamicImage, mode: OcrMode) -> Result<String> {
        self.engines
            .ocr
            .recognize(image, mode, ImageSource::Document)
            .await
    }

    /// Narrow to weekday windows when configured; keeps the text when the
    /// narrowing would leave nothing.
    fn narrow(&self, text: String) -> String {
        if !self.config.narrow_to_day_sentences {
            return text;
        }
        let narrowed = extract_day_sentences(&text);
        if narrowed.is_empty() {
            text
        } else {
            narrowed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{blank_page, MockOcr, MockRasterizer, MockTextLayer};
    use image::{GrayImage, Luma};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    const LONG_MENU: &str = "Lunchmeny\nMÅNDAG\nKöttbullar med potatismos och lingon\nTISDAG\nFiskgratäng med dill";

    fn engines(ocr: MockOcr, rasterizer: MockRasterizer, text_layer: MockTextLayer) -> Engines {
        Engines {
            ocr: Arc::new(ocr),
            rasterizer: Arc::new(rasterizer),
            text_layer: Arc::new(text_layer),
        }
    }

    /// A white page with three separate ink blocks.
    fn blocks_page(index: usize) -> Page {
        let mut img = GrayImage::from_pixel(300, 300, Luma([255]));
        for (x, y) in [(20, 20), (160, 20), (20, 160)] {
            draw_filled_rect_mut(&mut img, Rect::at(x, y).of_size(80, 40), Luma([0]));
        }
        Page::new(index, DynamicImage::ImageLuma8(img))
    }

    #[test]
    fn test_choose_ocr_strategy() {
        assert_eq!(choose_ocr_strategy(11, 10), Strategy::RegionOcr);
        assert_eq!(choose_ocr_strategy(10, 10), Strategy::WholePageOcr);
        assert_eq!(choose_ocr_strategy(0, 10), Strategy::WholePageOcr);
    }

    #[tokio::test]
    async fn test_auto_uses_text_layer_without_rasterizing() {
        let rasterizer = MockRasterizer::new().with_pages(vec![blank_page(1)]);
        let engines = engines(
            MockOcr::new(),
            rasterizer.clone(),
            MockTextLayer::new().with_text(LONG_MENU),
        );
        let config = PipelineConfig::default();

        let text = StrategyRunner::new(&engines, &config)
            .run(b"%PDF", "https://x.se/meny.pdf", StrategyHint::Auto)
            .await
            .unwrap()
            .unwrap();

        assert!(text.starts_with("Lunchmeny\n\nMÅNDAG"));
        assert_eq!(rasterizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_short_text_layer_is_rejected() {
        let engines = engines(
            MockOcr::new(),
            MockRasterizer::new(),
            MockTextLayer::new().with_text("Lunch 11-14"),
        );
        let config = PipelineConfig::default();

        assert!(StrategyRunner::new(&engines, &config)
            .direct_text(b"%PDF")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_explicit_direct_text_falls_back_to_page_ocr() {
        let ocr = MockOcr::new().with_default_text("Dagens lunch\nMåndag: Soppa");
        let engines = engines(
            ocr.clone(),
            MockRasterizer::new().with_pages(vec![blank_page(1)]),
            MockTextLayer::new(),
        );
        let config = PipelineConfig::default();

        let text = StrategyRunner::new(&engines, &config)
            .run(
                b"%PDF",
                "https://x.se/lunch-v46.pdf",
                StrategyHint::Fixed(Strategy::DirectText),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(text, "V 46\n\nDagens lunch\nMåndag: Soppa");
        assert_eq!(ocr.calls(), vec![OcrMode::Page]);
    }

    #[tokio::test]
    async fn test_region_ocr_skips_long_documents() {
        let ocr = MockOcr::new().with_default_text("Lunch vecka 12");
        let pages = vec![blank_page(1), blank_page(2), blank_page(3)];
        let engines = engines(ocr.clone(), MockRasterizer::new(), MockTextLayer::new());
        let config = PipelineConfig::default();

        let result = StrategyRunner::new(&engines, &config)
            .region_ocr(&pages, "https://x.se/lunch.pdf")
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(ocr.call_count(), 0);
    }

    #[tokio::test]
    async fn test_region_ocr_requires_week_or_keyword() {
        let ocr = MockOcr::new().with_default_text("Prislista catering");
        let engines = engines(ocr, MockRasterizer::new(), MockTextLayer::new());
        let config = PipelineConfig::default();

        let result = StrategyRunner::new(&engines, &config)
            .region_ocr(&[blank_page(1)], "https://x.se/a.pdf")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_region_ocr_prefixes_body_week() {
        let ocr = MockOcr::new().with_default_text("Vecka 12\nMåndag: Pasta");
        let engines = engines(ocr, MockRasterizer::new(), MockTextLayer::new());
        let config = PipelineConfig::default();

        // blank page: no regions, whole page is recognized
        let text = StrategyRunner::new(&engines, &config)
            .region_ocr(&[blank_page(1)], "https://x.se/lunch-v46.pdf")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(text, "Vecka 12\n\nVecka 12\nMåndag: Pasta");
    }

    #[tokio::test]
    async fn test_whole_page_ocr_appends_special_sections() {
        let ocr = MockOcr::new().with_default_text(
            "Måndag: Soppa\nVeckans Fisk: Torsk\nmed potatis\nFredag: Tacos",
        );
        let engines = engines(ocr.clone(), MockRasterizer::new(), MockTextLayer::new());
        let config = PipelineConfig::default();

        let text = StrategyRunner::new(&engines, &config)
            .whole_page_ocr(&[blank_page(1), blank_page(2)])
            .await
            .unwrap()
            .unwrap();

        let page = "Måndag: Soppa\nVeckans Fisk: Torsk\nmed potatis\nFredag: Tacos";
        assert_eq!(
            text,
            format!("{page}\n\n{page}\n\nVeckans Fisk: Torsk\nmed potatis")
        );
        // two pages plus one raw pass over page 1
        assert_eq!(ocr.call_count(), 3);
    }

    #[tokio::test]
    async fn test_whole_page_ocr_empty_is_none() {
        let engines = engines(MockOcr::new(), MockRasterizer::new(), MockTextLayer::new());
        let config = PipelineConfig::default();

        let result = StrategyRunner::new(&engines, &config)
            .whole_page_ocr(&[blank_page(1)])
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_auto_without_text_layer_rasterizes_once() {
        let rasterizer = MockRasterizer::new().with_pages(vec![blank_page(1)]);
        let engines = engines(
            MockOcr::new().with_default_text("Tisdag: Lasagne"),
            rasterizer.clone(),
            MockTextLayer::new(),
        );
        let config = PipelineConfig::default();

        let text = StrategyRunner::new(&engines, &config)
            .run(b"%PDF", "https://x.se/lunch_v7.pdf", StrategyHint::Auto)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(text, "V 7\n\nTisdag: Lasagne");
        assert_eq!(rasterizer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rasterize_failure_propagates() {
        let engines = engines(
            MockOcr::new(),
            MockRasterizer::new().failing(),
            MockTextLayer::new(),
        );
        let config = PipelineConfig::default();

        let err = StrategyRunner::new(&engines, &config)
            .run(b"%PDF", "https://x.se/lunch.pdf", StrategyHint::Fixed(Strategy::WholePageOcr))
            .await
            .unwrap_err();
        assert!(err.is_hard_failure());
    }

    #[tokio::test]
    async fn test_day_sentence_narrowing() {
        let ocr = MockOcr::new().with_default_text("Välkommen\nÖppet 11-14\nMåndag\nSoppa\nParkering finns");
        let engines = engines(ocr, MockRasterizer::new(), MockTextLayer::new());
        let config = PipelineConfig::default().with_day_sentences(true);

        let text = StrategyRunner::new(&engines, &config)
            .plain_ocr(&[blank_page(1)])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(text, "Öppet 11-14\nMåndag\nSoppa");
    }

    #[tokio::test]
    async fn test_failed_region_is_kept_empty() {
        // call 1 is the first pass, calls 2-4 the three regions
        let ocr = MockOcr::new()
            .with_response("Vecka 46 lunch")
            .with_default_text("Soppa")
            .failing_on_call(3);
        let engines = engines(ocr.clone(), MockRasterizer::new(), MockTextLayer::new());
        let config = PipelineConfig::default();

        let text = StrategyRunner::new(&engines, &config)
            .region_ocr(&[blocks_page(1)], "https://x.se/lunch.pdf")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(text, "Vecka 46\n\nSoppa\nSoppa");
        assert_eq!(ocr.call_count(), 4);
    }

    #[tokio::test]
    async fn test_region_ocr_respects_concurrency_limit() {
        for limit in [1, 3] {
            let ocr = MockOcr::new().with_default_text("Vecka 46 lunch");
            let engines = engines(ocr.clone(), MockRasterizer::new(), MockTextLayer::new());
            let config = PipelineConfig::default().with_ocr_concurrency(limit);

            StrategyRunner::new(&engines, &config)
                .region_ocr(&[blocks_page(1)], "https://x.se/lunch.pdf")
                .await
                .unwrap()
                .unwrap();

            assert_eq!(ocr.call_count(), 4);
            assert_eq!(ocr.max_in_flight(), limit);
        }
    }

    #[tokio::test]
    async fn test_page_ocr_respects_concurrency_limit() {
        let ocr = MockOcr::new().with_default_text("Måndag: Soppa");
        let engines = engines(ocr.clone(), MockRasterizer::new(), MockTextLayer::new());
        let config = PipelineConfig::default().with_ocr_concurrency(2);
        let pages: Vec<Page> = (1..=6).map(blank_page).collect();

        let text = StrategyRunner::new(&engines, &config)
            .plain_ocr(&pages)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(text.matches("Soppa").count(), 6);
        assert_eq!(ocr.max_in_flight(), 2);

        StrategyRunner::new(&engines, &config)
            .whole_page_ocr(&pages)
            .await
            .unwrap();
        assert_eq!(ocr.max_in_flight(), 2);
    }
}
