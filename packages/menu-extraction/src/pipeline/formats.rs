//! Per-format handlers: PDF, image, text, social post and rendered page.

use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ExtractionError, Result};
use crate::fetchers::http::redact;
use crate::gate::{filter_relevant, find_document_links};
use crate::heuristics::{contains_any, contains_keyword, mark_day_boundaries};
use crate::html::{image_sources, select_text, visible_text};
use crate::imaging::ocr_profile;
use crate::pipeline::dispatch::MenuPipeline;
use crate::pipeline::strategy::StrategyRunner;
use crate::traits::ocr::{ImageSource, OcrMode};
use crate::types::document::{ContentKind, Document};
use crate::types::request::StrategyHint;

/// Whether a fetched document really is a PDF.
fn is_pdf(document: &Document) -> bool {
    document.declares_pdf() || document.bytes.starts_with(b"%PDF")
}

/// Page identifier from a social page locator
/// (`https://www.facebook.com/KrogenLunch/` gives `KrogenLunch`).
pub fn facebook_page_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    if !(host == "facebook.com" || host.ends_with(".facebook.com")) {
        return None;
    }

    let segment = parsed.path_segments()?.find(|s| !s.is_empty())?;
    if segment == "profile.php" {
        return parsed
            .query_pairs()
            .find(|(k, _)| k == "id")
            .map(|(_, v)| v.into_owned());
    }
    Some(segment.to_string())
}

#[derive(Debug, Deserialize)]
struct GraphPosts {
    #[serde(default)]
    data: Vec<GraphPost>,
}

#[derive(Debug, Deserialize)]
struct GraphPost {
    #[serde(default)]
    message: Option<String>,
}

/// First post message mentioning one of `keywords`.
pub fn pick_post(body: &str, keywords: &[String]) -> Result<Option<String>> {
    let posts: GraphPosts = serde_json::from_str(body)?;
    Ok(posts
        .data
        .into_iter()
        .filter_map(|post| post.message)
        .find(|message| contains_any(message, keywords)))
}

impl MenuPipeline {
    /// PDF menus: the locator itself, or the relevant PDFs linked from it.
    pub(crate) async fn pdf_menu(&self, url: &str, hint: StrategyHint) -> Result<String> {
        let runner = StrategyRunner::new(&self.engines, &self.config);

        let candidates = if ContentKind::classify(None, url) == ContentKind::Pdf {
            vec![url.to_string()]
        } else {
            let page = self.fetcher.fetch(url).await?;
            if is_pdf(&page) {
                // landing locator served a PDF directly
                return match runner.run(&page.bytes, url, hint).await? {
                    Some(text) => Ok(text),
                    None => Err(ExtractionError::NoExtractableText {
                        url: url.to_string(),
                    }),
                };
            }

            let links = find_document_links(&page.final_url, &page.text());
            let relevant =
                filter_relevant(links.iter().map(String::as_str), &self.config.gate_keywords);
            info!(
                url = %url,
                links = links.len(),
                relevant = relevant.len(),
                "PDF links discovered"
            );
            relevant
        };

        if candidates.is_empty() {
            return Err(ExtractionError::NoDocumentFound {
                url: url.to_string(),
            });
        }

        let mut first_error: Option<ExtractionError> = None;
        let mut insufficient = false;

        for candidate in &candidates {
            info!(url = %candidate, "Processing PDF candidate");

            let document = match self.fetcher.fetch(candidate).await {
                Ok(document) => document,
                Err(e) => {
                    warn!(url = %candidate, error = %e, "PDF candidate fetch failed");
                    first_error.get_or_insert(e.into());
                    continue;
                }
            };
            if !is_pdf(&document) {
                warn!(
                    url = %candidate,
                    content_type = ?document.content_type,
                    "Candidate is not a PDF, skipping"
                );
                insufficient = true;
                continue;
            }

            match runner.run(&document.bytes, candidate, hint).await {
                Ok(Some(text)) => {
                    info!(url = %candidate, chars = text.len(), "Relevant text found in PDF");
                    return Ok(text);
                }
                Ok(None) => {
                    info!(url = %candidate, "No usable text in PDF candidate");
                    insufficient = true;
                }
                Err(e) => {
                    warn!(url = %candidate, error = %e, "PDF candidate failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if !insufficient => Err(e),
            _ => Err(ExtractionError::NoExtractableText {
                url: url.to_string(),
            }),
        }
    }

    /// Image menus: the locator itself, or every image on the page, kept
    /// when the recognized text looks like a menu.
    pub(crate) async fn image_menu(&self, url: &str) -> Result<String> {
        let documents = if ContentKind::classify(None, url) == ContentKind::Image {
            vec![self.fetcher.fetch(url).await?]
        } else {
            let page = self.fetcher.fetch(url).await?;
            if page.kind == ContentKind::Image {
                vec![page]
            } else {
                let sources = image_sources(&page.final_url, &page.text());
                if sources.is_empty() {
                    info!(url = %url, "No images found on the page");
                    return Err(ExtractionError::NoDocumentFound {
                        url: url.to_string(),
                    });
                }

                let mut documents = Vec::with_capacity(sources.len());
                for source in &sources {
                    match self.fetcher.fetch(source).await {
                        Ok(document) => documents.push(document),
                        Err(e) => warn!(url = %source, error = %e, "Image download failed"),
                    }
                }
                documents
            }
        };

        let mut texts = Vec::new();
        for document in documents {
            if let Some(text) = self.image_text(&document).await {
                texts.push(text);
            }
        }

        if texts.is_empty() {
            info!(url = %url, "No menu text recognized in any image");
            return Err(ExtractionError::OcrEmpty {
                url: url.to_string(),
            });
        }
        Ok(texts.join("\n\n"))
    }

    /// Menu text of one image, or `None` when the image is unusable or not
    /// a menu. Failures stay with the image they happened on.
    async fn image_text(&self, document: &Document) -> Option<String> {
        let image = match image::load_from_memory(&document.bytes) {
            Ok(image) => image,
            Err(e) => {
                warn!(url = %document.url, error = %e, "Image could not be decoded");
                return None;
            }
        };

        let (width, height) = (image.width(), image.height());
        if width < self.config.min_image_width || height < self.config.min_image_height {
            debug!(url = %document.url, width, height, "Skipping small image");
            return None;
        }

        let original = image.clone();
        let preprocess = self.config.preprocess.clone();
        let prepared = tokio::task::spawn_blocking(move || {
            ocr_profile(&image, &preprocess).map(image::DynamicImage::ImageLuma8)
        })
        .await
        .map_err(|e| ExtractionError::Imaging(e.to_string()))
        .and_then(|prepared| prepared);

        let prepared = prepared.unwrap_or_else(|e| {
            warn!(url = %document.url, error = %e, "Preprocessing failed, using original image");
            original
        });

        let text = match self
            .engines
            .ocr
            .recognize(&prepared, OcrMode::SingleBlock, ImageSource::Photo)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(url = %document.url, error = %e, "Image OCR failed, skipping image");
                return None;
            }
        };

        if contains_keyword(&text, &self.config.image_keywords) {
            info!(url = %document.url, chars = text.len(), "Menu text recognized in image");
            Some(text.trim().to_string())
        } else {
            debug!(url = %document.url, "No menu keywords in image text");
            None
        }
    }

    /// Web text menus: visible page text with day boundaries marked.
    pub(crate) async fn text_menu(&self, url: &str) -> Result<String> {
        let page = self.fetcher.fetch(url).await?;
        let text = mark_day_boundaries(&visible_text(&page.text()));

        if text.trim().is_empty() {
            return Err(ExtractionError::NoExtractableText {
                url: url.to_string(),
            });
        }
        Ok(text)
    }

    /// Social page menus: the latest post that mentions lunch.
    pub(crate) async fn facebook_menu(&self, url: &str) -> Result<String> {
        let token = self
            .facebook_token
            .as_ref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExtractionError::Config("Facebook access token not set".to_string()))?;

        let page_id = facebook_page_id(url).ok_or_else(|| ExtractionError::NoDocumentFound {
            url: url.to_string(),
        })?;

        let mut endpoint = Url::parse(&format!("{}/{}/posts", self.graph_base, page_id))
            .map_err(|e| ExtractionError::Config(format!("invalid Graph API URL: {}", e)))?;
        endpoint
            .query_pairs_mut()
            .append_pair("fields", "message")
            .append_pair("limit", "5")
            .append_pair("access_token", token.expose());

        debug!(page = %page_id, url = %redact(endpoint.as_str()), "Fetching recent posts");
        let response = self.fetcher.fetch(endpoint.as_str()).await?;

        match pick_post(&response.text(), &self.config.post_keywords)? {
            Some(message) => Ok(message),
            None => {
                info!(page = %page_id, "No recent post mentions lunch");
                Err(ExtractionError::NoExtractableText {
                    url: url.to_string(),
                })
            }
        }
    }

    /// Script-driven menus: the text of the menu element after rendering.
    pub(crate) async fn dynamic_menu(&self, url: &str) -> Result<String> {
        let html = self.renderer.render(url).await?;

        match select_text(&html, &self.config.menu_selector) {
            Some(text) if !text.is_empty() => Ok(text),
            _ => {
                info!(url = %url, selector = %self.config.menu_selector, "Menu element not found");
                Err(ExtractionError::NoExtractableText {
                    url: url.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facebook_page_id() {
        assert_eq!(
            facebook_page_id("https://www.facebook.com/KrogenLunch/"),
            Some("KrogenLunch".to_string())
        );
        assert_eq!(
            facebook_page_id("https://facebook.com/profile.php?id=1000123"),
            Some("1000123".to_string())
        );
        assert_eq!(facebook_page_id("https://example.com/KrogenLunch"), None);
        assert_eq!(facebook_page_id("https://www.facebook.com/"), None);
        assert_eq!(facebook_page_id("not a url"), None);
    }

    #[test]
    fn test_pick_post() {
        let keywords = vec!["lunch".to_string(), "dagens".to_string()];
        let body = r#"{"data":[
            {"id":"1"},
            {"id":"2","message":"Vi har öppet i helgen!"},
            {"id":"3","message":"Dagens LUNCH: Pannbiff med lök"},
            {"id":"4","message":"Lunch imorgon: fisk"}
        ]}"#;

        assert_eq!(
            pick_post(body, &keywords).unwrap(),
            Some("Dagens LUNCH: Pannbiff med lök".to_string())
        );
        assert_eq!(pick_post(r#"{"data":[]}"#, &keywords).unwrap(), None);
        assert!(pick_post("<html>", &keywords).is_err());
    }

    #[test]
    fn test_is_pdf() {
        let declared = Document::new("https://x.se/a", Some("application/pdf".into()), vec![]);
        let sniffed = Document::new("https://x.se/a", None, b"%PDF-1.7".to_vec());
        let html = Document::new("https://x.se/a.pdf", Some("text/html".into()), b"<html>".to_vec());

        assert!(is_pdf(&declared));
        assert!(is_pdf(&sniffed));
        assert!(!is_pdf(&html));
    }
}
