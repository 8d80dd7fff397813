//! PDF rasterizer backed by poppler's `pdftoppm`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ExtractionError, Result};
use crate::traits::raster::Rasterizer;
use crate::types::config::RasterConfig;
use crate::types::document::Page;

/// Renders every page of a PDF to PNG with `pdftoppm -r <dpi> -png`.
pub struct PopplerRasterizer {
    config: RasterConfig,
}

impl PopplerRasterizer {
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }
}

impl Default for PopplerRasterizer {
    fn default() -> Self {
        Self::new(RasterConfig::default())
    }
}

/// Page number encoded in a pdftoppm output name (`page-01.png` -> 1).
fn page_number(path: &Path) -> Option<usize> {
    let stem = path.file_stem()?.to_str()?;
    stem.rsplit('-').next()?.parse().ok()
}

/// PNG files written by pdftoppm, ordered by page number.
fn rendered_pages(dir: &Path) -> Result<Vec<(usize, PathBuf)>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ExtractionError::Rasterize(e.to_string()))?;

    let mut pages: Vec<(usize, PathBuf)> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
        .filter_map(|path| page_number(&path).map(|n| (n, path)))
        .collect();
    pages.sort_by_key(|(n, _)| *n);
    Ok(pages)
}

#[async_trait]
impl Rasterizer for PopplerRasterizer {
    async fn rasterize(&self, bytes: &[u8]) -> Result<Vec<Page>> {
        if bytes.is_empty() {
            return Err(ExtractionError::Rasterize("empty document".to_string()));
        }

        let dir = tempfile::tempdir().map_err(|e| ExtractionError::Rasterize(e.to_string()))?;
        let input = dir.path().join("input.pdf");
        tokio::fs::write(&input, bytes)
            .await
            .map_err(|e| ExtractionError::Rasterize(e.to_string()))?;

        let output = Command::new(&self.config.pdftoppm_cmd)
            .arg("-r")
            .arg(self.config.dpi.to_string())
            .arg("-png")
            .arg(&input)
            .arg(dir.path().join("page"))
            .output()
            .await
            .map_err(|e| {
                ExtractionError::Rasterize(format!(
                    "failed to run {}: {}",
                    self.config.pdftoppm_cmd, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Rasterize(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let files = rendered_pages(dir.path())?;
        let pages = tokio::task::spawn_blocking(move || -> Result<Vec<Page>> {
            files
                .into_iter()
                .enumerate()
                .map(|(i, (_, path))| {
                    let image = image::open(&path)
                        .map_err(|e| ExtractionError::Rasterize(e.to_string()))?;
                    Ok(Page::new(i + 1, image))
                })
                .collect()
        })
        .await
        .map_err(|e| ExtractionError::Rasterize(e.to_string()))??;

        if pages.is_empty() {
            return Err(ExtractionError::Rasterize(
                "document rendered no pages".to_string(),
            ));
        }

        debug!(pages = pages.len(), dpi = self.config.dpi, "PDF rasterized");
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number() {
        assert_eq!(page_number(Path::new("/tmp/x/page-1.png")), Some(1));
        assert_eq!(page_number(Path::new("/tmp/x/page-012.png")), Some(12));
        assert_eq!(page_number(Path::new("/tmp/x/input.pdf")), None);
    }

    #[test]
    fn test_rendered_pages_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-2.png", "page-1.png", "input.pdf"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let pages = rendered_pages(dir.path()).unwrap();
        let numbers: Vec<usize> = pages.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![1, 2, 10]);
    }

    #[tokio::test]
    async fn test_empty_bytes_fail() {
        let err = PopplerRasterizer::default().rasterize(&[]).await.unwrap_err();
        assert!(err.is_hard_failure());
    }

    #[tokio::test]
    async fn test_missing_binary_fails() {
        let rasterizer = PopplerRasterizer::new(RasterConfig {
            pdftoppm_cmd: "/nonexistent/pdftoppm".to_string(),
            ..RasterConfig::default()
        });
        let err = rasterizer.rasterize(b"%PDF-1.4").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Rasterize(_)));
    }
}
