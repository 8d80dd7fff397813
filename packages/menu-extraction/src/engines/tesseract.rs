//! Tesseract OCR engine, driven through its command-line interface.

use std::io::Cursor;
use std::process::Stdio;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ExtractionError, Result};
use crate::traits::ocr::{ImageSource, OcrEngine, OcrMode};
use crate::types::config::OcrConfig;

/// OCR engine that pipes PNG bytes through `tesseract stdin stdout`.
pub struct TesseractOcr {
    config: OcrConfig,
}

impl TesseractOcr {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Command-line arguments for one recognition call.
    fn args(&self, mode: OcrMode, source: ImageSource) -> Vec<String> {
        let oem = match source {
            ImageSource::Document => self.config.document_engine_mode,
            ImageSource::Photo => self.config.photo_engine_mode,
        };
        vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.config.language.clone(),
            "--oem".to_string(),
            oem.to_string(),
            "--psm".to_string(),
            mode.psm().to_string(),
        ]
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new(OcrConfig::default())
    }
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| ExtractionError::Imaging(e.to_string()))?;
    Ok(buf)
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(
        &self,
        image: &DynamicImage,
        mode: OcrMode,
        source: ImageSource,
    ) -> Result<String> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(String::new());
        }
        let png = encode_png(image)?;

        let mut child = Command::new(&self.config.tesseract_cmd)
            .args(self.args(mode, source))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ExtractionError::Ocr(format!(
                    "failed to start {}: {}",
                    self.config.tesseract_cmd, e
                ))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&png)
                .await
                .map_err(|e| ExtractionError::Ocr(format!("failed to send image: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExtractionError::Ocr(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(
            psm = mode.psm(),
            width = image.width(),
            height = image.height(),
            chars = text.len(),
            "OCR completed"
        );
        Ok(text)
    }
}
