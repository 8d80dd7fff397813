use anyhow::{Context, Result};
use dotenvy::dotenv;
use menu_extraction::PipelineConfig;
use std::env;

/// Which page renderer DYNAMIC menus use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    /// Fetch the HTML as served
    Static,

    /// Render with a headless browser through node + Playwright
    Playwright,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub facebook_access_token: Option<String>,
    pub renderer: RendererKind,
    pub concurrency: Option<usize>,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let mut pipeline = match env::var("MENU_PIPELINE_CONFIG") {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading pipeline config {}", path))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("parsing pipeline config {}", path))?
            }
            Err(_) => PipelineConfig::default(),
        };

        if let Ok(cmd) = env::var("TESSERACT_CMD") {
            pipeline = pipeline.with_tesseract_cmd(cmd);
        }
        if let Ok(cmd) = env::var("PDFTOPPM_CMD") {
            pipeline = pipeline.with_pdftoppm_cmd(cmd);
        }
        if let Ok(language) = env::var("OCR_LANGUAGE") {
            pipeline = pipeline.with_ocr_language(language);
        }
        if let Ok(calls) = env::var("OCR_CONCURRENCY") {
            pipeline = pipeline.with_ocr_concurrency(
                calls
                    .parse()
                    .context("OCR_CONCURRENCY must be a valid number")?,
            );
        }
        if let Ok(secs) = env::var("FETCH_TIMEOUT_SECS") {
            pipeline = pipeline.with_fetch_timeout_secs(
                secs.parse()
                    .context("FETCH_TIMEOUT_SECS must be a valid number")?,
            );
        }

        let renderer = match env::var("MENU_RENDERER").as_deref() {
            Ok("playwright") => RendererKind::Playwright,
            Ok("static") | Err(_) => RendererKind::Static,
            Ok(other) => anyhow::bail!("MENU_RENDERER must be 'static' or 'playwright', got '{}'", other),
        };

        let concurrency = env::var("MENU_CONCURRENCY")
            .ok()
            .map(|n| n.parse().context("MENU_CONCURRENCY must be a valid number"))
            .transpose()?;

        Ok(Self {
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            facebook_access_token: env::var("FACEBOOK_ACCESS_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            renderer,
            concurrency,
            pipeline,
        })
    }
}
