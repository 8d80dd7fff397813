//! Page renderers for menus published on script-driven pages.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ExtractionError, Result};
use crate::traits::fetcher::Fetcher;
use crate::traits::render::PageRenderer;

/// Renderer that fetches the served HTML as-is, without running scripts.
///
/// Enough for pages whose menu element is present in the initial markup.
pub struct StaticRenderer {
    fetcher: Arc<dyn Fetcher>,
}

impl StaticRenderer {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl PageRenderer for StaticRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        let document = self.fetcher.fetch(url).await?;
        Ok(document.text())
    }
}

/// Renderer that loads the page in headless Chromium through the Playwright
/// CLI and returns the DOM after the network settles.
pub struct PlaywrightRenderer {
    node_cmd: String,
    timeout_ms: u64,
}

impl Default for PlaywrightRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaywrightRenderer {
    pub fn new() -> Self {
        Self {
            node_cmd: "node".to_string(),
            timeout_ms: 30_000,
        }
    }

    pub fn with_node_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.node_cmd = cmd.into();
        self
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    fn script(&self, url: &str) -> Result<String> {
        // JSON string literal is a valid JS string literal
        let url = serde_json::to_string(url)?;
        Ok(format!(
            r#"
        const {{ chromium }} = require('playwright');
        (async () => {{
            const browser = await chromium.launch({{ headless: true }});
            try {{
                const page = await browser.newPage();
                const response = await page.goto({url}, {{ waitUntil: 'networkidle', timeout: {timeout} }});
                if (response && response.status() >= 400) {{
                    console.error('HTTP ' + response.status());
                    process.exitCode = 1;
                    return;
                }}
                process.stdout.write(await page.content());
            }} finally {{
                await browser.close();
            }}
        }})();
        "#,
            url = url,
            timeout = self.timeout_ms
        ))
    }
}

#[async_trait]
impl PageRenderer for PlaywrightRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        let script = self.script(url)?;
        debug!(url = %url, "Rendering page in headless browser");

        let output = Command::new(&self.node_cmd)
            .arg("-e")
            .arg(&script)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ExtractionError::Config(format!("failed to run {}: {}", self.node_cmd, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::NoDocumentFound {
                url: format!("{} ({})", url, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
