//! Page renderer trait for JavaScript-driven pages.

use async_trait::async_trait;

use crate::error::Result;

/// Produces the HTML of a page after it has been rendered.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String>;
}
