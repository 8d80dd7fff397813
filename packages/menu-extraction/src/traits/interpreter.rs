//! Semantic extraction trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::menu::MenuItem;

/// Turns assembled free text into menu items.
///
/// Implementations wrap an external natural-language service. A response
/// that is not a JSON array of items is a hard failure for the document
/// (`ExtractionError::MalformedResponse`) and is not retried.
#[async_trait]
pub trait MenuInterpreter: Send + Sync {
    /// Interpret menu text. `instructions` replaces the default prompt
    /// guidelines when given.
    async fn interpret(&self, text: &str, instructions: Option<&str>) -> Result<Vec<MenuItem>>;
}
