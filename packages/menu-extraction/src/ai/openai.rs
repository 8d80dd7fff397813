//! OpenAI implementation of the MenuInterpreter trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use menu_extraction::ai::OpenAiInterpreter;
//!
//! let interpreter = OpenAiInterpreter::from_env()?.with_model("gpt-4o");
//! let pipeline = pipeline.with_interpreter(Arc::new(interpreter));
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::prompts::{format_menu_prompt, parse_menu_response, SYSTEM_PROMPT};
use crate::error::{ExtractionError, Result};
use crate::security::{SecretString, ServiceCredentials};
use crate::traits::interpreter::MenuInterpreter;
use crate::types::menu::MenuItem;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completion backed menu interpreter.
#[derive(Clone)]
pub struct OpenAiInterpreter {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl OpenAiInterpreter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: SecretString::new(api_key),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: 1500,
        }
    }

    /// Create from `ServiceCredentials`.
    pub fn from_credentials(credentials: &ServiceCredentials) -> Self {
        Self {
            client: Client::new(),
            api_key: credentials.api_key.clone(),
            model: credentials.model.clone(),
            base_url: credentials
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens: 1500,
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ExtractionError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model (default: gpt-4o-mini).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: Some(0.0),
            max_tokens: Some(self.max_tokens),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::Interpreter(e.to_string().into()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Interpreter(
                format!("OpenAI API error {}: {}", status, error_text).into(),
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ExtractionError::MalformedResponse("no choices in response".into()))
    }
}

#[async_trait]
impl MenuInterpreter for OpenAiInterpreter {
    async fn interpret(&self, text: &str, instructions: Option<&str>) -> Result<Vec<MenuItem>> {
        let prompt = format_menu_prompt(text, instructions);
        let reply = self.chat(SYSTEM_PROMPT, &prompt).await?;
        debug!(model = %self.model, chars = reply.len(), "Semantic service replied");

        parse_menu_response(&reply)
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_credentials() {
        let credentials = ServiceCredentials::new("sk-test", "gpt-4o")
            .with_base_url("http://localhost:8080/v1");
        let interpreter = OpenAiInterpreter::from_credentials(&credentials);

        assert_eq!(interpreter.model(), "gpt-4o");
        assert_eq!(interpreter.base_url, "http://localhost:8080/v1");
        assert_eq!(interpreter.api_key.expose(), "sk-test");
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: DEFAULT_MODEL.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hej".to_string(),
            }],
            temperature: Some(0.0),
            max_tokens: Some(1500),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 1500);
    }
}
