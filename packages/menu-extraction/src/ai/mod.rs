//! Semantic service implementations.
//!
//! The prompt and reply parsing are always available; the OpenAI client
//! needs the `openai` feature.

pub mod prompts;

#[cfg(feature = "openai")]
mod openai;

pub use prompts::{format_menu_prompt, parse_menu_response};

#[cfg(feature = "openai")]
pub use openai::OpenAiInterpreter;
