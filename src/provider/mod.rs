//! Generative API seam.
//!
//! The orchestrator talks to the remote model only through [`GenerativeApi`].
//! [`gemini::GeminiClient`] is the production implementation.

pub mod gemini;

use crate::types::ImageData;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub use gemini::GeminiClient;

/// Errors raised by a provider call
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Gemini API transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Gemini API request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to decode Gemini API response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// True for 404-class failures, typically a model the key cannot access
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 404,
            Self::Transport(e) => e.status().is_some_and(|s| s.as_u16() == 404),
            Self::Decode(_) => false,
        }
    }
}

/// One ordered piece of request content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    InlineImage(ImageData),
}

/// Everything needed for a single `generateContent` call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub parts: Vec<ContentPart>,
    pub system_instruction: String,
    /// JSON schema the response should conform to
    pub response_schema: Value,
    pub thinking_budget: Option<u32>,
    pub search_tool: bool,
}

impl GenerateRequest {
    /// Same content and instruction, retargeted at `model` with thinking and
    /// tools removed
    #[must_use]
    pub fn into_fallback(self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            thinking_budget: None,
            search_tool: false,
            ..self
        }
    }
}

/// Citation metadata attached to a search-grounded candidate.
///
/// Chunks are kept as raw JSON so that one malformed entry does not spoil
/// the whole response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<Value>,
}

/// Provider answer reduced to what normalization needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResponse {
    /// Concatenated text of the first candidate
    pub text: String,
    pub grounding: Option<GroundingMetadata>,
}

impl GenerateResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            grounding: None,
        }
    }
}

/// Remote generative-language API
#[async_trait]
pub trait GenerativeApi: Send + Sync {
    /// Issues one request. The credential is passed on every call.
    async fn generate_content(
        &self,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError>;
}
