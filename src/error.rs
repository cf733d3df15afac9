//! Error types surfaced by the orchestrator and session

use crate::provider::ProviderError;

/// Failures that reach the caller of [`crate::orchestrator::RequestOrchestrator`]
/// or [`crate::session::Session`].
#[derive(Debug, thiserror::Error)]
pub enum RizzError {
    /// No API key was supplied; checked before any network call
    #[error("API Key is missing. Please provide a valid Gemini API Key.")]
    MissingCredential,

    /// The provider call failed and no fallback tier recovered it
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The provider answered 404 for the requested model
    #[error("Model {model} unavailable. Please check API key/permissions.")]
    ModelUnavailable { model: String },

    /// Non-search response text was not a valid analysis result
    #[error("Malformed response from model: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    /// "Load more" was requested before any successful result
    #[error("Nothing to load more for. Send a message first.")]
    NoPreviousResult,

    /// A "load more" round failed; the previous result is kept
    #[error("Could not load more options.")]
    LoadMore(#[source] Box<RizzError>),
}

impl RizzError {
    /// Whether this error should send the user to credential setup rather
    /// than a generic error banner
    pub const fn is_credential_prompt(&self) -> bool {
        matches!(self, Self::MissingCredential)
    }
}
