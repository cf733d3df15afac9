//! RizzMaster - AI wingman for conversations
//!
//! This library turns a message or a screenshot into reply suggestions using
//! Gemini models, with a grounded date-planning mode backed by web search.

// Allow certain clippy warnings that are either stylistic or from external dependencies
#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::format_push_string)] // Performance improvement but stylistic
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine
#![allow(clippy::too_many_arguments)] // Some functions legitimately need many params

pub mod cli;
pub mod common;
pub mod config;
pub mod error;
pub mod logger;
pub mod normalize;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod session;
pub mod storage;
pub mod types;
pub mod ui;

// Re-export important structs and functions for easier testing
pub use config::Config;
pub use error::RizzError;
pub use orchestrator::{ModelCatalog, RequestOrchestrator};
pub use provider::{GeminiClient, GenerativeApi};
pub use session::Session;
pub use storage::Store;

// Re-exports from types module
pub use types::{AnalysisResult, GroundingLink, HistoryItem, ImageData, Mode, Suggestion, Tone, ToneSelection};
