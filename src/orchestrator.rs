//! Request orchestration: model selection, the primary/fallback state
//! machine, and the outer error boundary.

use crate::error::RizzError;
use crate::normalize::normalize;
use crate::prompt::{build_parts, create_system_instruction, response_schema};
use crate::provider::{GenerateRequest, GenerateResponse, GenerativeApi, ProviderError};
use crate::types::{AnalysisResult, ImageData, Mode, ToneSelection};
use crate::{log_debug, log_error, log_warn};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

/// Thinking budget granted to the deep mode model
pub const DEEP_THINKING_BUDGET: u32 = 2048;

/// Lightweight default; also the fallback tier
pub const DEFAULT_FAST_MODEL: &str = "gemini-3-flash-preview";

/// High-capability model used by deep and search modes
pub const DEFAULT_PRO_MODEL: &str = "gemini-3-pro-preview";

/// Model identifiers the orchestrator can target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    /// Lightweight default, assumed to be available to every key
    #[serde(default = "default_fast_model")]
    pub fast: String,
    /// High-capability model
    #[serde(default = "default_pro_model")]
    pub pro: String,
}

fn default_fast_model() -> String {
    DEFAULT_FAST_MODEL.to_string()
}

fn default_pro_model() -> String {
    DEFAULT_PRO_MODEL.to_string()
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self {
            fast: default_fast_model(),
            pro: default_pro_model(),
        }
    }
}

/// Model and capabilities chosen for one mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPlan {
    pub model: String,
    pub thinking_budget: Option<u32>,
    pub search_tool: bool,
}

impl ModelCatalog {
    /// Selects model and capabilities for a mode
    pub fn plan_for(&self, mode: Mode) -> ModelPlan {
        match mode {
            Mode::Fast => ModelPlan {
                model: self.fast.clone(),
                thinking_budget: None,
                search_tool: false,
            },
            Mode::Deep => ModelPlan {
                model: self.pro.clone(),
                thinking_budget: Some(DEEP_THINKING_BUDGET),
                search_tool: false,
            },
            Mode::Search => ModelPlan {
                model: self.pro.clone(),
                thinking_budget: None,
                search_tool: true,
            },
        }
    }
}

/// Whether a failed call against `model` earns a second attempt on `lightweight`
pub fn needs_fallback(model: &str, lightweight: &str) -> bool {
    model != lightweight
}

/// Which tier the current attempt targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Primary,
    Fallback,
}

/// Translates user input into exactly one normalized [`AnalysisResult`]
pub struct RequestOrchestrator {
    provider: Box<dyn GenerativeApi>,
    models: ModelCatalog,
}

impl RequestOrchestrator {
    pub fn new(provider: Box<dyn GenerativeApi>, models: ModelCatalog) -> Self {
        Self { provider, models }
    }

    /// Assembles the primary request for the given input
    pub fn build_request(
        &self,
        prompt_text: &str,
        image: Option<&ImageData>,
        mode: Mode,
        tone: ToneSelection,
        iteration: u32,
    ) -> GenerateRequest {
        let plan = self.models.plan_for(mode);
        GenerateRequest {
            model: plan.model,
            parts: build_parts(prompt_text, image),
            system_instruction: create_system_instruction(mode, tone, iteration),
            response_schema: response_schema(),
            thinking_budget: plan.thinking_budget,
            search_tool: plan.search_tool,
        }
    }

    /// Generates suggestions for one user action.
    ///
    /// Returns [`RizzError::MissingCredential`] before any network access when
    /// `api_key` is blank, and [`RizzError::ModelUnavailable`] for 404-class
    /// failures. Every other failure is absorbed into
    /// [`AnalysisResult::system_error`].
    pub async fn generate(
        &self,
        api_key: &str,
        prompt_text: &str,
        image: Option<&ImageData>,
        mode: Mode,
        tone: ToneSelection,
        iteration: u32,
    ) -> Result<AnalysisResult, RizzError> {
        if api_key.trim().is_empty() {
            return Err(RizzError::MissingCredential);
        }

        let request = self.build_request(prompt_text, image, mode, tone, iteration);
        let primary_model = request.model.clone();
        log_debug!(
            "Generating suggestions: mode={}, tone={}, iteration={}, model={}",
            mode,
            tone,
            iteration,
            primary_model
        );

        let outcome = match self.execute(api_key, request).await {
            Ok(response) => normalize(mode, &response),
            Err(e) if e.is_not_found() => {
                log_error!("Gemini API Error: {}", e);
                return Err(RizzError::ModelUnavailable {
                    model: primary_model,
                });
            }
            Err(e) => Err(RizzError::Provider(e)),
        };

        outcome.or_else(|e| {
            log_error!("Gemini API Error: {}", e);
            Ok(AnalysisResult::system_error())
        })
    }

    /// Runs the primary attempt and, when allowed, one fallback attempt
    async fn execute(
        &self,
        api_key: &str,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError> {
        let mut state = AttemptState::Primary;
        let mut request = request;

        loop {
            let span = tracing::debug_span!("generate_content", model = %request.model, state = ?state);
            let attempt = self
                .provider
                .generate_content(api_key, &request)
                .instrument(span)
                .await;
            match attempt {
                Ok(response) => return Ok(response),
                Err(e)
                    if state == AttemptState::Primary
                        && needs_fallback(&request.model, &self.models.fast) =>
                {
                    log_warn!(
                        "Primary model {} failed ({}). Attempting fallback to {}.",
                        request.model,
                        e,
                        self.models.fast
                    );
                    request = request.into_fallback(&self.models.fast);
                    state = AttemptState::Fallback;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
