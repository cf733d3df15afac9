//! Caller-side state for one conversation: the last prompt, the iteration
//! counter and the result on screen.
//!
//! All methods that issue a request take `&mut self`, so a session never has
//! more than one request in flight.

use crate::error::RizzError;
use crate::log_debug;
use crate::orchestrator::RequestOrchestrator;
use crate::types::{AnalysisResult, HistoryItem, ImageData, Mode, ToneSelection};

/// Input that produced the current result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastPrompt {
    pub text: String,
    pub image: Option<ImageData>,
}

pub struct Session {
    orchestrator: RequestOrchestrator,
    api_key: Option<String>,
    mode: Mode,
    tone: ToneSelection,
    last_prompt: Option<LastPrompt>,
    iteration: u32,
    result: Option<AnalysisResult>,
}

impl Session {
    pub fn new(
        orchestrator: RequestOrchestrator,
        api_key: Option<String>,
        mode: Mode,
        tone: ToneSelection,
    ) -> Self {
        Self {
            orchestrator,
            api_key,
            mode,
            tone,
            last_prompt: None,
            iteration: 0,
            result: None,
        }
    }

    /// Seeds a session from a history entry so "load more" can continue it
    pub fn restore(
        orchestrator: RequestOrchestrator,
        api_key: Option<String>,
        item: &HistoryItem,
    ) -> Self {
        let mut session = Self::new(orchestrator, api_key, item.mode, item.tone);
        session.last_prompt = Some(LastPrompt {
            text: item.prompt.clone(),
            image: item.image(),
        });
        session.result = Some(item.result.clone());
        session
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tone(&self) -> ToneSelection {
        self.tone
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn last_prompt(&self) -> Option<&LastPrompt> {
        self.last_prompt.as_ref()
    }

    fn credential(&self) -> Result<&str, RizzError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(RizzError::MissingCredential)
    }

    /// Sends a fresh request, replacing any previous result
    pub async fn send(
        &mut self,
        text: &str,
        image: Option<ImageData>,
    ) -> Result<&AnalysisResult, RizzError> {
        let api_key = self.credential()?.to_string();

        self.result = None;
        self.iteration = 0;
        self.last_prompt = Some(LastPrompt {
            text: text.to_string(),
            image,
        });

        let image = self.last_prompt.as_ref().and_then(|p| p.image.as_ref());
        let result = self
            .orchestrator
            .generate(&api_key, text, image, self.mode, self.tone, 0)
            .await?;

        Ok(self.result.insert(result))
    }

    /// Asks for more options for the last prompt and folds them into the
    /// current result
    pub async fn load_more(&mut self) -> Result<&AnalysisResult, RizzError> {
        if self.last_prompt.is_none() || self.result.is_none() {
            return Err(RizzError::NoPreviousResult);
        }
        let api_key = self.credential()?.to_string();

        self.iteration += 1;
        log_debug!("Loading more options (iteration {})", self.iteration);

        let (text, image) = match self.last_prompt.as_ref() {
            Some(prompt) => (prompt.text.as_str(), prompt.image.as_ref()),
            None => return Err(RizzError::NoPreviousResult),
        };

        let newer = self
            .orchestrator
            .generate(&api_key, text, image, self.mode, self.tone, self.iteration)
            .await
            .map_err(|e| RizzError::LoadMore(Box::new(e)))?;

        let merged = match self.result.take() {
            Some(previous) => previous.merge_more(newer),
            None => newer,
        };
        Ok(self.result.insert(merged))
    }

    /// History entry describing the current prompt and result
    pub fn to_history_item(&self) -> Option<HistoryItem> {
        let prompt = self.last_prompt.as_ref()?;
        let result = self.result.as_ref()?;
        Some(HistoryItem::new(
            &prompt.text,
            prompt.image.as_ref(),
            result.clone(),
            self.mode,
            self.tone,
        ))
    }
}
