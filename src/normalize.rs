//! Turning raw provider output into an [`AnalysisResult`].
//!
//! Everything here is a pure function of the provider response.

use crate::error::RizzError;
use crate::log_debug;
use crate::provider::{GenerateResponse, GroundingMetadata};
use crate::types::{AnalysisResult, GroundingLink, Mode, Suggestion};
use serde::Deserialize;

/// Outcome of trying to read structured output from model text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(AnalysisResult),
    /// The text did not match the schema; carries the raw text
    SchemaMismatch(String),
}

/// Removes Markdown code-fence markers and surrounding whitespace
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parses fenced or bare JSON directly as an analysis result
pub fn parse_structured(text: &str) -> Result<AnalysisResult, serde_json::Error> {
    serde_json::from_str(&strip_code_fences(text))
}

/// Object embedded in Search prose; the summary may be left out
#[derive(Debug, Deserialize)]
struct EmbeddedResult {
    #[serde(default)]
    summary: String,
    suggestions: Vec<Suggestion>,
}

impl From<EmbeddedResult> for AnalysisResult {
    fn from(embedded: EmbeddedResult) -> Self {
        Self {
            summary: embedded.summary,
            suggestions: embedded.suggestions,
            grounding_links: None,
        }
    }
}

/// Finds the outermost brace-delimited object in free text and parses it
pub fn extract_embedded(text: &str) -> ParseOutcome {
    let cleaned = strip_code_fences(text);

    let candidate = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => cleaned.get(start..=end),
        _ => None,
    };

    match candidate.map(|json| serde_json::from_str::<EmbeddedResult>(json)) {
        Some(Ok(embedded)) => ParseOutcome::Parsed(embedded.into()),
        Some(Err(e)) => {
            log_debug!("Embedded JSON did not match schema: {}", e);
            ParseOutcome::SchemaMismatch(text.to_string())
        }
        None => ParseOutcome::SchemaMismatch(text.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

/// Maps web citation chunks to links, in provider order.
///
/// Returns `None` when the provider sent no grounding metadata at all.
/// Chunks without a web source, or that fail to parse, are dropped.
pub fn extract_grounding_links(grounding: Option<&GroundingMetadata>) -> Option<Vec<GroundingLink>> {
    let grounding = grounding?;

    let links = grounding
        .grounding_chunks
        .iter()
        .filter_map(|raw| match serde_json::from_value::<GroundingChunk>(raw.clone()) {
            Ok(chunk) => chunk.web,
            Err(e) => {
                log_debug!("Discarding unreadable grounding chunk: {}", e);
                None
            }
        })
        .filter_map(|web| {
            let url = web.uri?;
            Some(GroundingLink {
                title: web.title.unwrap_or_else(|| url.clone()),
                url,
            })
        })
        .collect();

    Some(links)
}

/// Normalizes a provider response for the given mode.
///
/// Search mode never fails: unparseable output is wrapped as a date plan.
/// Other modes surface [`RizzError::MalformedResponse`].
pub fn normalize(mode: Mode, response: &GenerateResponse) -> Result<AnalysisResult, RizzError> {
    if mode != Mode::Search {
        let mut result = parse_structured(&response.text).map_err(RizzError::MalformedResponse)?;
        result.grounding_links = None;
        return Ok(result);
    }

    let links = extract_grounding_links(response.grounding.as_ref());

    match extract_embedded(&response.text) {
        ParseOutcome::Parsed(mut result) => {
            result.grounding_links = links;
            Ok(result)
        }
        ParseOutcome::SchemaMismatch(raw) => {
            log_debug!("Search output was not structured; wrapping as a date plan");
            Ok(AnalysisResult::date_plan(&raw, links))
        }
    }
}
