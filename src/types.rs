//! Core data model: modes, tones, suggestions and analysis results

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// Maximum number of suggestions kept on screen after "load more"
pub const MAX_VISIBLE_SUGGESTIONS: usize = 6;

/// Strategy selecting the target model and its capabilities
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Mode {
    /// Lightweight, low-latency model
    #[default]
    Fast,
    /// High-capability model with a bounded thinking budget
    Deep,
    /// High-capability model with web search attached
    Search,
}

impl Mode {
    /// Message shown while a request for this mode is in flight
    pub const fn loading_message(self) -> &'static str {
        match self {
            Self::Deep => "Analyzing Vibe...",
            Self::Fast | Self::Search => "Cooking Rizz...",
        }
    }
}

/// Stylistic bias applied to generated suggestions
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Tone {
    Flirty,
    Romantic,
    Funny,
    Casual,
    Unhinged,
    Professional,
}

/// Either a mix of tones or one specific tone.
///
/// Serialized as the bare tone name (`"Mixed"`, `"Flirty"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ToneSelection {
    #[default]
    Mixed,
    Specific(Tone),
}

const MIXED: &str = "Mixed";

impl fmt::Display for ToneSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mixed => f.write_str(MIXED),
            Self::Specific(tone) => write!(f, "{tone}"),
        }
    }
}

impl FromStr for ToneSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(MIXED) {
            return Ok(Self::Mixed);
        }
        s.parse::<Tone>()
            .map(Self::Specific)
            .map_err(|_| format!("Unknown tone: {s}"))
    }
}

impl From<ToneSelection> for String {
    fn from(value: ToneSelection) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ToneSelection {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tone> for ToneSelection {
    fn from(tone: Tone) -> Self {
        Self::Specific(tone)
    }
}

/// A single suggested reply (or date plan in search mode)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Tone label, or the plan title in search mode
    pub tone: String,
    /// Reply text, or the plan details in search mode
    pub reply: String,
    /// Short reason why it works
    pub explanation: String,
}

impl Suggestion {
    pub fn new(
        tone: impl Into<String>,
        reply: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            tone: tone.into(),
            reply: reply.into(),
            explanation: explanation.into(),
        }
    }
}

/// Source reference returned by a search-grounded call
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GroundingLink {
    pub title: String,
    pub url: String,
}

/// Normalized result of one generation request
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub suggestions: Vec<Suggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_links: Option<Vec<GroundingLink>>,
}

impl AnalysisResult {
    /// The well-typed stand-in returned when a request fails unrecoverably
    pub fn system_error() -> Self {
        Self {
            summary: "Error generating response".to_string(),
            suggestions: vec![Suggestion::new(
                "System Error",
                "I had a brain freeze. Try asking again?",
                "API request failed.",
            )],
            grounding_links: None,
        }
    }

    /// Wraps free-form search output as a single date-plan card
    pub fn date_plan(raw_text: &str, links: Option<Vec<GroundingLink>>) -> Self {
        Self {
            summary: "Date Plan Results".to_string(),
            suggestions: vec![Suggestion::new(
                "Date Plan",
                raw_text,
                "Generated based on real-time search data.",
            )],
            grounding_links: links,
        }
    }

    /// Folds a "load more" result into this one.
    ///
    /// Suggestions are concatenated and only the newest
    /// [`MAX_VISIBLE_SUGGESTIONS`] are retained, oldest first. The summary
    /// always comes from `self`; links come from `newer` when it has any.
    #[must_use]
    pub fn merge_more(self, newer: Self) -> Self {
        let mut suggestions = self.suggestions;
        suggestions.extend(newer.suggestions);
        let overflow = suggestions.len().saturating_sub(MAX_VISIBLE_SUGGESTIONS);
        suggestions.drain(..overflow);

        Self {
            summary: self.summary,
            suggestions,
            grounding_links: newer.grounding_links.or(self.grounding_links),
        }
    }
}

/// Base64 image payload with its media type
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    pub mime_type: String,
    pub data: String,
}

impl ImageData {
    pub const DEFAULT_MIME_TYPE: &'static str = "image/png";

    /// Wraps an already base64-encoded PNG payload
    pub fn png(data: impl Into<String>) -> Self {
        Self {
            mime_type: Self::DEFAULT_MIME_TYPE.to_string(),
            data: data.into(),
        }
    }

    /// Encodes raw image bytes
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// Guesses the media type from a file extension, defaulting to PNG
    pub fn mime_type_for_path(path: &Path) -> &'static str {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "heic" => "image/heic",
            _ => Self::DEFAULT_MIME_TYPE,
        }
    }
}

/// A past request and its result, as kept by the history store
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_mime_type: Option<String>,
    pub result: AnalysisResult,
    pub mode: Mode,
    pub tone: ToneSelection,
}

impl HistoryItem {
    pub fn new(
        prompt: &str,
        image: Option<&ImageData>,
        result: AnalysisResult,
        mode: Mode,
        tone: ToneSelection,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            prompt: prompt.to_string(),
            image_preview: image.map(|i| i.data.clone()),
            image_mime_type: image.map(|i| i.mime_type.clone()),
            result,
            mode,
            tone,
        }
    }

    /// Rebuilds the attached image, if any
    pub fn image(&self) -> Option<ImageData> {
        self.image_preview.as_ref().map(|data| ImageData {
            mime_type: self
                .image_mime_type
                .clone()
                .unwrap_or_else(|| ImageData::DEFAULT_MIME_TYPE.to_string()),
            data: data.clone(),
        })
    }

    /// Short label for listings
    pub fn label(&self) -> &str {
        if !self.prompt.is_empty() {
            &self.prompt
        } else if self.image_preview.is_some() {
            "Image Analysis"
        } else {
            "Empty Prompt"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(prefix: &str, count: usize) -> Vec<Suggestion> {
        (1..=count)
            .map(|i| Suggestion::new("Casual", format!("{prefix}{i}"), "e"))
            .collect()
    }

    fn result_with(summary: &str, suggestions: Vec<Suggestion>) -> AnalysisResult {
        AnalysisResult {
            summary: summary.to_string(),
            suggestions,
            grounding_links: None,
        }
    }

    #[test]
    fn test_merge_more_keeps_last_six_in_arrival_order() {
        let previous = result_with("first", numbered("a", 4));
        let newer = result_with("second", numbered("b", 4));

        let merged = previous.merge_more(newer);

        let replies: Vec<&str> = merged.suggestions.iter().map(|s| s.reply.as_str()).collect();
        assert_eq!(replies, vec!["a3", "a4", "b1", "b2", "b3", "b4"]);
        assert_eq!(merged.summary, "first");
    }

    #[test]
    fn test_merge_more_under_cap_keeps_everything() {
        let merged = result_with("s", numbered("a", 2)).merge_more(result_with("t", numbered("b", 3)));
        assert_eq!(merged.suggestions.len(), 5);
    }

    #[test]
    fn test_merge_more_links_prefer_newest() {
        let link = |t: &str| GroundingLink {
            title: t.to_string(),
            url: format!("https://example.com/{t}"),
        };
        let mut previous = result_with("s", vec![]);
        previous.grounding_links = Some(vec![link("old")]);

        let kept = previous.clone().merge_more(result_with("t", vec![]));
        assert_eq!(kept.grounding_links, Some(vec![link("old")]));

        let mut newer = result_with("t", vec![]);
        newer.grounding_links = Some(vec![link("new")]);
        let replaced = previous.merge_more(newer);
        assert_eq!(replaced.grounding_links, Some(vec![link("new")]));
    }

    #[test]
    fn test_tone_selection_parsing() {
        assert_eq!("mixed".parse::<ToneSelection>(), Ok(ToneSelection::Mixed));
        assert_eq!(
            "flirty".parse::<ToneSelection>(),
            Ok(ToneSelection::Specific(Tone::Flirty))
        );
        assert!("sarcastic".parse::<ToneSelection>().is_err());
        assert_eq!(ToneSelection::Specific(Tone::Unhinged).to_string(), "Unhinged");
    }

    #[test]
    fn test_tone_selection_serializes_as_plain_string() {
        let json = serde_json::to_string(&ToneSelection::Specific(Tone::Funny))
            .expect("tone should serialize");
        assert_eq!(json, "\"Funny\"");
        let parsed: ToneSelection = serde_json::from_str("\"Mixed\"").expect("tone should parse");
        assert_eq!(parsed, ToneSelection::Mixed);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(Mode::Search.to_string(), "search");
        assert_eq!("DEEP".parse::<Mode>().ok(), Some(Mode::Deep));
        assert_eq!(
            serde_json::to_string(&Mode::Fast).expect("mode should serialize"),
            "\"fast\""
        );
    }

    #[test]
    fn test_missing_required_fields_is_a_parse_failure() {
        assert!(serde_json::from_str::<AnalysisResult>(r#"{"summary":"s"}"#).is_err());
        assert!(serde_json::from_str::<AnalysisResult>(r#"{"suggestions":[]}"#).is_err());
        let empty: AnalysisResult = serde_json::from_str(r#"{"summary":"s","suggestions":[]}"#)
            .expect("empty suggestions are valid");
        assert!(empty.suggestions.is_empty());
        assert!(empty.grounding_links.is_none());
    }

    #[test]
    fn test_history_item_round_trips_image() {
        let image = ImageData::from_bytes(b"\x89PNG", "image/jpeg");
        let item = HistoryItem::new("", Some(&image), AnalysisResult::system_error(), Mode::Fast, ToneSelection::Mixed);
        assert_eq!(item.image(), Some(image));
        assert_eq!(item.label(), "Image Analysis");
    }

    #[test]
    fn test_mime_type_for_path() {
        assert_eq!(ImageData::mime_type_for_path(Path::new("chat.JPG")), "image/jpeg");
        assert_eq!(ImageData::mime_type_for_path(Path::new("chat")), "image/png");
    }
}
