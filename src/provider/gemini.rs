use super::{
    ContentPart, GenerateRequest, GenerateResponse, GenerativeApi, GroundingMetadata,
    ProviderError,
};
use crate::log_debug;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

/// Public endpoint of the Generative Language API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini REST client for the `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client against `base_url` (no trailing slash needed)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

/// Builds the wire body for a request
pub fn build_request_body(request: &GenerateRequest) -> Value {
    let parts: Vec<Value> = request
        .parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => json!({ "text": text }),
            ContentPart::InlineImage(image) => json!({
                "inlineData": {
                    "mimeType": image.mime_type,
                    "data": image.data,
                }
            }),
        })
        .collect();

    let mut body = json!({
        "contents": [
            {
                "role": "user",
                "parts": parts,
            }
        ],
        "systemInstruction": {
            "parts": [{ "text": request.system_instruction }]
        },
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": request.response_schema,
        }
    });

    if let Some(budget) = request.thinking_budget {
        body["generationConfig"]["thinkingConfig"] = json!({ "thinkingBudget": budget });
    }

    if request.search_tool {
        body["tools"] = json!([{ "googleSearch": {} }]);
    }

    body
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    content: Option<WireContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct WireContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Deserialize)]
struct WirePart {
    text: Option<String>,
}

/// Reduces a raw `generateContent` body to text plus grounding metadata
pub fn parse_response_body(body: Value) -> Result<GenerateResponse, ProviderError> {
    let wire: WireResponse =
        serde_json::from_value(body).map_err(|e| ProviderError::Decode(e.to_string()))?;

    let Some(candidate) = wire.candidates.into_iter().next() else {
        log_debug!("Gemini response contained no candidates");
        return Ok(GenerateResponse::default());
    };

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(GenerateResponse {
        text,
        grounding: candidate.grounding_metadata,
    })
}

#[async_trait]
impl GenerativeApi for GeminiClient {
    async fn generate_content(
        &self,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError> {
        log_debug!(
            "Calling Gemini model {} (thinking: {:?}, search: {})",
            request.model,
            request.thinking_budget,
            request.search_tool
        );

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(&build_request_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(ProviderError::Status { status, body });
        }

        let body: Value = response.json().await?;
        parse_response_body(body)
    }
}
