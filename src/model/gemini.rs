//! Native client for the Gemini `generateContent` REST endpoint.
//!
//! One POST per [`GenerativeModel::generate`] call, no retries. The API key
//! goes in the `x-goog-api-key` header so it never appears in a logged URL.
//!
//! ## Wire format
//!
//! ```text
//! POST {base}/models/{model}:generateContent
//! { "contents": [ { "role": "user", "parts": [
//!     { "text": "<instruction>" },
//!     { "inlineData": { "mimeType": "image/jpeg", "data": "<base64>" } },
//!     { "text": "<job description>" } ] } ],
//!   "generationConfig": { "temperature": 0.2, "maxOutputTokens": 2048 } }
//! ```

use super::{GenerativeModel, Part};
use crate::config::{EvaluatorConfig, API_KEY_ENV, DEFAULT_API_BASE_URL};
use crate::error::AtsError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Gemini REST client.
pub struct GeminiModel {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    label: String,
    generation_config: Option<GenerationConfig>,
}

impl std::fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiModel")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GeminiModel {
    /// Create a client for `model` against the public Gemini endpoint.
    ///
    /// A missing key is accepted here and reported by the first call.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Result<Self, AtsError> {
        Self::build(api_key, model.into(), DEFAULT_API_BASE_URL.to_string(), None, None)
    }

    /// Create a client from an [`EvaluatorConfig`].
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self, AtsError> {
        let generation_config = GenerationConfig::from_config(config);
        Self::build(
            config.api_key.clone(),
            config.model.clone(),
            config.api_base_url.clone(),
            config.request_timeout_secs,
            generation_config,
        )
    }

    fn build(
        api_key: Option<String>,
        model: String,
        base_url: String,
        timeout_secs: Option<u64>,
        generation_config: Option<GenerationConfig>,
    ) -> Result<Self, AtsError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AtsError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            label: format!("gemini/{model}"),
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            generation_config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(&self, parts: &[Part<'_>]) -> Result<String, AtsError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| bad_credentials("no API key configured".to_string()))?;

        let body = build_request_body(parts, self.generation_config.as_ref());
        let start = Instant::now();

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("{}: request failed — {}", self.label, e);
                AtsError::ServiceUnavailable {
                    detail: if e.is_timeout() {
                        format!("request timed out: {e}")
                    } else {
                        e.to_string()
                    },
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AtsError::ServiceUnavailable {
                detail: format!("failed to read response body: {e}"),
            })?;

        debug!(
            "{}: HTTP {} in {}ms ({} bytes)",
            self.label,
            status.as_u16(),
            start.elapsed().as_millis(),
            text.len()
        );

        if !status.is_success() {
            return Err(classify_failure(status, &text));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| AtsError::ServiceUnavailable {
                detail: format!("malformed response: {e}"),
            })?;
        extract_text(parsed)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    fn from_config(config: &EvaluatorConfig) -> Option<Self> {
        if config.temperature.is_none() && config.max_output_tokens.is_none() {
            return None;
        }
        Some(Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<&'a GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum WirePart<'a> {
    Text(&'a str),
    InlineData(InlineData<'a>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

fn build_request_body<'a>(
    parts: &'a [Part<'a>],
    generation_config: Option<&'a GenerationConfig>,
) -> GenerateContentRequest<'a> {
    let wire_parts = parts
        .iter()
        .map(|part| match *part {
            Part::Text(text) => WirePart::Text(text),
            Part::Image(payload) => WirePart::InlineData(InlineData {
                mime_type: &payload.mime_type,
                data: &payload.data,
            }),
        })
        .collect();

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: wire_parts,
        }],
        generation_config,
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, AtsError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            warn!("Prompt blocked by the model: {}", reason);
        }
        return Err(AtsError::EmptyResponse);
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        if let Some(reason) = candidate.finish_reason {
            warn!("Empty candidate, finish reason: {}", reason);
        }
        return Err(AtsError::EmptyResponse);
    }
    Ok(text)
}

fn bad_credentials(detail: String) -> AtsError {
    AtsError::InvalidCredentials {
        detail,
        hint: format!("Set {API_KEY_ENV} (or pass --api-key)."),
    }
}

/// Map a non-2xx response to an error.
///
/// Gemini reports a bad key as `400 INVALID_ARGUMENT` with "API key not
/// valid" in the message, so 400 is inspected as well as 401/403.
fn classify_failure(status: StatusCode, body: &str) -> AtsError {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.chars().take(200).collect());
    let api_status = parsed.and_then(|e| e.error.status).unwrap_or_default();
    let detail = format!("HTTP {}: {}", status.as_u16(), message);

    let bad_key = message.contains("API key")
        || api_status == "UNAUTHENTICATED"
        || api_status == "PERMISSION_DENIED";

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => bad_credentials(detail),
        StatusCode::BAD_REQUEST if bad_key => bad_credentials(detail),
        _ => AtsError::ServiceUnavailable { detail },
    }
}
