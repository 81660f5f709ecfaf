//! Google Generative Language API transport.
//!
//! Sends `POST {api_base}/models/{model}:generateContent` with the prompt as a
//! single user part and the flow's shape as `responseSchema`, then returns the
//! text of the first candidate.
use super::{GenerationRequest, ModelTransport};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ERROR_BODY_LIMIT: usize = 500;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u64>,
    #[serde(default)]
    candidates_token_count: Option<u64>,
}

/// HTTPS transport for Gemini models.
pub struct GeminiTransport {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl GeminiTransport {
    pub fn new(api_base: &str, model: &str, api_key: &str) -> Self {
        // Status codes are inspected here so the error body can be reported.
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            endpoint: endpoint_url(api_base, model),
            api_key: api_key.to_string(),
        }
    }
}

fn endpoint_url(api_base: &str, model: &str) -> String {
    let model = model.strip_prefix("models/").unwrap_or(model);
    format!(
        "{}/models/{}:generateContent",
        api_base.trim_end_matches('/'),
        model
    )
}

fn build_body<'a>(request: &GenerationRequest<'a>) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part {
                text: request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: request.schema.to_gemini_schema(),
        },
    }
}

/// Pull the reply text out of a decoded response.
fn reply_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(anyhow!("prompt blocked by model: {reason}"));
    }
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("model returned no candidates"))?;
    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        return Err(anyhow!("model returned no text (finish reason: {reason})"));
    }
    Ok(text)
}

impl ModelTransport for GeminiTransport {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        let body = build_body(request);
        tracing::debug!(endpoint = %self.endpoint, flow = request.flow, "sending generateContent");

        let mut response = self
            .agent
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .send_json(&body)
            .with_context(|| format!("POST {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.body_mut().read_to_string().unwrap_or_default();
            let snippet: String = text.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(anyhow!(
                "generateContent returned HTTP {}: {}",
                status.as_u16(),
                snippet.trim()
            ));
        }

        let decoded: GenerateContentResponse = response
            .body_mut()
            .read_json()
            .context("decode generateContent response")?;
        if let Some(usage) = &decoded.usage_metadata {
            tracing::debug!(
                prompt_tokens = usage.prompt_token_count,
                reply_tokens = usage.candidates_token_count,
                "generateContent usage"
            );
        }
        reply_text(decoded)
    }
}
