// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Generative scoring client.
//!
//! Sends the evaluation prompt to the Gemini `generateContent` endpoint with a
//! fixed JSON response schema and validates what comes back. One request per
//! call: no retries, and no timeout beyond the HTTP client defaults.

use crate::models::feedback::{Category, ScoredFeedback, ShapeError, MAX_SCORE};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model returned empty content")]
    EmptyContent,

    #[error("Model output rejected: {0}")]
    InvalidShape(#[from] ShapeError),
}

/// A service that turns an evaluation prompt into a validated structured
/// score.
#[async_trait]
pub trait ScoringModel: Send + Sync {
    async fn score(&self, prompt: &str, system: &str) -> Result<ScoredFeedback, ScoringError>;
}

// ─── Wire types ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
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
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.iter().find_map(|p| p.text.as_deref()))
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// JSON schema the model output must follow.
pub fn feedback_response_schema() -> Value {
    let names: Vec<&str> = Category::ALL.iter().map(|c| c.name()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "totalScore": { "type": "NUMBER", "minimum": 0, "maximum": MAX_SCORE },
            "categoryScores": {
                "type": "ARRAY",
                "minItems": names.len(),
                "maxItems": names.len(),
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "enum": names },
                        "score": { "type": "NUMBER", "minimum": 0, "maximum": MAX_SCORE },
                        "comment": { "type": "STRING" }
                    },
                    "required": ["name", "score", "comment"]
                }
            },
            "strengths": { "type": "ARRAY", "items": { "type": "STRING" } },
            "areasForImprovement": { "type": "ARRAY", "items": { "type": "STRING" } },
            "finalAssessment": { "type": "STRING" }
        },
        "required": [
            "totalScore",
            "categoryScores",
            "strengths",
            "areasForImprovement",
            "finalAssessment"
        ]
    })
}

/// Gemini structured-output client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, GEMINI_API_BASE.to_string())
    }

    /// Point the client at a different API host (local fakes in tests).
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            model,
            api_key,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ScoringModel for GeminiClient {
    async fn score(&self, prompt: &str, system: &str) -> Result<ScoredFeedback, ScoringError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: system }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: feedback_response_schema(),
            },
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            tracing::warn!(status = status.as_u16(), "Scoring API returned an error");
            return Err(ScoringError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: GenerateContentResponse = response.json().await?;
        if let Some(usage) = &response.usage_metadata {
            tracing::debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Scoring call succeeded"
            );
        }

        let text = response.text().ok_or(ScoringError::EmptyContent)?;
        parse_scored_feedback(text)
    }
}

/// Parse and validate the model's JSON text.
pub fn parse_scored_feedback(text: &str) -> Result<ScoredFeedback, ScoringError> {
    let scored: ScoredFeedback = serde_json::from_str(strip_json_fences(text))?;
    Ok(scored.validate()?)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(stripped)
        }
        None => text,
    }
}
