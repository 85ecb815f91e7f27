//! Vision model clients.
//!
//! [`ExtractionClient`] is the only contract the reconciliation pipeline relies
//! on: instruction text plus an image in, free-form text out. No schema is
//! enforced here; validation is the job of [`crate::parse_prescription`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use serde_json::json;

use crate::extraction::{ExtractionError, ExtractionResult};
use crate::image::PrescriptionImage;
use crate::prompts::DEFAULT_GEMINI_MODEL;

/// Base URL of the Google generative language REST API.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Request header carrying the API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// A model that turns an instruction and an image into raw text.
pub trait ExtractionClient: Send + Sync {
    fn extract(&self, instruction: &str, image: &PrescriptionImage) -> ExtractionResult<String>;
}

/// Gemini `generateContent` client. Each call is attempted once and blocks
/// until the model responds.
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    /// Create a client for the given API key and model name.
    pub fn new(api_key: impl Into<String>, model: Option<String>) -> ExtractionResult<Self> {
        let http = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            api_base: GEMINI_API_BASE.to_string(),
        })
    }

    /// Point the client at a different API base (proxies, local stubs).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

impl ExtractionClient for GeminiClient {
    fn extract(&self, instruction: &str, image: &PrescriptionImage) -> ExtractionResult<String> {
        if image.is_empty() {
            return Err(ExtractionError::InvalidFormat("No image provided".into()));
        }

        tracing::info!(
            model = %self.model,
            mime_type = %image.mime_type,
            bytes = image.bytes.len(),
            "sending prescription to vision model"
        );
        let start = Instant::now();

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&build_request_body(instruction, image))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!(status = status.as_u16(), "vision model returned an error");
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json()?;
        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "vision model responded"
        );

        extract_response_text(&body).ok_or_else(|| {
            ExtractionError::InvalidFormat("No text candidate in model response".into())
        })
    }
}

/// Build a `generateContent` request with the instruction and inline image.
pub fn build_request_body(instruction: &str, image: &PrescriptionImage) -> serde_json::Value {
    json!({
        "contents": [
            {
                "role": "user",
                "parts": [
                    { "text": instruction },
                    {
                        "inlineData": {
                            "mimeType": image.mime_type,
                            "data": image.to_base64()
                        }
                    }
                ]
            }
        ]
    })
}

/// Concatenate the text parts of the first candidate.
///
/// Gemini format: candidates[0].content.parts[*].text
pub fn extract_response_text(body: &serde_json::Value) -> Option<String> {
    let parts = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text.trim().to_string())
    }
}

/// Client that replays a fixed response (for tests and offline runs).
pub struct ScriptedClient {
    response: Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    /// Always answer with the given text.
    pub fn responding(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail as if the model rejected the request.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of extraction calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ExtractionClient for ScriptedClient {
    fn extract(&self, _instruction: &str, _image: &PrescriptionImage) -> ExtractionResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(ExtractionError::Status {
                status: 500,
                body: message.clone(),
            }),
        }
    }
}
