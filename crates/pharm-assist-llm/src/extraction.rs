//! Prescription extraction from vision model output.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Model request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

impl From<reqwest::Error> for ExtractionError {
    // Request URLs never reach error text or logs.
    fn from(e: reqwest::Error) -> Self {
        ExtractionError::Request(e.without_url())
    }
}

/// Parsed model output for one prescription.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionOutput {
    #[serde(default)]
    pub medicines: Vec<RawMedicine>,
}

/// A single medicine entry as the model reported it.
///
/// Every field is kept as text: the model is free to send `"2"` or `2`, and
/// interpretation happens downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawMedicine {
    #[serde(default = "default_name", deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(default = "default_number", deserialize_with = "lenient_string")]
    pub frequency: String,
    #[serde(default = "default_number", deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(default = "default_number", deserialize_with = "lenient_string")]
    pub required_quantity: String,
    #[serde(
        rename = "Availability",
        alias = "availability",
        default = "default_availability",
        deserialize_with = "lenient_string"
    )]
    pub availability: String,
}

impl RawMedicine {
    /// Whether the model judged this medicine available (case-insensitive "yes").
    pub fn reported_available(&self) -> bool {
        self.availability.trim().eq_ignore_ascii_case("yes")
    }
}

fn default_name() -> String {
    "N/A".into()
}

fn default_number() -> String {
    "0".into()
}

fn default_availability() -> String {
    "No".into()
}

/// Accept strings, numbers, booleans and null as text.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_text(serde_json::Value::deserialize(deserializer)?).map_err(D::Error::custom)
}

/// Like [`lenient_string`], but a null name reads the same as a missing one.
fn lenient_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(default_name()),
        other => scalar_text(other).map_err(D::Error::custom),
    }
}

fn scalar_text(value: serde_json::Value) -> Result<String, String> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(if b { "Yes".into() } else { "No".into() }),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(format!("expected a scalar value, found {}", other)),
    }
}

/// Strip a surrounding markdown code fence (optionally tagged `json`).
///
/// Text that does not open with a fence is returned trimmed but otherwise untouched.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse raw model text into a structured prescription.
pub fn parse_prescription(raw: &str) -> ExtractionResult<PrescriptionOutput> {
    let json = strip_code_fences(raw);
    if json.is_empty() {
        return Err(ExtractionError::InvalidFormat(
            "Empty response from model".into(),
        ));
    }

    let output: PrescriptionOutput = serde_json::from_str(json)?;
    Ok(output)
}
