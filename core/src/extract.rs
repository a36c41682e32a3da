//! Recovers structured data from free-text model output.
//!
//! The model is asked for JSON but is not bound to answer with it, so
//! extraction is two-tier (fenced ```json block, then the widest brace-delimited
//! span) and anything unparsable degrades to a record built from the raw text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag attached to records synthesized from unstructured output
pub const UNSTRUCTURED_TAG: &str = "ai-processed";

const FALLBACK_SUMMARY_CHARS: usize = 200;
const FALLBACK_KEY_POINT_CHARS: usize = 100;

static FENCED_JSON: Lazy<Regex> = Lazy::new(|| Regex::new(r"```json\n([\s\S]*?)\n```").unwrap());
static BARE_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

/// Locates and parses the JSON embedded in `raw`.
///
/// Returns `None` when the selected span (or the whole string, if nothing
/// looks like JSON) does not parse.
pub fn extract_json(raw: &str) -> Option<Value> {
    let candidate = if let Some(captures) = FENCED_JSON.captures(raw) {
        captures.get(1).map_or("", |m| m.as_str())
    } else if let Some(m) = BARE_OBJECT.find(raw) {
        m.as_str()
    } else {
        raw
    };

    serde_json::from_str(candidate).ok()
}

/// Fields the processing prompt asks the model to return
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelOutput {
    pub summary: Option<String>,
    pub key_points: Vec<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub audio_transcript: Option<String>,
    pub processed_text: Option<String>,
}

impl ModelOutput {
    /// Reads the known fields out of a parsed value; missing or mistyped fields stay empty.
    pub fn from_value(value: &Value) -> Self {
        let string_field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        let string_list = |key: &str| {
            value.get(key).and_then(Value::as_array).map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
        };

        Self {
            summary: string_field("summary"),
            key_points: string_list("keyPoints").unwrap_or_default(),
            tags: string_list("tags"),
            category: string_field("category"),
            audio_transcript: string_field("audioTranscript"),
            processed_text: string_field("processedText"),
        }
    }

    /// Degraded record synthesized from raw text
    pub fn fallback(raw: &str) -> Self {
        Self {
            summary: Some(raw.chars().take(FALLBACK_SUMMARY_CHARS).collect()),
            key_points: vec![raw.chars().take(FALLBACK_KEY_POINT_CHARS).collect()],
            tags: Some(vec![UNSTRUCTURED_TAG.to_string()]),
            category: Some(crate::memo::Category::Other.as_str().to_string()),
            audio_transcript: None,
            processed_text: Some(raw.to_string()),
        }
    }

    /// Extracts the model's JSON answer, falling back to the raw text
    pub fn parse(raw: &str) -> Self {
        match extract_json(raw) {
            Some(value) => Self::from_value(&value),
            None => Self::fallback(raw),
        }
    }
}
