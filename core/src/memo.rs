use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest attachment accepted for a multimodal submission (20 MiB)
pub const MAX_ATTACHMENT_BYTES: u64 = 20 * 1024 * 1024;

/// Memo category. Unknown labels from the model or from callers become `Other`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Category {
    Meeting,
    Presentation,
    Document,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Meeting,
        Category::Presentation,
        Category::Document,
        Category::Other,
    ];

    /// Maps a free-form label onto the fixed category set.
    ///
    /// Accepts the English names (any case) and the Japanese labels used by
    /// the web client.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "meeting" | "会議" => Category::Meeting,
            "presentation" | "プレゼン" | "プレゼンテーション" => Category::Presentation,
            "document" | "資料" => Category::Document,
            _ => Category::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Meeting => "meeting",
            Category::Presentation => "presentation",
            Category::Document => "document",
            Category::Other => "other",
        }
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Category::from_label(&label)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor of an attachment that was sent to the model
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
}

/// Canonical result of processing one multimodal submission
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemoProcessingResult {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub original_text: String,
    pub processed_text: String,
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Category,
}

/// A file attachment as submitted by the caller (base64 payload)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FileAttachment {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub data: String,
    #[serde(default)]
    pub size: u64,
}

/// An audio attachment (recorded memo or transcription input)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AudioAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Payload of the `processMultimodal` action
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MultimodalRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub files: Vec<FileAttachment>,
    #[serde(default)]
    pub audio_blob: Option<AudioAttachment>,
}

/// Lightweight projection of a memo used for ranking
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchCandidate {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<&MemoProcessingResult> for SearchCandidate {
    fn from(memo: &MemoProcessingResult) -> Self {
        Self {
            id: memo.id.clone(),
            summary: memo.summary.clone(),
            tags: memo.tags.clone(),
            category: memo.category,
            timestamp: Some(memo.timestamp),
        }
    }
}

/// Payload of the `search` action
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub existing_content: Vec<SearchCandidate>,
}

/// One ranked search hit
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRankResult {
    pub id: String,
    pub relevance_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Options of the `transcribe` action
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TranscribeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Payload of the `transcribe` action
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeRequest {
    pub audio_data: AudioAttachment,
    #[serde(default)]
    pub options: TranscribeOptions,
}

/// Result of a transcription call. `confidence` is a constant, not a measurement.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TranscriptionResult {
    pub text: String,
    pub language: String,
    pub confidence: f64,
}

/// Records that can be looked up by identifier
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for SearchCandidate {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for MemoProcessingResult {
    fn id(&self) -> &str {
        &self.id
    }
}
