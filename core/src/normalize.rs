//! Maps model output onto the canonical memo record.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::client::ContentGenerator;
use crate::errors::GeminiResult;
use crate::extract::ModelOutput;
use crate::memo::{Category, FileDescriptor, MemoProcessingResult, MultimodalRequest};
use crate::prompt::build_multimodal_parts;

/// New memo identifier: `content_` followed by a simple UUIDv7
pub fn new_memo_id() -> String {
    format!("content_{}", Uuid::now_v7().simple())
}

/// Builds the record for one submission from (possibly degraded) model output
pub fn normalize(
    output: ModelOutput,
    original_text: &str,
    files: Vec<FileDescriptor>,
) -> MemoProcessingResult {
    let processed_text = output
        .processed_text
        .clone()
        .or_else(|| output.summary.clone())
        .unwrap_or_default();

    MemoProcessingResult {
        id: new_memo_id(),
        timestamp: Utc::now(),
        original_text: original_text.to_string(),
        processed_text,
        files,
        audio_transcript: output.audio_transcript,
        summary: output.summary,
        key_points: output.key_points,
        tags: output.tags.unwrap_or_default(),
        category: output
            .category
            .as_deref()
            .map(Category::from_label)
            .unwrap_or_default(),
    }
}

/// Runs one multimodal submission through the model and normalizes the answer.
///
/// Oversized attachments fail before the model is called. Unparsable output
/// never fails; it yields a fallback record.
pub async fn process_multimodal(
    generator: &dyn ContentGenerator,
    request: &MultimodalRequest,
    max_attachment_bytes: u64,
) -> GeminiResult<MemoProcessingResult> {
    let built = build_multimodal_parts(request, max_attachment_bytes)?;
    debug!(attachments = built.files.len(), "Submitting multimodal content");

    let raw = generator.generate(built.parts).await?;
    let output = ModelOutput::parse(&raw);
    let memo = normalize(output, &request.text, built.files);

    info!(id = %memo.id, category = %memo.category, tags = memo.tags.len(), "Processed memo");
    Ok(memo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GeminiError;
    use crate::extract::UNSTRUCTURED_TAG;
    use crate::memo::{FileAttachment, MAX_ATTACHMENT_BYTES};
    use crate::testing::ScriptedGenerator;
    use serde_json::json;

    #[test]
    fn test_processed_text_falls_back_to_summary() {
        let output = ModelOutput::from_value(&json!({"summary": "short"}));
        let memo = normalize(output, "input", vec![]);
        assert_eq!(memo.processed_text, "short");
        assert_eq!(memo.summary.as_deref(), Some("short"));
        assert!(memo.tags.is_empty());
        assert_eq!(memo.category, Category::Other);
        assert!(memo.id.starts_with("content_"));
    }

    #[test]
    fn test_empty_object_still_has_tags_and_category() {
        let memo = normalize(ModelOutput::from_value(&json!({})), "", vec![]);
        assert_eq!(memo.processed_text, "");
        assert!(memo.tags.is_empty());
        assert_eq!(memo.category, Category::Other);

        let value = serde_json::to_value(&memo).unwrap();
        assert_eq!(value["tags"], json!([]));
        assert_eq!(value["category"], json!("other"));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = new_memo_id();
        let b = new_memo_id();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_process_structured_answer() {
        let generator = ScriptedGenerator::replying(
            "```json\n{\"summary\":\"Sync\",\"keyPoints\":[\"ship it\"],\"tags\":[\"team\",\"weekly\"],\"category\":\"meeting\",\"processedText\":\"Full notes\"}\n```",
        );
        let request = MultimodalRequest {
            text: "notes from sync".to_string(),
            ..MultimodalRequest::default()
        };

        let memo = process_multimodal(&generator, &request, MAX_ATTACHMENT_BYTES)
            .await
            .unwrap();
        assert_eq!(memo.processed_text, "Full notes");
        assert_eq!(memo.original_text, "notes from sync");
        assert_eq!(memo.tags, vec!["team", "weekly"]);
        assert_eq!(memo.category, Category::Meeting);
        assert_eq!(memo.key_points, vec!["ship it"]);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_process_unstructured_answer_degrades() {
        let generator = ScriptedGenerator::replying("I could not format this, sorry.");
        let memo = process_multimodal(&generator, &MultimodalRequest::default(), MAX_ATTACHMENT_BYTES)
            .await
            .unwrap();

        assert_eq!(memo.tags, vec![UNSTRUCTURED_TAG]);
        assert_eq!(memo.category, Category::Other);
        assert_eq!(memo.processed_text, "I could not format this, sorry.");
    }

    #[tokio::test]
    async fn test_oversized_file_never_reaches_model() {
        let generator = ScriptedGenerator::replying("{}");
        let request = MultimodalRequest {
            text: "with video".to_string(),
            files: vec![FileAttachment {
                name: "lecture.mp4".to_string(),
                mime_type: "video/mp4".to_string(),
                data: String::new(),
                size: 20 * 1024 * 1024 + 1,
            }],
            audio_blob: None,
        };

        let err = process_multimodal(&generator, &request, MAX_ATTACHMENT_BYTES)
            .await
            .unwrap_err();
        assert!(matches!(err, GeminiError::AttachmentTooLarge { ref name, .. } if name == "lecture.mp4"));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let generator = ScriptedGenerator::failing("quota exceeded");
        let err = process_multimodal(&generator, &MultimodalRequest::default(), MAX_ATTACHMENT_BYTES)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
