//! Prompt and content-part assembly for the three proxy operations.

use crate::errors::{GeminiError, GeminiResult};
use crate::memo::{Category, FileDescriptor, MultimodalRequest, SearchCandidate};
use crate::types::Part;

pub const RECORDED_AUDIO_NAME: &str = "recorded_audio.wav";
pub const DEFAULT_RECORDING_MIME: &str = "audio/wav";

/// Content parts for one model call plus descriptors of the attachments they carry
#[derive(Debug, Clone, PartialEq)]
pub struct MultimodalParts {
    pub parts: Vec<Part>,
    pub files: Vec<FileDescriptor>,
}

/// Builds the processing request: instruction prompt first, then the recorded
/// audio (if any), then each file in submission order.
///
/// Attachments larger than `max_attachment_bytes` are rejected here, before
/// anything is sent. The larger of the declared size and the decoded payload
/// length is checked, so an omitted `size` cannot slip past the limit.
pub fn build_multimodal_parts(
    request: &MultimodalRequest,
    max_attachment_bytes: u64,
) -> GeminiResult<MultimodalParts> {
    let mut parts = vec![Part::text(processing_prompt(&request.text))];
    let mut files = Vec::with_capacity(request.files.len() + 1);

    if let Some(audio) = &request.audio_blob {
        let decoded = decoded_len(&audio.data);
        let size = audio.size.unwrap_or(decoded);
        check_size(RECORDED_AUDIO_NAME, size.max(decoded), max_attachment_bytes)?;

        let mime_type = audio
            .mime_type
            .clone()
            .unwrap_or_else(|| DEFAULT_RECORDING_MIME.to_string());
        parts.push(Part::inline_data(mime_type.clone(), audio.data.clone()));
        files.push(FileDescriptor {
            name: RECORDED_AUDIO_NAME.to_string(),
            mime_type,
            size,
        });
    }

    for file in &request.files {
        let decoded = decoded_len(&file.data);
        check_size(&file.name, file.size.max(decoded), max_attachment_bytes)?;

        parts.push(Part::inline_data(file.mime_type.clone(), file.data.clone()));
        files.push(FileDescriptor {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.size,
        });
    }

    Ok(MultimodalParts { parts, files })
}

/// Byte length of a base64 payload once decoded
fn decoded_len(data: &str) -> u64 {
    let data = data.trim_end();
    let padding = data.bytes().rev().take(2).filter(|b| *b == b'=').count() as u64;
    (data.len() as u64 * 3 / 4).saturating_sub(padding)
}

fn check_size(name: &str, size: u64, limit: u64) -> GeminiResult<()> {
    if size > limit {
        return Err(GeminiError::AttachmentTooLarge {
            name: name.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

fn processing_prompt(text: &str) -> String {
    let categories = Category::ALL
        .iter()
        .map(Category::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"
Analyze the following input and organize it as minutes or a record.
Write every field in the same language as the input.

[Input text]
{text}

[Requirements]
1. Summarize the content
2. Extract 3-5 key points
3. Propose 3-5 suitable tags
4. Choose exactly one category from: {categories}
5. If audio is attached, include a transcript of it

[Output format]
Respond with JSON in the following shape:
{{
  "summary": "summary",
  "keyPoints": ["point 1", "point 2"],
  "tags": ["tag 1", "tag 2"],
  "category": "category",
  "audioTranscript": "transcript of the audio (only when audio is attached)",
  "processedText": "the whole content, organized"
}}
"#
    )
}

/// Builds the ranking prompt for `query` over the candidate projection
pub fn build_search_prompt(query: &str, candidates: &[SearchCandidate]) -> GeminiResult<String> {
    let listing = serde_json::to_string_pretty(candidates)?;

    Ok(format!(
        r#"
From the existing content below, select the entries most relevant to the search query.

Search query: "{query}"

Existing content:
{listing}

[Requirements]
1. Order the content IDs from most to least relevant to the query
2. Exclude entries with low relevance
3. Explain why each entry is relevant

[Output format]
{{
  "results": [
    {{
      "id": "content_id",
      "relevanceScore": 0.9,
      "reason": "why it is relevant"
    }}
  ]
}}
"#
    ))
}

/// Human-readable name of a language hint as it appears in the prompt
pub fn language_label(language: Option<&str>) -> String {
    match language {
        Some("ja") => "Japanese".to_string(),
        Some("en") => "English".to_string(),
        Some(other) if !other.trim().is_empty() => other.to_string(),
        _ => "auto-detect".to_string(),
    }
}

/// Builds the transcription instruction
pub fn build_transcription_prompt(language: Option<&str>, instruction: Option<&str>) -> String {
    let mut prompt = format!(
        "\nTranscribe this audio file.\nLanguage: {}\n",
        language_label(language)
    );

    if let Some(extra) = instruction.filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("Additional instructions: {}\n", extra));
    }

    prompt.push_str(
        "\nFollow these rules:\n\
         - Output only the transcript\n\
         - Add punctuation where appropriate\n\
         - Break lines only between paragraphs\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memo::{AudioAttachment, FileAttachment, MAX_ATTACHMENT_BYTES};

    fn file(name: &str, size: u64) -> FileAttachment {
        FileAttachment {
            name: name.to_string(),
            mime_type: "application/pdf".to_string(),
            data: "JVBERi0=".to_string(),
            size,
        }
    }

    #[test]
    fn test_prompt_comes_first_then_audio_then_files() {
        let request = MultimodalRequest {
            text: "weekly sync".to_string(),
            files: vec![file("a.pdf", 10), file("b.pdf", 20)],
            audio_blob: Some(AudioAttachment {
                mime_type: None,
                data: "UklGRg==".to_string(),
                size: Some(4),
            }),
        };

        let built = build_multimodal_parts(&request, MAX_ATTACHMENT_BYTES).unwrap();
        assert_eq!(built.parts.len(), 4);
        assert!(built.parts[0].text.as_deref().unwrap().contains("weekly sync"));

        let audio = built.parts[1].inline_data.as_ref().unwrap();
        assert_eq!(audio.mime_type, DEFAULT_RECORDING_MIME);
        assert_eq!(audio.data, "UklGRg==");

        let names: Vec<&str> = built.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec![RECORDED_AUDIO_NAME, "a.pdf", "b.pdf"]);
        assert_eq!(built.files[0].size, 4);
    }

    #[test]
    fn test_text_only_request_has_just_the_prompt() {
        let request = MultimodalRequest {
            text: "just text".to_string(),
            ..MultimodalRequest::default()
        };
        let built = build_multimodal_parts(&request, MAX_ATTACHMENT_BYTES).unwrap();
        assert_eq!(built.parts.len(), 1);
        assert!(built.files.is_empty());
    }

    #[test]
    fn test_oversized_file_is_rejected_by_name() {
        let request = MultimodalRequest {
            text: String::new(),
            files: vec![file("ok.pdf", 1), file("huge.mov", MAX_ATTACHMENT_BYTES + 1)],
            audio_blob: None,
        };

        let err = build_multimodal_parts(&request, MAX_ATTACHMENT_BYTES).unwrap_err();
        match &err {
            GeminiError::AttachmentTooLarge { name, size, .. } => {
                assert_eq!(name, "huge.mov");
                assert_eq!(*size, MAX_ATTACHMENT_BYTES + 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("huge.mov"));
    }

    #[test]
    fn test_decoded_len() {
        assert_eq!(decoded_len("aGVsbG8="), 5);
        assert_eq!(decoded_len("UklGRg=="), 4);
        assert_eq!(decoded_len("GkXf"), 3);
        assert_eq!(decoded_len(""), 0);
    }

    #[test]
    fn test_undeclared_size_is_measured_from_payload() {
        let mut large = file("hidden.bin", 0);
        large.data = "A".repeat(4 * 10);

        let request = MultimodalRequest {
            text: String::new(),
            files: vec![large],
            audio_blob: Some(AudioAttachment {
                mime_type: None,
                data: "UklGRg==".to_string(),
                size: None,
            }),
        };

        let err = build_multimodal_parts(&request, 29).unwrap_err();
        assert!(matches!(
            err,
            GeminiError::AttachmentTooLarge { ref name, size: 30, limit: 29 } if name == "hidden.bin"
        ));

        let built = build_multimodal_parts(&request, 30).unwrap();
        assert_eq!(built.files[0].size, 4);
    }

    #[test]
    fn test_file_at_exact_limit_is_accepted() {
        let request = MultimodalRequest {
            text: String::new(),
            files: vec![file("edge.bin", MAX_ATTACHMENT_BYTES)],
            audio_blob: None,
        };
        assert!(build_multimodal_parts(&request, MAX_ATTACHMENT_BYTES).is_ok());
    }

    #[test]
    fn test_search_prompt_lists_candidates() {
        let candidates = vec![SearchCandidate {
            id: "content_7".to_string(),
            summary: Some("team meeting notes".to_string()),
            tags: vec!["work".to_string()],
            category: Category::Meeting,
            timestamp: None,
        }];
        let prompt = build_search_prompt("meeting", &candidates).unwrap();
        assert!(prompt.contains("Search query: \"meeting\""));
        assert!(prompt.contains("content_7"));
        assert!(prompt.contains("\"relevanceScore\""));
    }

    #[test]
    fn test_transcription_prompt_language_and_instruction() {
        let prompt = build_transcription_prompt(Some("ja"), Some("names are Tanaka and Sato"));
        assert!(prompt.contains("Language: Japanese"));
        assert!(prompt.contains("Additional instructions: names are Tanaka and Sato"));

        let prompt = build_transcription_prompt(None, None);
        assert!(prompt.contains("Language: auto-detect"));
        assert!(!prompt.contains("Additional instructions"));
    }
}
