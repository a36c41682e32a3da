use tracing::info;

use crate::client::ContentGenerator;
use crate::errors::GeminiResult;
use crate::memo::{TranscribeRequest, TranscriptionResult};
use crate::prompt::build_transcription_prompt;
use crate::types::Part;

pub const DEFAULT_TRANSCRIPTION_MIME: &str = "audio/webm";
pub const DEFAULT_LANGUAGE: &str = "ja";
/// Reported with every transcript; not a calibrated probability
pub const TRANSCRIPTION_CONFIDENCE: f64 = 0.95;

/// Transcribes one audio attachment with a single model call
pub async fn transcribe_audio(
    generator: &dyn ContentGenerator,
    request: &TranscribeRequest,
) -> GeminiResult<TranscriptionResult> {
    let options = &request.options;
    let prompt = build_transcription_prompt(options.language.as_deref(), options.prompt.as_deref());

    let mime_type = request
        .audio_data
        .mime_type
        .clone()
        .unwrap_or_else(|| DEFAULT_TRANSCRIPTION_MIME.to_string());

    let parts = vec![
        Part::text(prompt),
        Part::inline_data(mime_type, request.audio_data.data.clone()),
    ];
    let text = generator.generate(parts).await?;

    let language = options
        .language
        .clone()
        .filter(|lang| !lang.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    info!(language = %language, chars = text.chars().count(), "Transcribed audio");

    Ok(TranscriptionResult {
        text,
        language,
        confidence: TRANSCRIPTION_CONFIDENCE,
    })
}
