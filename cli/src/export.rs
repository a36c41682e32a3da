use crate::store::Memo;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Text,
    Audio,
    Mixed,
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ExportKind::Text => "text",
            ExportKind::Audio => "audio",
            ExportKind::Mixed => "mixed",
        };
        f.write_str(kind)
    }
}

/// A memo rendered as a plain text file
#[derive(Debug, Clone, PartialEq)]
pub struct TextExport {
    pub kind: ExportKind,
    pub file_name: String,
    pub content: String,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Renders the memo's text and transcript; `None` when both are empty
pub fn export_text(memo: &Memo) -> Option<TextExport> {
    let text = non_empty(Some(memo.content.as_str()));
    let transcript = non_empty(memo.result.audio_transcript.as_deref());

    let (kind, content) = match (text, transcript) {
        (Some(text), Some(transcript)) => (
            ExportKind::Mixed,
            format!("{}\n\n[Audio transcript]\n{}", text, transcript),
        ),
        (Some(text), None) => (ExportKind::Text, text.to_string()),
        (None, Some(transcript)) => (ExportKind::Audio, transcript.to_string()),
        (None, None) => return None,
    };

    let file_name = format!(
        "{}_memo_{}_{}.txt",
        memo.created_at().format("%Y-%m-%d"),
        kind,
        memo.result.id
    );

    Some(TextExport {
        kind,
        file_name,
        content,
    })
}
