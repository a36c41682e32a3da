use colored::*;
use inukadas_cli::Memo;
use inukadas_core::TranscriptionResult;

const PREVIEW_CHARS: usize = 80;

fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    let mut preview: String = line.chars().take(PREVIEW_CHARS).collect();
    if line.chars().count() > PREVIEW_CHARS || text.lines().nth(1).is_some() {
        preview.push('…');
    }
    preview
}

/// One-line timeline entry
pub fn print_memo_line(memo: &Memo) {
    let headline = memo
        .result
        .summary
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(&memo.content);

    println!(
        "{} {} {} {}",
        memo.created_at().format("%Y-%m-%d %H:%M").to_string().dimmed(),
        format!("[{}]", memo.result.category).cyan(),
        memo.result.id.yellow(),
        preview(headline)
    );
}

/// Full memo view
pub fn print_memo(memo: &Memo) {
    println!("{} {}", "Memo".green().bold(), memo.result.id.yellow());
    println!(
        "  {} {}",
        "Created:".bold(),
        memo.created_at().format("%Y-%m-%d %H:%M:%S")
    );
    println!("  {} {}", "Category:".bold(), memo.result.category);

    if let Some(summary) = &memo.result.summary {
        println!("  {} {}", "Summary:".bold(), summary);
    }
    if !memo.result.key_points.is_empty() {
        println!("  {}", "Key points:".bold());
        for point in &memo.result.key_points {
            println!("    {}  {}", "•".yellow(), point);
        }
    }
    if !memo.result.tags.is_empty() {
        let tags: Vec<String> = memo.result.tags.iter().map(|t| format!("#{}", t)).collect();
        println!("  {} {}", "Tags:".bold(), tags.join(" ").blue());
    }
    for file in &memo.result.files {
        println!(
            "  {} {} ({}, {} bytes)",
            "File:".bold(),
            file.name,
            file.mime_type,
            file.size
        );
    }
    if let Some(transcript) = &memo.result.audio_transcript {
        println!("  {}\n{}", "Transcript:".bold(), transcript);
    }
    if !memo.content.is_empty() {
        println!("  {}\n{}", "Text:".bold(), memo.content);
    }
}

pub fn print_transcription(result: &TranscriptionResult) {
    println!(
        "{} ({}, confidence {:.2})",
        "Transcript".green().bold(),
        result.language,
        result.confidence
    );
    println!("{}", result.text);
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_notice(message: &str) {
    println!("{}", message.yellow());
}
