use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use inukadas_cli::export::export_text;
use inukadas_cli::{Memo, MemoInput, MemoStore, ProxyClient};
use inukadas_core::TranscribeOptions;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::cli::Command;
use crate::output::{print_memo, print_memo_line, print_notice, print_success, print_transcription};

/// Runs `task` behind a spinner
async fn with_spinner<F, T>(message: &str, task: F) -> T
where
    F: Future<Output = T>,
{
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));

    let output = task.await;
    spinner.finish_and_clear();
    output
}

pub async fn run(command: Command, client: &ProxyClient, store_path: PathBuf) -> Result<()> {
    let mut store = MemoStore::load(&store_path)
        .with_context(|| format!("Failed to open memo store {}", store_path.display()))?;

    match command {
        Command::Add { text, files, audio } => {
            let input = MemoInput { text, files, audio };
            if input.text.trim().is_empty() && input.files.is_empty() && input.audio.is_none() {
                print_notice("Nothing to add: pass --text, --file or --audio.");
                return Ok(());
            }

            let result = with_spinner("Processing memo...", client.process_multimodal(&input))
                .await
                .map_err(|e| {
                    error!("Processing failed: {}", e);
                    e
                })?;

            let memo = store.add(Memo::new(result)).clone();
            store.save()?;
            info!("Saved memo {}", memo.result.id);
            print_memo(&memo);
        }
        Command::List => {
            let memos = store.list();
            if memos.is_empty() {
                print_notice("No memos yet.");
            }
            for memo in memos {
                print_memo_line(memo);
            }
        }
        Command::Search { query } => {
            let hits = with_spinner("Searching...", client.search(&query, store.memos())).await;
            if hits.is_empty() {
                print_notice(&format!("No memos match \"{}\".", query));
            }
            for memo in hits {
                print_memo_line(memo);
            }
        }
        Command::Transcribe {
            audio,
            language,
            prompt,
        } => {
            let options = TranscribeOptions { language, prompt };
            let result =
                with_spinner("Transcribing...", client.transcribe(&audio, options)).await?;
            print_transcription(&result);
        }
        Command::Edit { id, content } => {
            store.update_content(&id, &content)?;
            store.save()?;
            print_success(&format!("Updated {}", id));
        }
        Command::Delete { id } => {
            store.delete(&id)?;
            store.save()?;
            print_success(&format!("Deleted {}", id));
        }
        Command::Export { id, dir } => {
            let memo = store
                .get(&id)
                .with_context(|| format!("Memo not found: {}", id))?;
            export_memo(memo, &dir)?;
        }
    }

    Ok(())
}

fn export_memo(memo: &Memo, dir: &Path) -> Result<()> {
    let Some(export) = export_text(memo) else {
        print_notice("Nothing to export: the memo has no text or transcript.");
        return Ok(());
    };

    fs::create_dir_all(dir)?;
    let path = dir.join(&export.file_name);
    fs::write(&path, export.content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    print_success(&format!("Exported {} memo to {}", export.kind, path.display()));
    Ok(())
}
