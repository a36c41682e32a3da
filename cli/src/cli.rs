use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Voice and text memo assistant
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Proxy endpoint URL
    #[arg(long, env = "INUKADAS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Identity token used as the bearer credential
    #[arg(long, env = "INUKADAS_ID_TOKEN", hide_env_values = true)]
    pub id_token: Option<String>,

    /// Path of the local memo timeline
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Structure text, files and a recording into a new memo
    Add {
        /// Memo text
        #[arg(short, long, default_value = "")]
        text: String,

        /// Files to attach (images, PDFs, documents)
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,

        /// Recorded audio to attach
        #[arg(short, long)]
        audio: Option<PathBuf>,
    },

    /// List memos, newest first
    List,

    /// Search memos by meaning
    Search { query: String },

    /// Transcribe an audio file without saving a memo
    Transcribe {
        audio: PathBuf,

        /// Language code of the recording (e.g. ja, en)
        #[arg(short, long)]
        language: Option<String>,

        /// Extra instruction for the transcriber
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Replace the text of a memo
    Edit { id: String, content: String },

    /// Delete a memo
    Delete { id: String },

    /// Write a memo to a text file
    Export {
        id: String,

        /// Target directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}
