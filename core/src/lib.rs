// Core memo-assistant functionality:
// - API client for Gemini
// - Request/response data structures
// - Memo records, extraction and normalization of model output
// - Search ranking and transcription
// - Configuration and shared error types

// Export client module - API client for Gemini
pub mod client;
pub use client::*;

// Export types module - Gemini request/response data structures
pub mod types;
pub use types::*;

// Export config module - Gemini client configuration
pub mod config;
pub use config::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;

// Memo records exchanged with callers
pub mod memo;
pub use memo::*;

// Model-output handling and the three proxy operations
pub mod extract;
pub mod normalize;
pub mod prompt;
pub mod search;
pub mod transcribe;

#[cfg(test)]
mod testing;

pub use extract::{extract_json, ModelOutput};
pub use normalize::process_multimodal;
pub use search::{fallback_search, rank_candidates, resolve_ranked};
pub use transcribe::transcribe_audio;
