use thiserror::Error;

/// Gemini API and memo-processing errors
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Request Error: {0}")]
    RequestError(String),

    #[error("Response Error: {0}")]
    ResponseError(String),

    #[error("Parsing Error: {0}")]
    ParsingError(String),

    #[error("HTTP Error: {status_code} - {message}")]
    HttpError { status_code: u16, message: String },

    /// An attachment was rejected before anything was sent to the model
    #[error("File \"{name}\" is too large ({size} bytes); files must be {limit} bytes or smaller")]
    AttachmentTooLarge { name: String, size: u64, limit: u64 },

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
}

impl GeminiError {
    /// True for errors caused by the caller's input rather than by the model or transport
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, GeminiError::AttachmentTooLarge { .. })
    }
}

/// Result type for Gemini operations
pub type GeminiResult<T> = Result<T, GeminiError>;
