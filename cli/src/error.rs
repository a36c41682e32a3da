use thiserror::Error;

/// Errors talking to the proxy
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("User is not logged in: no identity token configured")]
    NotAuthenticated,

    #[error("File \"{name}\" is too large ({size} bytes). Use files of {limit} bytes or smaller.")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    #[error("API request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors reading or changing the local memo timeline
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Memo not found: {0}")]
    NotFound(String),

    #[error("Memo content cannot be empty")]
    EmptyContent,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
