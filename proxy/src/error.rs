use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inukadas_core::GeminiError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failure envelope returned to callers
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error type for HTTP server
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("authentication required")]
    MissingCredentials,

    #[error("invalid authentication token")]
    InvalidCredentials,

    #[error("server configuration error: API key is not set")]
    MissingApiKey,

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid request body")]
    InvalidBody(String),

    #[error("invalid input")]
    InvalidInput(String),

    #[error("request body too large")]
    PayloadTooLarge(String),

    #[error("server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingCredentials | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UnknownAction(_) | Self::InvalidBody(_) | Self::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MissingApiKey | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            Self::InvalidBody(msg)
            | Self::InvalidInput(msg)
            | Self::PayloadTooLarge(msg)
            | Self::Internal(msg) => {
                Some(msg.clone())
            }
            _ => None,
        }
    }
}

impl From<GeminiError> for ApiError {
    fn from(e: GeminiError) -> Self {
        if e.is_invalid_input() {
            Self::InvalidInput(e.to_string())
        } else {
            Self::Internal(e.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, detail = ?self.detail(), "Request failed");
        }

        let body = Json(ErrorBody {
            error: self.to_string(),
            message: self.detail(),
        });
        (status, body).into_response()
    }
}
