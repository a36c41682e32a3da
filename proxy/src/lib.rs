// Authenticated HTTP proxy between the memo client and Gemini.

pub mod auth;
pub mod config;
pub mod error;
pub mod http_server;

pub use auth::{FirebaseVerifier, IdentityVerifier, VerifiedIdentity};
pub use config::ProxyConfig;
pub use error::ApiError;
pub use http_server::{router, run_server, AppState};
