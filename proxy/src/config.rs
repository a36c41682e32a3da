use anyhow::{anyhow, Result};
use inukadas_core::config::{get_default_config_file, load_toml_or_default, GeminiConfig};
use inukadas_core::MAX_ATTACHMENT_BYTES;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

pub const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Configuration for the proxy daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Address the HTTP server binds to
    pub http_addr: SocketAddr,
    /// Path of the single proxy endpoint
    pub route_path: String,
    /// Largest accepted request body (base64 attachments included)
    pub max_body_bytes: usize,
    /// Largest accepted single attachment, as declared by the caller
    pub max_attachment_bytes: u64,
    pub gemini: GeminiConfig,
    pub auth: AuthConfig,
}

/// Identity token verification settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// Firebase project the tokens must be issued for
    pub project_id: Option<String>,
    pub jwks_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            jwks_url: GOOGLE_JWKS_URL.to_string(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            route_path: "/api/gemini".to_string(),
            max_body_bytes: 64 * 1024 * 1024,
            max_attachment_bytes: MAX_ATTACHMENT_BYTES,
            gemini: GeminiConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl ProxyConfig {
    /// Loads configuration from a file if it exists, otherwise returns the default config
    pub fn load_from_file(path: &Path) -> Result<Self> {
        load_toml_or_default(path).map_err(|e| anyhow!("{}: {}", path.display(), e))
    }

    /// Loads `~/.config/inukadas/proxy.toml`
    pub fn load_from_default() -> Result<Self> {
        let path = get_default_config_file("inukadas", "proxy.toml")?;
        Self::load_from_file(&path)
    }

    /// Applies overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`; empty values are ignored
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(api_key) = get("GEMINI_API_KEY") {
            self.gemini.api_key = Some(api_key);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.gemini.model_name = Some(model);
        }
        if let Some(project_id) = get("FIREBASE_PROJECT_ID") {
            self.auth.project_id = Some(project_id);
        }
        if let Some(addr) = get("INUKADAS_ADDR") {
            self.http_addr = addr
                .parse()
                .map_err(|e| anyhow!("Invalid INUKADAS_ADDR '{}': {}", addr, e))?;
        }

        Ok(())
    }
}
