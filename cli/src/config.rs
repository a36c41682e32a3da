use crate::error::ClientError;
use inukadas_core::config::{get_default_config_file, load_toml_or_default};
use inukadas_core::MAX_ATTACHMENT_BYTES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the memo CLI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Full URL of the proxy endpoint
    pub endpoint: String,
    /// Identity token sent as the bearer credential
    pub id_token: Option<String>,
    /// Location of the local memo timeline
    pub store_path: Option<PathBuf>,
    pub max_attachment_bytes: u64,
    pub timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/gemini".to_string(),
            id_token: None,
            store_path: None,
            max_attachment_bytes: MAX_ATTACHMENT_BYTES,
            timeout_secs: 180,
        }
    }
}

impl CliConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ClientError> {
        load_toml_or_default(path).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Loads `~/.config/inukadas/cli.toml`
    pub fn load_from_default() -> Result<Self, ClientError> {
        let path = get_default_config_file("inukadas", "cli.toml")
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Self::load_from_file(&path)
    }

    /// Applies overrides from `lookup`; empty values are ignored
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(endpoint) = get("INUKADAS_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(token) = get("INUKADAS_ID_TOKEN") {
            self.id_token = Some(token);
        }
        if let Some(path) = get("INUKADAS_STORE") {
            self.store_path = Some(PathBuf::from(path));
        }
    }

    /// Where the memo timeline lives; defaults to the user's data directory
    pub fn resolved_store_path(&self) -> PathBuf {
        if let Some(path) = &self.store_path {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("inukadas")
            .join("memos.json")
    }
}
