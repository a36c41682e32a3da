use crate::errors::{GeminiError, GeminiResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration struct for Gemini API
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    /// API root, without the `/models/...` suffix
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub temperature: Option<f32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: Some(DEFAULT_MODEL.to_string()),
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            timeout_secs: Some(120),
            temperature: None,
        }
    }
}

impl GeminiConfig {
    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            api_key: other.api_key.clone().or_else(|| self.api_key.clone()),
            model_name: other.model_name.clone().or_else(|| self.model_name.clone()),
            base_url: other.base_url.clone().or_else(|| self.base_url.clone()),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            temperature: other.temperature.or(self.temperature),
        }
    }

    /// True when a non-empty API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

/// Loads a TOML configuration file if it exists, otherwise returns the default value
pub fn load_toml_or_default<T>(path: &Path) -> GeminiResult<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| GeminiError::ConfigError(format!("Failed to read config file: {}", e)))?;

    toml::from_str(&content)
        .map_err(|e| GeminiError::ConfigError(format!("Failed to parse config file: {}", e)))
}

/// Helper function to get default config directory
pub fn get_default_config_dir(app_name: &str) -> GeminiResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        GeminiError::ConfigError("Could not determine home directory".to_string())
    })?;

    Ok(home_dir.join(".config").join(app_name))
}

/// Helper function to get a config file path inside the default config directory
pub fn get_default_config_file(app_name: &str, file_name: &str) -> GeminiResult<PathBuf> {
    let config_dir = get_default_config_dir(app_name)?;
    Ok(config_dir.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_other() {
        let base = GeminiConfig {
            api_key: Some("file-key".to_string()),
            ..GeminiConfig::default()
        };
        let overrides = GeminiConfig {
            api_key: Some("env-key".to_string()),
            model_name: None,
            base_url: None,
            timeout_secs: Some(5),
            temperature: None,
        };

        let merged = base.merge(&overrides);
        assert_eq!(merged.api_key.as_deref(), Some("env-key"));
        assert_eq!(merged.model_name.as_deref(), Some(DEFAULT_MODEL));
        assert_eq!(merged.timeout_secs, Some(5));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = GeminiConfig {
            api_key: Some("  ".to_string()),
            ..GeminiConfig::default()
        };
        assert!(!config.has_api_key());
        assert!(!GeminiConfig::default().has_api_key());
    }

    #[test]
    fn test_missing_file_yields_default() {
        let config: GeminiConfig =
            load_toml_or_default(Path::new("/definitely/not/here/config.toml")).unwrap();
        assert_eq!(config, GeminiConfig::default());
    }
}
