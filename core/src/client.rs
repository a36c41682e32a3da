use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::errors::{GeminiError, GeminiResult};
use crate::types::*;

/// Anything that can turn an ordered list of content parts into model text.
///
/// The proxy holds one of these for the lifetime of the process; tests swap in
/// recording fakes.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate text from the given parts (one model call)
    async fn generate(&self, parts: Vec<Part>) -> GeminiResult<String>;

    /// Get the model name being used
    fn model_name(&self) -> String;
}

/// Client for interacting with the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
    temperature: Option<f32>,
}

impl GeminiClient {
    /// Create a new Gemini API client
    pub fn new(config: &GeminiConfig) -> GeminiResult<Self> {
        if !config.has_api_key() {
            return Err(GeminiError::ConfigError(
                "API key is required to initialize the Gemini client".to_string(),
            ));
        }
        let api_key = config.api_key.clone().unwrap_or_default();

        let mut builder = Client::builder().connect_timeout(Duration::from_secs(10));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| {
            GeminiError::ConfigError(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            api_key,
            model_name: config
                .model_name
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            temperature: config.temperature,
        })
    }

    /// Get the generateContent URL for the configured model
    fn get_generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model_name)
    }

    /// Generate content using the Gemini API
    pub async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse> {
        let url = self.get_generate_url();

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| GeminiError::RequestError(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.map_err(|e| {
                GeminiError::ResponseError(format!("Failed to read error response: {}", e))
            })?;

            let message = match serde_json::from_str::<GeminiErrorResponse>(&error_body) {
                Ok(parsed) => format!(
                    "API request failed: {} ({})",
                    parsed.error.message, parsed.error.status
                ),
                Err(_) => format!("API request failed: {}", error_body),
            };
            warn!(status = status.as_u16(), "Gemini API returned an error");

            return Err(GeminiError::HttpError {
                status_code: status.as_u16(),
                message,
            });
        }

        let response_body = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| GeminiError::ParsingError(format!("Failed to parse response: {}", e)))?;

        Ok(response_body)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, parts: Vec<Part>) -> GeminiResult<String> {
        debug!(
            model = %self.model_name,
            parts = parts.len(),
            "Generating content with Gemini"
        );

        let mut request = GenerateContentRequest::from_parts(parts);
        if self.temperature.is_some() {
            request.generation_config = Some(GenerationConfig {
                temperature: self.temperature,
                ..GenerationConfig::default()
            });
        }

        let response = self.generate_content(request).await?;
        response.text().ok_or_else(|| {
            GeminiError::ResponseError("No text in model response".to_string())
        })
    }

    fn model_name(&self) -> String {
        self.model_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        let err = GeminiClient::new(&GeminiConfig::default()).unwrap_err();
        assert!(matches!(err, GeminiError::ConfigError(_)));
    }

    #[test]
    fn test_generate_url_uses_model_and_trimmed_base() {
        let config = GeminiConfig {
            api_key: Some("k".to_string()),
            model_name: Some("gemini-test".to_string()),
            base_url: Some("http://localhost:9999/v1beta/".to_string()),
            ..GeminiConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.get_generate_url(),
            "http://localhost:9999/v1beta/models/gemini-test:generateContent"
        );
        assert_eq!(client.model_name(), "gemini-test");
    }
}
