use crate::attachments::{check_size, load_audio, load_file};
use crate::config::CliConfig;
use crate::error::ClientError;
use crate::store::Memo;
use inukadas_core::search::matches_query;
use inukadas_core::{
    resolve_ranked, MemoProcessingResult, MultimodalRequest, SearchCandidate, SearchRankResult,
    SearchRequest, TranscribeOptions, TranscribeRequest, TranscriptionResult,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// What the user wants turned into a memo
#[derive(Debug, Clone, Default)]
pub struct MemoInput {
    pub text: String,
    pub files: Vec<PathBuf>,
    pub audio: Option<PathBuf>,
}

#[derive(Deserialize)]
struct SuccessEnvelope {
    result: Value,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the authenticated proxy endpoint
pub struct ProxyClient {
    http: reqwest::Client,
    endpoint: String,
    id_token: Option<String>,
    max_attachment_bytes: u64,
}

impl ProxyClient {
    pub fn new(config: &CliConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            id_token: config.id_token.clone().filter(|t| !t.trim().is_empty()),
            max_attachment_bytes: config.max_attachment_bytes,
        })
    }

    fn token(&self) -> Result<&str, ClientError> {
        self.id_token
            .as_deref()
            .ok_or(ClientError::NotAuthenticated)
    }

    async fn call<T: DeserializeOwned>(&self, action: &str, data: Value) -> Result<T, ClientError> {
        let token = self.token()?;
        debug!("Calling proxy action {}", action);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&json!({ "action": action, "data": data }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => match envelope.message {
                    Some(detail) => format!("{}: {}", envelope.error, detail),
                    None => envelope.error,
                },
                Err(_) => body,
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: SuccessEnvelope = serde_json::from_str(&body).map_err(|e| ClientError::Api {
            status: status.as_u16(),
            message: format!("unexpected response body: {}", e),
        })?;

        serde_json::from_value(envelope.result).map_err(|e| ClientError::Api {
            status: status.as_u16(),
            message: format!("unexpected result shape: {}", e),
        })
    }

    /// Sends text, files and an optional recording for structuring
    pub async fn process_multimodal(
        &self,
        input: &MemoInput,
    ) -> Result<MemoProcessingResult, ClientError> {
        self.token()?;

        // Every size is checked before any file is read
        for path in input.files.iter().chain(input.audio.iter()) {
            check_size(path, self.max_attachment_bytes)?;
        }

        let files = input
            .files
            .iter()
            .map(|path| load_file(path, self.max_attachment_bytes))
            .collect::<Result<Vec<_>, _>>()?;
        let audio_blob = input
            .audio
            .as_deref()
            .map(|path| load_audio(path, self.max_attachment_bytes))
            .transpose()?;

        let request = MultimodalRequest {
            text: input.text.clone(),
            files,
            audio_blob,
        };
        self.call("processMultimodal", json!(request)).await
    }

    /// Asks the proxy to rank `candidates` against `query`
    pub async fn rank(
        &self,
        query: &str,
        candidates: Vec<SearchCandidate>,
    ) -> Result<Vec<SearchRankResult>, ClientError> {
        let request = SearchRequest {
            query: query.to_string(),
            existing_content: candidates,
        };
        self.call("search", json!(request)).await
    }

    /// Ranked search over `memos`, degrading to a local substring match
    pub async fn search<'a>(&self, query: &str, memos: &'a [Memo]) -> Vec<&'a Memo> {
        let candidates = memos.iter().map(SearchCandidate::from).collect();

        match self.rank(query, candidates).await {
            Ok(ranked) => resolve_ranked(&ranked, memos),
            Err(e) => {
                warn!("Search request failed, using local matching: {}", e);
                local_search(query, memos)
            }
        }
    }

    pub async fn transcribe(
        &self,
        audio: &Path,
        options: TranscribeOptions,
    ) -> Result<TranscriptionResult, ClientError> {
        self.token()?;
        let request = TranscribeRequest {
            audio_data: load_audio(audio, self.max_attachment_bytes)?,
            options,
        };
        self.call("transcribe", json!(request)).await
    }
}

/// Case-insensitive substring match over summaries and tags
pub fn local_search<'a>(query: &str, memos: &'a [Memo]) -> Vec<&'a Memo> {
    let needle = query.to_lowercase();
    memos
        .iter()
        .filter(|memo| matches_query(&needle, memo.result.summary.as_deref(), &memo.result.tags))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::memo;

    #[test]
    fn test_local_search_matches_summary_and_tags() {
        let mut tagged = memo("content_b", 2, "", None);
        tagged.result.tags = vec!["Budget".to_string()];
        let memos = vec![memo("content_a", 1, "", None), tagged];

        let hits: Vec<&str> = local_search("BUDGET", &memos)
            .iter()
            .map(|m| m.result.id.as_str())
            .collect();
        assert_eq!(hits, vec!["content_b"]);

        assert_eq!(local_search("summary of content_a", &memos).len(), 1);
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_io() {
        let client = ProxyClient::new(&CliConfig {
            id_token: Some("  ".to_string()),
            ..CliConfig::default()
        })
        .unwrap();

        let input = MemoInput {
            text: "hello".to_string(),
            files: vec![PathBuf::from("/does/not/exist.png")],
            audio: None,
        };
        let err = client.process_multimodal(&input).await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }
}
