//! ProxyClient against a mock proxy endpoint.

use chrono::{TimeZone, Utc};
use inukadas_cli::{CliConfig, ClientError, Memo, MemoInput, ProxyClient};
use inukadas_core::{Category, MemoProcessingResult, TranscribeOptions};
use serde_json::json;
use std::fs;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, limit: u64) -> ProxyClient {
    ProxyClient::new(&CliConfig {
        endpoint: format!("{}/api/gemini", server.uri()),
        id_token: Some("good-token".to_string()),
        max_attachment_bytes: limit,
        ..CliConfig::default()
    })
    .unwrap()
}

fn stored(id: &str, summary: &str, tags: &[&str]) -> Memo {
    Memo::new(MemoProcessingResult {
        id: id.to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        original_text: String::new(),
        processed_text: String::new(),
        files: vec![],
        audio_transcript: None,
        summary: Some(summary.to_string()),
        key_points: vec![],
        tags: tags.iter().map(|t| t.to_string()).collect(),
        category: Category::Other,
    })
}

#[tokio::test]
async fn test_process_multimodal_sends_encoded_files() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let note = dir.path().join("agenda.txt");
    fs::write(&note, "hello").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/gemini"))
        .and(header("authorization", "Bearer good-token"))
        .and(body_partial_json(json!({
            "action": "processMultimodal",
            "data": {
                "text": "weekly sync",
                "files": [{"name": "agenda.txt", "type": "text/plain", "data": "aGVsbG8=", "size": 5}]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": {
                "id": "content_1",
                "timestamp": "2024-05-01T08:00:00Z",
                "originalText": "weekly sync",
                "processedText": "Weekly sync notes",
                "files": [{"name": "agenda.txt", "type": "text/plain", "size": 5}],
                "summary": "Weekly sync",
                "keyPoints": ["agenda"],
                "tags": ["sync"],
                "category": "meeting"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let input = MemoInput {
        text: "weekly sync".to_string(),
        files: vec![note],
        audio: None,
    };
    let result = client_for(&server, 1024)
        .process_multimodal(&input)
        .await
        .unwrap();

    assert_eq!(result.id, "content_1");
    assert_eq!(result.category, Category::Meeting);
    assert_eq!(result.files[0].name, "agenda.txt");
}

#[tokio::test]
async fn test_oversized_file_is_rejected_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let small = dir.path().join("small.txt");
    let big = dir.path().join("scan.pdf");
    fs::write(&small, "ok").unwrap();
    fs::write(&big, vec![0u8; 64]).unwrap();

    let input = MemoInput {
        text: String::new(),
        files: vec![small, big],
        audio: None,
    };
    let err = client_for(&server, 32)
        .process_multimodal(&input)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::FileTooLarge { ref name, .. } if name == "scan.pdf"));
    assert!(err.to_string().contains("scan.pdf"));
}

#[tokio::test]
async fn test_error_envelope_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "server error",
            "message": "quota exhausted"
        })))
        .mount(&server)
        .await;

    let input = MemoInput {
        text: "hi".to_string(),
        ..MemoInput::default()
    };
    let err = client_for(&server, 1024)
        .process_multimodal(&input)
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "server error: quota exhausted");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_search_keeps_ranked_order_and_drops_unknown_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"action": "search", "data": {"query": "budget"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [
                {"id": "m2", "relevanceScore": 0.9, "reason": "mentions budget"},
                {"id": "ghost", "relevanceScore": 0.8},
                {"id": "m1", "relevanceScore": 0.4}
            ]
        })))
        .mount(&server)
        .await;

    let memos = vec![
        stored("m1", "Team lunch", &["food"]),
        stored("m2", "Q3 budget review", &["finance"]),
        stored("m3", "Dentist", &[]),
    ];
    let hits = client_for(&server, 1024).search("budget", &memos).await;

    let ids: Vec<&str> = hits.iter().map(|m| m.result.id.as_str()).collect();
    assert_eq!(ids, vec!["m2", "m1"]);
}

#[tokio::test]
async fn test_search_falls_back_to_local_matching() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "server error"})))
        .mount(&server)
        .await;

    let memos = vec![
        stored("m1", "Team lunch", &["food"]),
        stored("m2", "Q3 Budget review", &["finance"]),
    ];
    let hits = client_for(&server, 1024).search("budget", &memos).await;

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].result.id, "m2");
}

#[tokio::test]
async fn test_transcribe() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "action": "transcribe",
            "data": {"options": {"language": "en"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": {"text": "hello there", "language": "en", "confidence": 0.95}
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.webm");
    fs::write(&clip, [0x1A, 0x45, 0xDF, 0xA3, 0x00]).unwrap();

    let options = TranscribeOptions {
        language: Some("en".to_string()),
        prompt: None,
    };
    let result = client_for(&server, 1024)
        .transcribe(&clip, options)
        .await
        .unwrap();

    assert_eq!(result.text, "hello there");
    assert_eq!(result.language, "en");
}
