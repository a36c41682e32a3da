use crate::auth::{bearer_token, IdentityVerifier};
use crate::config::ProxyConfig;
use crate::error::ApiError;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use inukadas_core::{
    process_multimodal, rank_candidates, transcribe_audio, ContentGenerator, MultimodalRequest,
    SearchRequest, TranscribeRequest,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    config: Arc<ProxyConfig>,
    generator: Option<Arc<dyn ContentGenerator>>,
    verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    /// `generator` is `None` when no Gemini API key is configured; requests
    /// then fail with a configuration error instead of the server refusing to start.
    pub fn new(
        config: ProxyConfig,
        generator: Option<Arc<dyn ContentGenerator>>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            generator,
            verifier,
        }
    }
}

/// Request envelope: `{ action, data }`
#[derive(Deserialize, Debug)]
pub struct ProxyRequest {
    pub action: String,
    #[serde(default)]
    pub data: Value,
}

/// Success envelope: `{ success: true, result }`
#[derive(Serialize, Debug)]
pub struct ProxyResponse {
    pub success: bool,
    pub result: Value,
}

/// Build the router with CORS, tracing and the body limit applied
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let body_limit = state.config.max_body_bytes;
    let route_path = state.config.route_path.clone();

    Router::new()
        .route("/health", get(health))
        .route(
            &route_path,
            // OPTIONS preflight is answered by the CORS layer
            post(handle_proxy).fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server and serve until ctrl-c
pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.http_addr;
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server failed: {}", e))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Health check handler
async fn health() -> impl IntoResponse {
    "ok"
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Handler for the proxy endpoint: authenticate, then dispatch the action
async fn handle_proxy(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ProxyResponse>, ApiError> {
    let token = bearer_token(&headers).ok_or(ApiError::MissingCredentials)?;
    let identity = state.verifier.verify(token).await.map_err(|e| {
        warn!(error = %e, "Rejected identity token");
        ApiError::InvalidCredentials
    })?;
    info!(uid = %identity.uid, "Authenticated user");

    let generator = state.generator.as_deref().ok_or_else(|| {
        warn!("GEMINI_API_KEY is not configured");
        ApiError::MissingApiKey
    })?;

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::InvalidBody(rejection.body_text())
        }
    })?;
    let request: ProxyRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;

    let result = dispatch(&state.config, generator, request).await?;
    Ok(Json(ProxyResponse {
        success: true,
        result,
    }))
}

/// Runs one action against the model and serializes its result
pub async fn dispatch(
    config: &ProxyConfig,
    generator: &dyn ContentGenerator,
    request: ProxyRequest,
) -> Result<Value, ApiError> {
    info!(action = %request.action, "Dispatching action");

    match request.action.as_str() {
        "processMultimodal" => {
            let data: MultimodalRequest = parse_data(request.data)?;
            let memo = process_multimodal(generator, &data, config.max_attachment_bytes).await?;
            to_value(&memo)
        }
        "search" => {
            let data: SearchRequest = parse_data(request.data)?;
            let ranked = rank_candidates(generator, &data.query, &data.existing_content).await;
            to_value(&ranked)
        }
        "transcribe" => {
            let data: TranscribeRequest = parse_data(request.data)?;
            let transcript = transcribe_audio(generator, &data).await?;
            to_value(&transcript)
        }
        _ => Err(ApiError::UnknownAction(request.action)),
    }
}

fn parse_data<T: DeserializeOwned>(data: Value) -> Result<T, ApiError> {
    serde_json::from_value(data).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}
