//! HTTP API server.
//!
//! Provides REST endpoints for caption transcripts, transcript-grounded chat
//! and the audio transcription hand-off.

use crate::chat::ChatRequest;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::{ErrorCategory, TubescribeError};
use crate::orchestrator::Orchestrator;
use crate::transcript::TranscriptExport;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Shared application state.
pub struct AppState {
    orchestrator: Orchestrator,
    /// Cancelled on shutdown; every request works under a child of it.
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, shutdown: CancellationToken) -> Self {
        Self {
            orchestrator,
            shutdown,
        }
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/transcribe", post(transcribe))
        .route("/api/chat", post(chat))
        .route("/api/transcribe/whisper", post(transcribe_whisper))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let orchestrator = Orchestrator::new(settings)?;
    let shutdown = CancellationToken::new();
    let state = Arc::new(AppState::new(orchestrator, shutdown.clone()));
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Tubescribe API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Transcript", "POST /api/transcribe");
    Output::kv("Chat", "POST /api/chat");
    Output::kv("Audio transcription", "POST /api/transcribe/whisper");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        return;
    }
    info!("Shutting down, cancelling in-flight requests");
    shutdown.cancel();
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct TranscribeBody {
    url: String,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Deserialize)]
struct ChatBody {
    message: String,
    #[serde(default)]
    transcript: Option<String>,
}

#[derive(Serialize)]
struct ChatReply {
    response: String,
}

#[derive(Deserialize)]
struct WhisperBody {
    url: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

/// An error on its way to the client.
pub struct ApiError(TubescribeError);

impl From<TubescribeError> for ApiError {
    fn from(e: TubescribeError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(TubescribeError::Validation(rejection.body_text()))
    }
}

/// HTTP status for an error category.
pub fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::ClientInput => StatusCode::BAD_REQUEST,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCategory::Upstream => StatusCode::BAD_GATEWAY,
        ErrorCategory::Timeout => StatusCode::GATEWAY_TIMEOUT,
        // Non-standard "client closed request"
        ErrorCategory::Cancelled => {
            StatusCode::from_u16(499).unwrap_or(StatusCode::SERVICE_UNAVAILABLE)
        }
        ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.category());
        if status.is_server_error() {
            error!(status = %status, "{}", self.0);
        } else {
            warn!(status = %status, "{}", self.0);
        }

        let body = ErrorResponse {
            error: self.0.summary().to_string(),
            details: self.0.details(),
            hint: self.0.hint().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}

/// Token for one request: cancelled on shutdown or when the handler is dropped.
fn request_token(state: &AppState) -> CancellationToken {
    state.shutdown.child_token()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
async fn transcribe(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TranscribeBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = body?;
    let cancel = request_token(&state);
    let _guard = cancel.clone().drop_guard();

    let transcript = state
        .orchestrator
        .transcribe(&req.url, req.language.as_deref(), &cancel)
        .await?;

    Ok(Json(TranscriptExport::from(&transcript)).into_response())
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(req) = body?;
    let cancel = request_token(&state);
    let _guard = cancel.clone().drop_guard();

    let response = state
        .orchestrator
        .chat(&ChatRequest::new(req.message, req.transcript), &cancel)
        .await?;

    Ok(Json(ChatReply {
        response: response.text,
    }))
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
async fn transcribe_whisper(
    State(state): State<Arc<AppState>>,
    body: Result<Json<WhisperBody>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(req) = body?;
    let cancel = request_token(&state);
    let _guard = cancel.clone().drop_guard();

    let payload = state
        .orchestrator
        .delegate_transcription(&req.url, &cancel)
        .await?;

    Ok(Json(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::CaptionSource;
    use crate::chat::{GenerateOptions, InferenceBackend};
    use crate::transcript::TranscriptSegment;
    use async_trait::async_trait;

    struct FakeCaptions;

    #[async_trait]
    impl CaptionSource for FakeCaptions {
        async fn fetch_segments(
            &self,
            video_id: &str,
            language: Option<&str>,
            _cancel: &CancellationToken,
        ) -> crate::Result<Vec<TranscriptSegment>> {
            if video_id == "AAAAAAAAAAA" || language == Some("de") {
                return Err(TubescribeError::CaptionUnavailable("none".to_string()));
            }
            Ok(vec![
                TranscriptSegment::new("Hi there.", 0.0, 1.0),
                TranscriptSegment::new("Welcome", 1.0, 1.0),
            ])
        }
    }

    struct DownBackend;

    #[async_trait]
    impl InferenceBackend for DownBackend {
        fn name(&self) -> &str {
            "down"
        }

        async fn probe(&self, _cancel: &CancellationToken) -> crate::Result<()> {
            Err(TubescribeError::ServiceUnavailable {
                service: "Ollama".to_string(),
                detail: "connection refused".to_string(),
                hint: "run 'ollama serve'".to_string(),
            })
        }

        async fn generate(
            &self,
            _prompt: &str,
            _options: &GenerateOptions,
            _cancel: &CancellationToken,
        ) -> crate::Result<String> {
            unreachable!("generate must not run when the probe fails")
        }
    }

    /// Start the router on an ephemeral port and return its base URL.
    async fn spawn_app() -> String {
        let orchestrator = Orchestrator::with_components(
            Settings::default(),
            Arc::new(FakeCaptions),
            Arc::new(DownBackend),
        )
        .unwrap();
        let app = router(Arc::new(AppState::new(orchestrator, CancellationToken::new())));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (TubescribeError::InvalidReference("x".into()), 400),
            (TubescribeError::Validation("x".into()), 400),
            (TubescribeError::CaptionUnavailable("x".into()), 404),
            (
                TubescribeError::ServiceUnavailable {
                    service: "s".into(),
                    detail: "d".into(),
                    hint: "h".into(),
                },
                503,
            ),
            (TubescribeError::GenerationFailure("x".into()), 502),
            (TubescribeError::DelegateFailure("x".into()), 502),
            (TubescribeError::Timeout("x".into()), 504),
            (TubescribeError::Cancelled("x".into()), 499),
            (TubescribeError::Config("x".into()), 500),
        ];

        for (err, expected) in cases {
            assert_eq!(status_for(err.category()).as_u16(), expected, "{err:?}");
        }
    }

    #[tokio::test]
    async fn test_health() {
        let base = spawn_app().await;
        let body: serde_json::Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_transcribe_success_payload() {
        let base = spawn_app().await;
        let response = reqwest::Client::new()
            .post(format!("{}/api/transcribe", base))
            .json(&serde_json::json!({ "url": "https://youtu.be/dQw4w9WgXcQ" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["transcript"], "Hi there. Welcome");
        assert_eq!(body["videoId"], "dQw4w9WgXcQ");
        assert_eq!(body["segments"][1]["start"], 1.0);
    }

    #[tokio::test]
    async fn test_transcribe_errors() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let invalid = client
            .post(format!("{}/api/transcribe", base))
            .json(&serde_json::json!({ "url": "https://example.com/video" }))
            .send()
            .await
            .unwrap();
        assert_eq!(invalid.status().as_u16(), 400);
        let body: serde_json::Value = invalid.json().await.unwrap();
        assert_eq!(body["error"], "Invalid YouTube URL");

        let missing = client
            .post(format!("{}/api/transcribe", base))
            .json(&serde_json::json!({ "url": "https://youtu.be/AAAAAAAAAAA" }))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status().as_u16(), 404);

        let malformed = client
            .post(format!("{}/api/transcribe", base))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(malformed.status().as_u16(), 400);
        let body: serde_json::Value = malformed.json().await.unwrap();
        assert_eq!(body["error"], "Invalid request");
    }

    #[tokio::test]
    async fn test_chat_backend_down_is_503_with_hint() {
        let base = spawn_app().await;
        let response = reqwest::Client::new()
            .post(format!("{}/api/chat", base))
            .json(&serde_json::json!({ "message": "hello" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 503);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Service unavailable");
        assert_eq!(body["hint"], "run 'ollama serve'");
    }

    #[tokio::test]
    async fn test_whisper_rejects_blank_url() {
        let base = spawn_app().await;
        let response = reqwest::Client::new()
            .post(format!("{}/api/transcribe/whisper", base))
            .json(&serde_json::json!({ "url": "   " }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
    }
}
