//! Chat Router - HTTP endpoints for chat, sessions, re-indexing and log analysis
//!
//! Mount this at `/api`:
//! ```ignore
//! let app = Router::new().nest("/api", create_router(ChatState::new(assistant, analyzer)));
//! ```

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use netops_core::{Error, ErrorKind};
use netops_llm::ModelId;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::assistant::Assistant;
use crate::log_analysis::{LogAnalyzer, LogBook, LogEvent, SortOrder};

/// Chat service state
#[derive(Clone)]
pub struct ChatState {
    pub assistant: Arc<Assistant>,
    pub analyzer: Arc<LogAnalyzer>,
}

impl ChatState {
    pub fn new(assistant: Arc<Assistant>, analyzer: Arc<LogAnalyzer>) -> Self {
        Self {
            assistant,
            analyzer,
        }
    }
}

/// Create the chat router
pub fn create_router(state: ChatState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/chat/health", get(health_handler))
        .route("/chat/sessions", get(list_sessions_handler))
        .route(
            "/chat/sessions/:id",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/chat/sessions/:id/reset", post(reset_session_handler))
        .route("/knowledge/index", post(reindex_handler))
        .route("/models", get(models_handler))
        .route("/logs/analyze", post(analyze_logs_handler))
        .with_state(state)
}

/// HTTP status for a failed request
pub fn status_for(err: &Error) -> StatusCode {
    match err.kind() {
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound | ErrorKind::UnknownTool => StatusCode::NOT_FOUND,
        ErrorKind::NotSupported => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::UpstreamFailure => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &Error) -> (StatusCode, Json<Value>) {
    (
        status_for(err),
        Json(json!({
            "success": false,
            "kind": err.kind(),
            "error": err.to_string(),
        })),
    )
}

fn session_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Session not found", "kind": "not_found" })),
    )
}

// === Handlers ===

#[derive(Deserialize)]
struct ChatBody {
    message: String,
    session_id: Option<String>,
}

async fn chat_handler(
    State(state): State<ChatState>,
    Json(body): Json<ChatBody>,
) -> impl IntoResponse {
    match state
        .assistant
        .ask(body.session_id.as_deref(), &body.message)
        .await
    {
        Ok(reply) => (StatusCode::OK, Json(json!(reply))),
        Err(e) => {
            warn!(error = %e, "Chat request failed");
            error_response(&e)
        }
    }
}

async fn health_handler(State(state): State<ChatState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "chat",
        "sessions": state.assistant.sessions().count().await,
        "knowledge_loaded": state.assistant.knowledge().is_loaded().await,
    }))
}

async fn list_sessions_handler(State(state): State<ChatState>) -> impl IntoResponse {
    let sessions = state.assistant.sessions().list_sessions().await;
    Json(json!({
        "count": sessions.len(),
        "sessions": sessions,
    }))
}

async fn get_session_handler(
    State(state): State<ChatState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.assistant.sessions().get(&id).await {
        Some(session) => {
            let session = session.lock().await;
            (
                StatusCode::OK,
                Json(json!({
                    "info": session.info(),
                    "turns": session.turns(),
                })),
            )
        }
        None => session_not_found(),
    }
}

async fn delete_session_handler(
    State(state): State<ChatState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if state.assistant.sessions().delete(&id).await {
        (StatusCode::OK, Json(json!({ "deleted": true })))
    } else {
        session_not_found()
    }
}

async fn reset_session_handler(
    State(state): State<ChatState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if state.assistant.reset(&id).await {
        (StatusCode::OK, Json(json!({ "reset": true })))
    } else {
        session_not_found()
    }
}

async fn reindex_handler(State(state): State<ChatState>) -> impl IntoResponse {
    match state.assistant.reindex().await {
        Ok(report) => (StatusCode::OK, Json(json!(report))),
        Err(e) => error_response(&e),
    }
}

async fn models_handler() -> impl IntoResponse {
    Json(json!({
        "default": ModelId::default(),
        "models": ModelId::ALL,
    }))
}

#[derive(Deserialize)]
struct AnalyzeBody {
    events: Vec<LogEvent>,
    #[serde(default)]
    assess: bool,
    #[serde(default)]
    sort: SortOrder,
    /// 1-based position, after sorting, of the event to explain
    explain: Option<usize>,
}

async fn analyze_logs_handler(
    State(state): State<ChatState>,
    Json(body): Json<AnalyzeBody>,
) -> impl IntoResponse {
    let mut book = LogBook::new(body.events);
    if body.assess {
        state.analyzer.assess_severity(&mut book).await;
    }
    if let Err(e) = book.sort(body.sort) {
        return error_response(&e);
    }

    let explanation = match body.explain {
        None => None,
        Some(position) => {
            let event = match position.checked_sub(1).and_then(|i| book.events.get(i)) {
                Some(event) => event,
                None => {
                    return error_response(&Error::invalid_argument(format!(
                        "no event at position {}",
                        position
                    )))
                }
            };
            match state.analyzer.explain(event).await {
                Ok(text) => Some(text),
                Err(e) => return error_response(&e),
            }
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "assessed": book.assessed,
            "events": book.events,
            "explanation": explanation,
        })),
    )
}
