//! Tools Router - HTTP endpoints for tool inspection and direct execution
//!
//! Mount this at `/api/tools`:
//! ```ignore
//! let state = ToolsState::new(registry);
//! let app = Router::new().nest("/api/tools", create_router(state));
//! ```

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ToolError;
use crate::registry::ToolRegistry;

/// Tools service state
#[derive(Clone)]
pub struct ToolsState {
    pub registry: Arc<ToolRegistry>,
}

impl ToolsState {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

/// Create the tools router
pub fn create_router(state: ToolsState) -> Router {
    Router::new()
        .route("/", get(list_tools_handler))
        .route("/health", get(health_handler))
        .route("/:name", get(get_tool_handler))
        .route("/:name/execute", post(execute_tool_handler))
        .with_state(state)
}

/// HTTP status for a tool failure
pub fn status_for(err: &ToolError) -> StatusCode {
    match err {
        ToolError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        ToolError::NotFound(_) | ToolError::UnknownTool(_) => StatusCode::NOT_FOUND,
        ToolError::NotSupported(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ToolError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ToolError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// === Handlers ===

async fn health_handler(State(state): State<ToolsState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "tools",
        "stats": state.registry.stats(),
    }))
}

async fn list_tools_handler(State(state): State<ToolsState>) -> impl IntoResponse {
    let tools = state.registry.list();
    Json(json!({
        "count": tools.len(),
        "tools": tools,
    }))
}

async fn get_tool_handler(
    State(state): State<ToolsState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.registry.info(&name) {
        Some(info) => (StatusCode::OK, Json(json!(info))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Tool not found", "kind": "unknown_tool" })),
        ),
    }
}

async fn execute_tool_handler(
    State(state): State<ToolsState>,
    Path(name): Path<String>,
    params: Option<Json<Value>>,
) -> impl IntoResponse {
    let params = params.map(|Json(v)| v).unwrap_or(Value::Null);
    match state.registry.execute(&name, &params).await {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "result": result,
            })),
        ),
        Err(e) => (
            status_for(&e),
            Json(json!({
                "success": false,
                "kind": e.kind(),
                "error": e.to_string(),
            })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArgSchema, ArgType};
    use crate::tool::SimpleTool;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(SimpleTool::new(
                "echo",
                "Echo",
                ArgSchema::new().required("msg", ArgType::String, "Message"),
                |args| Ok(args.get_str("msg")?.to_string()),
            )))
            .unwrap();
        create_router(ToolsState::new(Arc::new(registry)))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_execute_ok() {
        let response = app()
            .oneshot(post_json("/echo/execute", r#"{"msg":"hi"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_execute_invalid_arguments() {
        let response = app().oneshot(post_json("/echo/execute", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let response = app()
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
