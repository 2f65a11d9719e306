//! HTTP server assembly

use anyhow::{Context, Result};
use axum::{routing::get, Json, Router};
use netops_chat::ChatState;
use netops_tools::ToolsState;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

/// Upper bound for one request, dispatch cycle included
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Router with every API mounted and the middleware stack applied
pub fn build_router(tools: ToolsState, chat: ChatState, cors: bool) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/tools", netops_tools::create_router(tools))
        .nest("/api", netops_chat::create_router(chat))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    if cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

pub async fn serve(router: Router, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {}", bind))?;
    info!("HTTP server listening on http://{}", bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "netops-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
