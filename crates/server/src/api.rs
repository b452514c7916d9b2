//! HTTP API for infrastructure panels, health checks and Prometheus metrics

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use usage_lib::{is_valid_project_ref, InfrastructurePanelBuilder, PanelContext};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub panels: InfrastructurePanelBuilder,
}

impl AppState {
    pub fn new(panels: InfrastructurePanelBuilder) -> Self {
        Self { panels }
    }
}

/// Liveness check
async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Infrastructure panel of a project - 404 when no panel is available
async fn infra_usage(
    State(state): State<Arc<AppState>>,
    Path(project_ref): Path<String>,
) -> Response {
    if !is_valid_project_ref(&project_ref) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid project ref" })),
        )
            .into_response();
    }

    match state.panels.build(&project_ref, &PanelContext::now()).await {
        Some(panel) => (StatusCode::OK, Json(panel)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "infrastructure usage is not available" })),
        )
            .into_response(),
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/api/v1/projects/:project_ref/usage/infra", get(infra_usage))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
