//! Health check and service index handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub timestamp: String,
    pub storage: String,
}

/// Service index
///
/// Lists the available endpoints so the root URL is self-describing.
#[utoipa::path(
    get,
    path = "/",
    tag = "meta",
    responses((status = 200, description = "Service information"))
)]
pub async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "Fotogate Upload API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "docs": "/docs",
            "upload": {
                "portfolio": "POST /upload/portfolio",
                "portfolio_batch": "POST /upload/portfolio/batch",
                "event": "POST /upload/event/{event_id}",
                "event_batch": "POST /upload/event/{event_id}/batch",
                "slideshow": "POST /upload/slideshow",
            },
        },
    }))
}

/// Health check
///
/// Probes the storage backend with a bounded timeout. Returns 503 when the
/// backend is unreachable so load balancers can rotate the instance out.
#[utoipa::path(
    get,
    path = "/health",
    tag = "meta",
    responses(
        (status = 200, description = "Service healthy", body = HealthCheckResponse),
        (status = 503, description = "Storage backend unavailable", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let probe = state.storage.exists(".healthcheck");
    let storage = match tokio::time::timeout(Duration::from_secs(5), probe).await {
        Ok(Ok(_)) => "ok".to_string(),
        Ok(Err(e)) => format!("error: {}", e),
        Err(_) => "timeout".to_string(),
    };

    let healthy = storage == "ok";
    let response = HealthCheckResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        storage,
    };

    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response))
}
