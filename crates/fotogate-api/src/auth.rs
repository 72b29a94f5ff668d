//! API key authentication middleware.
//!
//! Accepts either an `X-API-Key` header or an `Authorization: Bearer` token
//! carrying the configured upload key. Comparison is constant-time.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use fotogate_core::AppError;

use crate::error::HttpAppError;

#[derive(Clone)]
pub struct AuthState {
    pub api_key: String,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn presented_key(request: &Request) -> Option<&str> {
    if let Some(key) = request.headers().get("x-api-key").and_then(|h| h.to_str().ok()) {
        return Some(key);
    }
    request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    match presented_key(&request) {
        Some(key) if secure_compare(key, &auth_state.api_key) => next.run(request).await,
        Some(_) => {
            tracing::debug!(path = %request.uri().path(), "Rejected request with invalid API key");
            HttpAppError(AppError::Unauthorized("Invalid API key".to_string())).into_response()
        }
        None => {
            tracing::debug!(path = %request.uri().path(), "Rejected request with missing API key");
            HttpAppError(AppError::Unauthorized("Missing API key".to_string())).into_response()
        }
    }
}
