//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use fotogate_core::Config;

use crate::api_doc::ApiDoc;
use crate::auth::{auth_middleware, AuthState};
use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(&state.config)?;
    let auth_state = Arc::new(AuthState {
        api_key: state.config.api_key.clone(),
    });

    // A batch request can legitimately carry many full-size files
    let body_limit = state
        .config
        .max_file_size_bytes
        .saturating_mul(state.config.max_files_per_request);

    let public_routes = Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health_check));

    let protected_routes = Router::new()
        .route("/upload/portfolio", post(handlers::upload::upload_portfolio))
        .route(
            "/upload/portfolio/batch",
            post(handlers::upload::upload_portfolio_batch),
        )
        .route("/upload/event/{event_id}", post(handlers::upload::upload_event))
        .route(
            "/upload/event/{event_id}/batch",
            post(handlers::upload::upload_event_batch),
        )
        .route("/upload/slideshow", post(handlers::upload::upload_slideshow))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    // Server-level concurrency limit to protect against resource exhaustion
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);

    let openapi = ApiDoc::openapi();
    let app = public_routes
        .merge(protected_routes)
        .with_state(state)
        .route(
            "/api-docs/openapi.json",
            get(move || {
                let spec = openapi.clone();
                async move { Json(spec) }
            }),
        )
        .merge(Router::from(
            RapiDoc::new("/api-docs/openapi.json").path("/docs"),
        ))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();

        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
