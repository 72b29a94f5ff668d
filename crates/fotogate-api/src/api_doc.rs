//! OpenAPI documentation.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use fotogate_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fotogate Upload API",
        version = "0.1.0",
        description = "Photo upload gateway: validates images, stores originals, and generates jpeg/webp thumbnails in three sizes."
    ),
    paths(
        handlers::health::index,
        handlers::health::health_check,
        handlers::upload::upload_portfolio,
        handlers::upload::upload_portfolio_batch,
        handlers::upload::upload_event,
        handlers::upload::upload_event_batch,
        handlers::upload::upload_slideshow,
    ),
    components(schemas(
        models::PhotoResponse,
        models::UploadResponse,
        models::BatchItemResult,
        models::BatchSummary,
        models::BatchUploadResponse,
        error::ErrorResponse,
        handlers::health::HealthCheckResponse,
    )),
    modifiers(&ApiKeyAddon),
    tags(
        (name = "upload", description = "Photo upload endpoints"),
        (name = "meta", description = "Service information and health")
    )
)]
pub struct ApiDoc;

struct ApiKeyAddon;

impl Modify for ApiKeyAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}
