//! Configuration module
//!
//! Environment-driven configuration for the upload gateway: server settings,
//! authentication, storage backend selection, upload limits, and the
//! thumbnail size/format matrix.

use std::env;
use std::str::FromStr;

use crate::models::{SizeClass, ThumbnailFormat};
use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_MAX_FILE_SIZE_MB: usize = 200;
const DEFAULT_MAX_FILES: usize = 50;
const DEFAULT_JPEG_QUALITY: u8 = 85;
const DEFAULT_WEBP_QUALITY: u8 = 85;
const DEFAULT_SMALL_MAX_DIM: u32 = 400;
const DEFAULT_MEDIUM_MAX_DIM: u32 = 800;
const DEFAULT_LARGE_MAX_DIM: u32 = 1200;

/// Application configuration for the upload gateway.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Shared secret checked by the auth middleware (X-API-Key / Bearer).
    pub api_key: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    /// Public URL base for uploaded objects: `{public_base_url}/{key}`.
    pub public_base_url: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload limits
    pub max_file_size_bytes: usize,
    pub max_files_per_request: usize,
    /// Canonical MIME types accepted after signature sniffing.
    pub allowed_mime_types: Vec<String>,
    // Thumbnail matrix
    pub thumbnail_small_max_dim: u32,
    pub thumbnail_medium_max_dim: u32,
    pub thumbnail_large_max_dim: u32,
    pub thumbnail_formats: Vec<ThumbnailFormat>,
    pub jpeg_quality: u8,
    pub webp_quality: u8,
    /// Strip EXIF metadata from stored originals.
    pub remove_exif: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| DEFAULT_MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);

        let allowed_mime_types = env::var("ALLOWED_MIME_TYPES")
            .unwrap_or_else(|_| {
                "image/jpeg,image/png,image/webp,image/heic,image/heif".to_string()
            })
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let thumbnail_formats = env::var("THUMBNAIL_FORMATS")
            .unwrap_or_else(|_| "jpeg,webp".to_string())
            .split(',')
            .map(|s| match s.trim().to_lowercase().as_str() {
                "jpeg" | "jpg" => Ok(ThumbnailFormat::Jpeg),
                "webp" => Ok(ThumbnailFormat::Webp),
                other => Err(anyhow::anyhow!("Invalid thumbnail format: {}", other)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .map(|s| StorageBackend::from_str(&s))
            .transpose()?
            .unwrap_or(StorageBackend::S3);

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            api_key: env::var("UPLOAD_API_KEY")
                .map_err(|_| anyhow::anyhow!("UPLOAD_API_KEY must be set for authentication"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            public_base_url: env::var("PUBLIC_BASE_URL").ok().map(|s| {
                // Some deploy tooling leaves quotes around URL values
                s.trim_matches('"').trim_end_matches('/').to_string()
            }),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            max_files_per_request: env::var("MAX_FILES")
                .unwrap_or_else(|_| DEFAULT_MAX_FILES.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_FILES),
            allowed_mime_types,
            thumbnail_small_max_dim: parse_env_u32("THUMBNAIL_SMALL_MAX_DIM", DEFAULT_SMALL_MAX_DIM),
            thumbnail_medium_max_dim: parse_env_u32(
                "THUMBNAIL_MEDIUM_MAX_DIM",
                DEFAULT_MEDIUM_MAX_DIM,
            ),
            thumbnail_large_max_dim: parse_env_u32("THUMBNAIL_LARGE_MAX_DIM", DEFAULT_LARGE_MAX_DIM),
            thumbnail_formats,
            jpeg_quality: parse_env_u32("JPEG_QUALITY", DEFAULT_JPEG_QUALITY as u32)
                .min(100) as u8,
            webp_quality: parse_env_u32("WEBP_QUALITY", DEFAULT_WEBP_QUALITY as u32)
                .min(100) as u8,
            remove_exif: env::var("REMOVE_EXIF")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Size classes with their maximum bounding dimensions, ascending.
    /// The pipeline iterates this order (size-major).
    pub fn size_classes(&self) -> [(SizeClass, u32); 3] {
        SizeClass::all().map(|size| (size, self.max_dimension_for(size)))
    }

    fn max_dimension_for(&self, size: SizeClass) -> u32 {
        match size {
            SizeClass::Small => self.thumbnail_small_max_dim,
            SizeClass::Medium => self.thumbnail_medium_max_dim,
            SizeClass::Large => self.thumbnail_large_max_dim,
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_API_KEY cannot be empty"));
        }

        if self.thumbnail_formats.is_empty() {
            return Err(anyhow::anyhow!("THUMBNAIL_FORMATS cannot be empty"));
        }

        if self.thumbnail_small_max_dim > self.thumbnail_medium_max_dim
            || self.thumbnail_medium_max_dim > self.thumbnail_large_max_dim
        {
            return Err(anyhow::anyhow!(
                "Thumbnail dimensions must be ascending: small <= medium <= large"
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!("S3_BUCKET must be set for the s3 backend"));
                }
                if self.public_base_url.is_none() && self.s3_endpoint.is_none() {
                    return Err(anyhow::anyhow!(
                        "PUBLIC_BASE_URL or S3_ENDPOINT must be set for the s3 backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() || self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set for the local backend"
                    ));
                }
            }
        }

        Ok(())
    }
}

fn parse_env_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
