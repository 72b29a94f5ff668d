//! Thumbnail pipeline: fan an original out into size/format variants and
//! upload each to object storage.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use fotogate_core::models::{AssetType, SizeClass, ThumbnailFormat};
use fotogate_core::Config;
use fotogate_storage::{keys, Storage};

use crate::generator::ThumbnailGenerator;
use crate::metadata::{extract_metadata, ImageMetadata};

/// Pipeline tuning derived from application config.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub size_classes: Vec<(SizeClass, u32)>,
    pub formats: Vec<ThumbnailFormat>,
    pub jpeg_quality: u8,
    pub webp_quality: u8,
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            size_classes: config.size_classes().to_vec(),
            formats: config.thumbnail_formats.clone(),
            jpeg_quality: config.jpeg_quality,
            webp_quality: config.webp_quality,
        }
    }
}

/// One successfully stored thumbnail variant.
#[derive(Debug, Clone)]
pub struct ThumbnailResult {
    pub size: SizeClass,
    pub format: ThumbnailFormat,
    pub key: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Outcome of running the pipeline over one original.
///
/// `thumbnails` holds only the variants that succeeded. Variant failures
/// are logged and skipped; they never fail the upload as a whole.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub original: ImageMetadata,
    pub thumbnails: Vec<ThumbnailResult>,
}

/// URLs selected for the API response, one per size class, preferring the
/// webp variant when both formats exist.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailUrls {
    pub small: Option<String>,
    pub medium: Option<String>,
    pub large: Option<String>,
}

impl ThumbnailUrls {
    pub fn get(&self, size: SizeClass) -> Option<&str> {
        match size {
            SizeClass::Small => self.small.as_deref(),
            SizeClass::Medium => self.medium.as_deref(),
            SizeClass::Large => self.large.as_deref(),
        }
    }
}

/// Picks one URL per size class from pipeline results. Webp wins over jpeg
/// for the same size; a size with no surviving variant stays `None`.
pub fn select_urls(thumbnails: &[ThumbnailResult]) -> ThumbnailUrls {
    let mut by_variant: HashMap<(SizeClass, ThumbnailFormat), &str> = HashMap::new();
    for thumb in thumbnails {
        by_variant.insert((thumb.size, thumb.format), &thumb.url);
    }

    let pick = |size: SizeClass| -> Option<String> {
        by_variant
            .get(&(size, ThumbnailFormat::Webp))
            .or_else(|| by_variant.get(&(size, ThumbnailFormat::Jpeg)))
            .map(|url| url.to_string())
    };

    ThumbnailUrls {
        small: pick(SizeClass::Small),
        medium: pick(SizeClass::Medium),
        large: pick(SizeClass::Large),
    }
}

/// Generates and stores all configured thumbnail variants for an upload.
pub struct ImagePipeline {
    config: PipelineConfig,
    generator: ThumbnailGenerator,
    storage: Arc<dyn Storage>,
}

impl ImagePipeline {
    pub fn new(config: PipelineConfig, storage: Arc<dyn Storage>) -> Self {
        let generator = ThumbnailGenerator::new(config.jpeg_quality, config.webp_quality);
        Self {
            config,
            generator,
            storage,
        }
    }

    /// Runs the full pipeline for one validated original.
    ///
    /// Variants are processed size-major (small before medium before large)
    /// and format-minor within a size. Generation runs on the blocking pool
    /// since decode and encode are CPU-bound.
    pub async fn process(
        &self,
        data: Bytes,
        filename: &str,
        asset_type: AssetType,
        scope_id: Option<&str>,
    ) -> ProcessResult {
        let meta_input = data.clone();
        let original = tokio::task::spawn_blocking(move || extract_metadata(&meta_input))
            .await
            .unwrap_or_else(|_| extract_metadata(&[]));

        let mut thumbnails = Vec::with_capacity(self.config.size_classes.len() * self.config.formats.len());

        for &(size, max_dimension) in &self.config.size_classes {
            for &format in &self.config.formats {
                match self
                    .process_variant(&data, filename, asset_type, scope_id, size, max_dimension, format)
                    .await
                {
                    Ok(result) => thumbnails.push(result),
                    Err(error) => {
                        tracing::warn!(
                            filename = %filename,
                            size = %size,
                            format = %format,
                            error = %error,
                            "Skipping failed thumbnail variant"
                        );
                    }
                }
            }
        }

        tracing::info!(
            filename = %filename,
            asset_type = %asset_type,
            generated = thumbnails.len(),
            requested = self.config.size_classes.len() * self.config.formats.len(),
            "Thumbnail pipeline finished"
        );

        ProcessResult {
            original,
            thumbnails,
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn process_variant(
        &self,
        data: &Bytes,
        filename: &str,
        asset_type: AssetType,
        scope_id: Option<&str>,
        size: SizeClass,
        max_dimension: u32,
        format: ThumbnailFormat,
    ) -> anyhow::Result<ThumbnailResult> {
        let generator = self.generator.clone();
        let input = data.clone();
        let generated =
            tokio::task::spawn_blocking(move || generator.generate(&input, max_dimension, format))
                .await??;

        let key = keys::thumbnail_key(asset_type, scope_id, filename, size, format);
        let url = self
            .storage
            .put(&key, generated.data, format.mime_type())
            .await?;

        Ok(ThumbnailResult {
            size,
            format,
            key,
            url,
            width: generated.width,
            height: generated.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fotogate_core::models::Dimensions;
    use fotogate_core::StorageBackend;
    use fotogate_storage::{StorageError, StorageResult};
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Mutex;

    /// In-memory storage double. `fail_key` makes a single put fail, for
    /// exercising per-variant skip behavior.
    struct MemoryStorage {
        objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
        fail_key: Option<String>,
    }

    impl MemoryStorage {
        fn new() -> Self {
            Self {
                objects: Mutex::new(HashMap::new()),
                fail_key: None,
            }
        }

        fn failing_on(key: &str) -> Self {
            Self {
                objects: Mutex::new(HashMap::new()),
                fail_key: Some(key.to_string()),
            }
        }
    }

    #[async_trait]
    impl Storage for MemoryStorage {
        async fn put(
            &self,
            storage_key: &str,
            data: Vec<u8>,
            content_type: &str,
        ) -> StorageResult<String> {
            if self.fail_key.as_deref() == Some(storage_key) {
                return Err(StorageError::UploadFailed(format!(
                    "injected failure for {storage_key}"
                )));
            }
            self.objects
                .lock()
                .unwrap()
                .insert(storage_key.to_string(), (data, content_type.to_string()));
            Ok(format!("https://cdn.test/{storage_key}"))
        }

        async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
            self.objects
                .lock()
                .unwrap()
                .get(storage_key)
                .map(|(data, _)| data.clone())
                .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
        }

        async fn delete(&self, storage_key: &str) -> StorageResult<()> {
            self.objects.lock().unwrap().remove(storage_key);
            Ok(())
        }

        async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
            Ok(self.objects.lock().unwrap().contains_key(storage_key))
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::Local
        }
    }

    fn test_pipeline_config() -> PipelineConfig {
        PipelineConfig {
            size_classes: vec![
                (SizeClass::Small, 400),
                (SizeClass::Medium, 800),
                (SizeClass::Large, 1200),
            ],
            formats: vec![ThumbnailFormat::Jpeg, ThumbnailFormat::Webp],
            jpeg_quality: 85,
            webp_quality: 85,
        }
    }

    fn jpeg_of(width: u32, height: u32) -> Bytes {
        let img = RgbImage::from_pixel(width, height, Rgb([90, 120, 60]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
            .unwrap();
        Bytes::from(buf)
    }

    #[tokio::test]
    async fn test_generates_all_six_variants() {
        let storage = Arc::new(MemoryStorage::new());
        let pipeline = ImagePipeline::new(test_pipeline_config(), storage.clone());

        let result = pipeline
            .process(jpeg_of(3000, 2000), "shoot.jpg", AssetType::Portfolio, None)
            .await;

        assert_eq!(result.original.dimensions, Dimensions::new(3000, 2000));
        assert_eq!(result.thumbnails.len(), 6);

        let dims: Vec<(u32, u32)> = result
            .thumbnails
            .iter()
            .map(|t| (t.width, t.height))
            .collect();
        assert_eq!(
            dims,
            vec![
                (400, 267),
                (400, 267),
                (800, 533),
                (800, 533),
                (1200, 800),
                (1200, 800)
            ]
        );

        // Size-major, format-minor ordering
        let keys: Vec<&str> = result.thumbnails.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "portfolio/thumbnails/shoot-small.jpg",
                "portfolio/thumbnails/shoot-small.webp",
                "portfolio/thumbnails/shoot-medium.jpg",
                "portfolio/thumbnails/shoot-medium.webp",
                "portfolio/thumbnails/shoot-large.jpg",
                "portfolio/thumbnails/shoot-large.webp",
            ]
        );

        for thumb in &result.thumbnails {
            assert!(storage.exists(&thumb.key).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_small_original_never_upscaled() {
        let storage = Arc::new(MemoryStorage::new());
        let pipeline = ImagePipeline::new(test_pipeline_config(), storage);

        let result = pipeline
            .process(jpeg_of(200, 150), "tiny.jpg", AssetType::Slideshow, None)
            .await;

        assert_eq!(result.thumbnails.len(), 6);
        for thumb in &result.thumbnails {
            assert_eq!((thumb.width, thumb.height), (200, 150));
        }
    }

    #[tokio::test]
    async fn test_variant_failure_is_skipped_not_fatal() {
        let storage = Arc::new(MemoryStorage::failing_on(
            "events/e42/thumbnails/party-medium.webp",
        ));
        let pipeline = ImagePipeline::new(test_pipeline_config(), storage);

        let result = pipeline
            .process(jpeg_of(1600, 1000), "party.jpg", AssetType::Events, Some("e42"))
            .await;

        assert_eq!(result.thumbnails.len(), 5);
        assert!(result
            .thumbnails
            .iter()
            .all(|t| t.key != "events/e42/thumbnails/party-medium.webp"));
        assert_eq!(result.original.dimensions.width, 1600);
    }

    #[tokio::test]
    async fn test_undecodable_original_yields_no_thumbnails() {
        let storage = Arc::new(MemoryStorage::new());
        let pipeline = ImagePipeline::new(test_pipeline_config(), storage);

        let result = pipeline
            .process(
                Bytes::from_static(b"ftyp-free garbage"),
                "bad.jpg",
                AssetType::Portfolio,
                None,
            )
            .await;

        assert!(result.thumbnails.is_empty());
        assert_eq!(result.original.format, "unknown");
    }

    #[test]
    fn test_select_urls_prefers_webp() {
        let thumbs = vec![
            ThumbnailResult {
                size: SizeClass::Small,
                format: ThumbnailFormat::Jpeg,
                key: "k1".into(),
                url: "https://cdn.test/small.jpg".into(),
                width: 400,
                height: 267,
            },
            ThumbnailResult {
                size: SizeClass::Small,
                format: ThumbnailFormat::Webp,
                key: "k2".into(),
                url: "https://cdn.test/small.webp".into(),
                width: 400,
                height: 267,
            },
            ThumbnailResult {
                size: SizeClass::Medium,
                format: ThumbnailFormat::Jpeg,
                key: "k3".into(),
                url: "https://cdn.test/medium.jpg".into(),
                width: 800,
                height: 533,
            },
        ];

        let urls = select_urls(&thumbs);
        assert_eq!(urls.small.as_deref(), Some("https://cdn.test/small.webp"));
        assert_eq!(urls.medium.as_deref(), Some("https://cdn.test/medium.jpg"));
        assert_eq!(urls.large, None);
    }
}
