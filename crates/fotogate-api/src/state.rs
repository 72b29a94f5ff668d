//! Application state shared across handlers.

use std::sync::Arc;

use fotogate_core::Config;
use fotogate_processing::{ImagePipeline, ImageValidator};
use fotogate_storage::Storage;

/// Everything a handler needs: configuration, the storage backend, the
/// thumbnail pipeline, and the upload validator.
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub pipeline: ImagePipeline,
    pub validator: ImageValidator,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        let pipeline = ImagePipeline::new((&config).into(), storage.clone());
        let validator = ImageValidator::new(config.allowed_mime_types.clone());
        Self {
            config,
            storage,
            pipeline,
            validator,
        }
    }
}
