//! Fotogate Processing Library
//!
//! This crate implements the image pipeline: format sniffing and validation,
//! metadata extraction, EXIF orientation handling, thumbnail generation
//! (fit-inside resize + re-encode), and the orchestrator that produces the
//! full size × encoding thumbnail matrix for one upload.

pub mod encode;
pub mod generator;
pub mod metadata;
pub mod orientation;
pub mod pipeline;
pub mod sanitize;
pub mod sniff;
pub mod validator;

// Re-export commonly used types
pub use generator::{GeneratedThumbnail, GenerationError, ThumbnailGenerator};
pub use metadata::{extract_metadata, ImageMetadata};
pub use pipeline::{
    select_urls, ImagePipeline, PipelineConfig, ProcessResult, ThumbnailResult, ThumbnailUrls,
};
pub use sniff::SniffedFormat;
pub use validator::{ImageValidator, ValidationError};
