//! Fotogate Storage Library
//!
//! This crate provides the object-storage abstraction for the upload
//! gateway: the `Storage` trait, an S3-compatible backend (Cloudflare R2,
//! MinIO, AWS S3), a local-filesystem backend, and key derivation.
//!
//! # Storage key format
//!
//! Keys are derived deterministically from the asset type, optional event
//! scope, filename, and (for thumbnails) the size class and encoding:
//!
//! - **Originals**: `{asset_type}/originals/{filename}` or
//!   `events/{event_id}/originals/{filename}`
//! - **Thumbnails**: `{asset_type}/thumbnails/{base}-{size}.{ext}` or
//!   `events/{event_id}/thumbnails/{base}-{size}.{ext}`
//!
//! Keys must not contain `..` or a leading `/`. Key derivation is
//! centralized in the `keys` module so all callers stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use fotogate_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
