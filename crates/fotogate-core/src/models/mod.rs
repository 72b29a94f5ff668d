//! Domain models shared across fotogate crates.

pub mod asset;
pub mod responses;
pub mod thumbnail;

pub use asset::AssetType;
pub use responses::{BatchItemResult, BatchSummary, BatchUploadResponse, PhotoResponse, UploadResponse};
pub use thumbnail::{Dimensions, SizeClass, ThumbnailFormat};
