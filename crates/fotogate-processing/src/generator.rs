//! Single-variant thumbnail generation: decode, orient, resize, encode.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{GenericImageView, ImageReader};

use fotogate_core::models::{Dimensions, ThumbnailFormat};

use crate::encode;
use crate::orientation;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),
}

/// One encoded thumbnail variant.
#[derive(Debug, Clone)]
pub struct GeneratedThumbnail {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Produces thumbnail variants from an original image.
///
/// Resizing fits inside a `max_dimension` square preserving aspect ratio.
/// Images already within bounds are re-encoded at their original size,
/// never upscaled.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    jpeg_quality: u8,
    webp_quality: u8,
}

impl ThumbnailGenerator {
    pub fn new(jpeg_quality: u8, webp_quality: u8) -> Self {
        Self {
            jpeg_quality,
            webp_quality,
        }
    }

    pub fn generate(
        &self,
        data: &[u8],
        max_dimension: u32,
        format: ThumbnailFormat,
    ) -> Result<GeneratedThumbnail, GenerationError> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| GenerationError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| GenerationError::Decode(e.to_string()))?;

        let img = orientation::apply_exif_orientation(img, data);

        let (width, height) = img.dimensions();
        let img = if Dimensions::new(width, height).fits_within(max_dimension) {
            img
        } else {
            img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
        };

        let (out_width, out_height) = img.dimensions();
        let quality = match format {
            ThumbnailFormat::Jpeg => self.jpeg_quality,
            ThumbnailFormat::Webp => self.webp_quality,
        };
        let encoded = encode::encode(&img, format, quality)?;

        Ok(GeneratedThumbnail {
            data: encoded,
            width: out_width,
            height: out_height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn jpeg_of(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([120, 80, 40]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    fn dimensions_of(data: &[u8]) -> (u32, u32) {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .unwrap()
            .into_dimensions()
            .unwrap()
    }

    #[test]
    fn test_landscape_fits_inside_bound() {
        let generator = ThumbnailGenerator::new(85, 85);
        let original = jpeg_of(3000, 2000);

        let thumb = generator
            .generate(&original, 400, ThumbnailFormat::Jpeg)
            .unwrap();
        assert_eq!((thumb.width, thumb.height), (400, 267));
        assert_eq!(dimensions_of(&thumb.data), (400, 267));
    }

    #[test]
    fn test_portrait_fits_inside_bound() {
        let generator = ThumbnailGenerator::new(85, 85);
        let original = jpeg_of(2000, 3000);

        let thumb = generator
            .generate(&original, 800, ThumbnailFormat::Webp)
            .unwrap();
        assert_eq!((thumb.width, thumb.height), (533, 800));
    }

    #[test]
    fn test_small_image_not_upscaled() {
        let generator = ThumbnailGenerator::new(85, 85);
        let original = jpeg_of(200, 150);

        let thumb = generator
            .generate(&original, 1200, ThumbnailFormat::Jpeg)
            .unwrap();
        assert_eq!((thumb.width, thumb.height), (200, 150));
    }

    #[test]
    fn test_garbage_input_fails_to_decode() {
        let generator = ThumbnailGenerator::new(85, 85);
        let err = generator
            .generate(b"definitely not pixels", 400, ThumbnailFormat::Jpeg)
            .unwrap_err();
        assert!(matches!(err, GenerationError::Decode(_)));
    }
}
