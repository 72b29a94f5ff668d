//! Best-effort metadata extraction from the original upload.

use std::io::Cursor;

use image::ImageReader;

use fotogate_core::models::Dimensions;

use crate::sniff::sniff_format;

/// Pixel dimensions and detected format of an uploaded original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMetadata {
    pub dimensions: Dimensions,
    pub format: String,
}

/// Reads dimensions and format without decoding pixel data.
///
/// Extraction never fails: formats whose headers cannot be parsed (or
/// HEIC originals, which are not decodable here) report zero dimensions
/// so the upload can still proceed.
pub fn extract_metadata(data: &[u8]) -> ImageMetadata {
    let format = sniff_format(data)
        .map(|f| f.name().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let (width, height) = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()
        .and_then(|r| r.into_dimensions().ok())
        .unwrap_or((0, 0));

    ImageMetadata {
        dimensions: Dimensions::new(width, height),
        format,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    #[test]
    fn test_extracts_png_dimensions() {
        let img = RgbImage::from_pixel(64, 48, Rgb([1, 2, 3]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();

        let meta = extract_metadata(&buf);
        assert_eq!(meta.dimensions, Dimensions::new(64, 48));
        assert!(meta.dimensions.is_known());
        assert_eq!(meta.format, "png");
    }

    #[test]
    fn test_unparseable_input_degrades_to_zero() {
        let meta = extract_metadata(b"not an image at all, sorry");
        assert_eq!(meta.dimensions, Dimensions::default());
        assert!(!meta.dimensions.is_known());
        assert_eq!(meta.format, "unknown");
    }

    #[test]
    fn test_heic_reports_format_without_dimensions() {
        let mut buf = vec![0x00, 0x00, 0x00, 0x18];
        buf.extend_from_slice(b"ftypheic");
        buf.extend_from_slice(&[0u8; 12]);

        let meta = extract_metadata(&buf);
        assert_eq!(meta.format, "heic");
        assert_eq!(meta.dimensions, Dimensions::default());
    }
}
