//! Image validation: signature sniffing + allow-list + structural check.

use std::io::Cursor;

use image::ImageReader;

use crate::sniff::{sniff_format, SniffedFormat};

/// Validation errors. A validation failure aborts the whole upload; no
/// thumbnails are attempted.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Could not detect file type")]
    UnrecognizedFormat,

    #[error("Invalid file type: {detected}")]
    DisallowedFormat { detected: String },

    #[error("Corrupt image: {0}")]
    CorruptImage(String),
}

/// Image validator.
///
/// Validation is a pure function of the buffer: the caller-declared MIME
/// type is only logged, never trusted, so a PNG renamed to `.jpg` and
/// declared as `image/jpeg` is judged by its PNG signature.
pub struct ImageValidator {
    allowed_mime_types: Vec<String>,
}

impl ImageValidator {
    pub fn new(allowed_mime_types: Vec<String>) -> Self {
        Self { allowed_mime_types }
    }

    pub fn validate(
        &self,
        data: &[u8],
        declared_mime: &str,
    ) -> Result<SniffedFormat, ValidationError> {
        let detected = sniff_format(data).ok_or(ValidationError::UnrecognizedFormat)?;

        if detected.canonical_mime() != declared_mime.to_lowercase() {
            tracing::debug!(
                declared = %declared_mime,
                detected = %detected.canonical_mime(),
                "Declared content type disagrees with sniffed signature"
            );
        }

        if !self
            .allowed_mime_types
            .iter()
            .any(|m| m == detected.canonical_mime())
        {
            return Err(ValidationError::DisallowedFormat {
                detected: detected.canonical_mime().to_string(),
            });
        }

        self.check_structure(data, detected)?;

        Ok(detected)
    }

    /// Header/metadata parse of a recognized format. Full pixel decoding is
    /// deferred to the generator.
    fn check_structure(
        &self,
        data: &[u8],
        detected: SniffedFormat,
    ) -> Result<(), ValidationError> {
        if detected.is_decodable() {
            let reader = ImageReader::new(Cursor::new(data))
                .with_guessed_format()
                .map_err(|e| ValidationError::CorruptImage(e.to_string()))?;
            reader
                .into_dimensions()
                .map_err(|e| ValidationError::CorruptImage(e.to_string()))?;
            return Ok(());
        }

        // ISO-BMFF family: the ftyp box size must describe a box that fits
        // inside the buffer.
        let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if box_size < 16 || box_size > data.len() {
            return Err(ValidationError::CorruptImage(
                "Invalid ISO-BMFF ftyp box".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        buffer
    }

    fn default_validator() -> ImageValidator {
        ImageValidator::new(vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "image/webp".to_string(),
            "image/heic".to_string(),
            "image/heif".to_string(),
        ])
    }

    #[test]
    fn test_valid_jpeg_passes() {
        let validator = default_validator();
        let detected = validator.validate(&jpeg_bytes(), "image/jpeg").unwrap();
        assert_eq!(detected, SniffedFormat::Jpeg);
    }

    #[test]
    fn test_spoofed_declared_mime_is_ignored() {
        // A PNG declared as image/jpeg validates as PNG: the true signature
        // wins, and PNG is on the allow-list.
        let validator = default_validator();
        let detected = validator.validate(&png_bytes(), "image/jpeg").unwrap();
        assert_eq!(detected, SniffedFormat::Png);
    }

    #[test]
    fn test_disallowed_true_format_rejected_despite_declared_type() {
        // Only jpeg is allowed; a PNG buffer declared as image/jpeg is
        // rejected on its true format.
        let validator = ImageValidator::new(vec!["image/jpeg".to_string()]);
        let err = validator.validate(&png_bytes(), "image/jpeg").unwrap_err();
        assert!(matches!(err, ValidationError::DisallowedFormat { .. }));
    }

    #[test]
    fn test_renamed_text_file_rejected() {
        let validator = default_validator();
        let err = validator
            .validate(b"hello, i am a text file pretending to be a photo", "image/jpeg")
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnrecognizedFormat));
    }

    #[test]
    fn test_truncated_png_is_corrupt() {
        let validator = default_validator();
        let mut buf = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        buf.extend_from_slice(&[0xAB; 16]);
        let err = validator.validate(&buf, "image/png").unwrap_err();
        assert!(matches!(err, ValidationError::CorruptImage(_)));
    }

    #[test]
    fn test_heic_structural_check() {
        let validator = default_validator();

        let mut ok = vec![0x00, 0x00, 0x00, 0x18];
        ok.extend_from_slice(b"ftypheic");
        ok.extend_from_slice(&[0u8; 12]);
        assert!(validator.validate(&ok, "image/heic").is_ok());

        // Declared box size exceeds the buffer
        let mut truncated = vec![0x00, 0x00, 0xFF, 0xFF];
        truncated.extend_from_slice(b"ftypheic");
        truncated.extend_from_slice(&[0u8; 4]);
        let err = validator.validate(&truncated, "image/heic").unwrap_err();
        assert!(matches!(err, ValidationError::CorruptImage(_)));
    }
}
