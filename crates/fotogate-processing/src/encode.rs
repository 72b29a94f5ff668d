//! Thumbnail encoders. JPEG goes through mozjpeg, WebP through libwebp.

use image::DynamicImage;

use fotogate_core::models::ThumbnailFormat;

use crate::generator::GenerationError;

pub fn encode(
    img: &DynamicImage,
    format: ThumbnailFormat,
    quality: u8,
) -> Result<Vec<u8>, GenerationError> {
    match format {
        ThumbnailFormat::Jpeg => encode_jpeg(img, quality),
        ThumbnailFormat::Webp => Ok(encode_webp(img, quality)),
    }
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, GenerationError> {
    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(quality as f32);
    comp.set_progressive_mode();
    comp.set_optimize_coding(true);

    let mut comp = comp
        .start_compress(Vec::new())
        .map_err(|e| GenerationError::Encode(e.to_string()))?;
    comp.write_scanlines(&rgb_img)
        .map_err(|e| GenerationError::Encode(e.to_string()))?;
    comp.finish()
        .map_err(|e| GenerationError::Encode(e.to_string()))
}

fn encode_webp(img: &DynamicImage, quality: u8) -> Vec<u8> {
    let rgba_img = img.to_rgba8();
    let (width, height) = rgba_img.dimensions();

    let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
    encoder.encode(quality as f32).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn test_image() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 24, Rgba([200, 100, 50, 255])))
    }

    #[test]
    fn test_jpeg_output_has_jpeg_signature() {
        let data = encode(&test_image(), ThumbnailFormat::Jpeg, 85).unwrap();
        assert!(data.starts_with(&[0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn test_webp_output_has_riff_signature() {
        let data = encode(&test_image(), ThumbnailFormat::Webp, 85).unwrap();
        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(&data[8..12], b"WEBP");
    }
}
