//! EXIF orientation correction applied before resizing.

use std::io::Cursor;

use exif::{In, Tag};
use image::{imageops, DynamicImage};

/// Reads the EXIF orientation tag from the original bytes.
///
/// Missing or unreadable EXIF, or an out-of-range value, yields 1 (normal).
pub fn read_exif_orientation(data: &[u8]) -> u8 {
    let mut cursor = Cursor::new(data);
    let Ok(exif) = exif::Reader::new().read_from_container(&mut cursor) else {
        return 1;
    };

    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .filter(|v| (1..=8).contains(v))
        .map(|v| v as u8)
        .unwrap_or(1)
}

/// Rotation and flip operations for a given EXIF orientation value.
/// Returns (rotate_angle, flip_horizontal, flip_vertical).
pub fn orientation_transforms(orientation: u8) -> (Option<u16>, bool, bool) {
    match orientation {
        1 => (None, false, false),      // Normal
        2 => (None, true, false),       // Mirror horizontal
        3 => (Some(180), false, false), // Rotate 180
        4 => (None, false, true),       // Mirror vertical
        5 => (Some(270), true, false),  // Mirror horizontal + Rotate 270 CW
        6 => (Some(90), false, false),  // Rotate 90 CW
        7 => (Some(90), true, false),   // Mirror horizontal + Rotate 90 CW
        8 => (Some(270), false, false), // Rotate 270 CW
        _ => (None, false, false),      // Invalid, treat as normal
    }
}

/// Bakes the EXIF orientation of `data` into the decoded pixels so that
/// thumbnails render upright everywhere, orientation tag or not.
pub fn apply_exif_orientation(mut img: DynamicImage, data: &[u8]) -> DynamicImage {
    let orientation = read_exif_orientation(data);
    let (rotate, flip_h, flip_v) = orientation_transforms(orientation);

    if orientation != 1 {
        tracing::debug!(
            orientation = orientation,
            rotate = ?rotate,
            flip_horizontal = flip_h,
            flip_vertical = flip_v,
            "Applying EXIF orientation"
        );
    }

    if let Some(angle) = rotate {
        img = rotate_by_angle(img, angle);
    }
    if flip_h {
        img = DynamicImage::ImageRgba8(imageops::flip_horizontal(&img.to_rgba8()));
    }
    if flip_v {
        img = DynamicImage::ImageRgba8(imageops::flip_vertical(&img.to_rgba8()));
    }

    img
}

fn rotate_by_angle(img: DynamicImage, angle: u16) -> DynamicImage {
    match angle {
        90 => DynamicImage::ImageRgba8(imageops::rotate90(&img.to_rgba8())),
        180 => DynamicImage::ImageRgba8(imageops::rotate180(&img.to_rgba8())),
        270 => DynamicImage::ImageRgba8(imageops::rotate270(&img.to_rgba8())),
        _ => img,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    #[test]
    fn test_orientation_transforms_all_values() {
        for orientation in 1..=8 {
            let (rotate, _flip_h, _flip_v) = orientation_transforms(orientation);
            if let Some(angle) = rotate {
                assert!([90, 180, 270].contains(&angle));
            }
        }
    }

    #[test]
    fn test_orientation_transforms_invalid() {
        for orientation in [0, 9, 255] {
            let (rotate, flip_h, flip_v) = orientation_transforms(orientation);
            assert_eq!(rotate, None);
            assert!(!flip_h);
            assert!(!flip_v);
        }
    }

    #[test]
    fn test_read_orientation_no_exif() {
        assert_eq!(read_exif_orientation(b""), 1);
        assert_eq!(read_exif_orientation(&[0xFF, 0xD8, 0xFF, 0xE0]), 1);
    }

    #[test]
    fn test_rotation_dimension_changes() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 2, Rgba([0, 0, 255, 255])));

        assert_eq!(rotate_by_angle(img.clone(), 90).dimensions(), (2, 4));
        assert_eq!(rotate_by_angle(img.clone(), 180).dimensions(), (4, 2));
        assert_eq!(rotate_by_angle(img.clone(), 270).dimensions(), (2, 4));
    }

    #[test]
    fn test_apply_without_exif_is_identity() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 6, Rgba([255, 0, 0, 255])));
        let oriented = apply_exif_orientation(img.clone(), b"");
        assert_eq!(oriented.dimensions(), img.dimensions());
    }
}
