//! EXIF stripping for stored originals.

use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::ImageEXIF;

/// Removes EXIF metadata from JPEG and PNG originals before storage.
/// Other formats pass through unchanged.
///
/// Orientation is baked into thumbnails beforehand, so stripping here
/// only affects the stored original.
pub fn remove_exif(data: &[u8]) -> Vec<u8> {
    if let Ok(mut jpeg) = Jpeg::from_bytes(data.to_vec().into()) {
        jpeg.set_exif(None);
        return jpeg.encoder().bytes().to_vec();
    }

    if let Ok(mut png) = Png::from_bytes(data.to_vec().into()) {
        png.set_exif(None);
        return png.encoder().bytes().to_vec();
    }

    data.to_vec()
}
