//! Image format detection from leading bytes.
//!
//! A caller-supplied `Content-Type` header is a spoofing vector; only the
//! buffer's own signature is authoritative. This module recognizes the
//! common photo container signatures, including the ISO-BMFF family
//! (HEIC/HEIF/AVIF) which the `image` crate cannot decode but which the
//! gateway must still identify for allow-list checks.

/// Image format detected by signature sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffedFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
    Tiff,
    Bmp,
    Heic,
    Heif,
    Avif,
}

impl SniffedFormat {
    /// Canonical MIME type for allow-list matching.
    pub fn canonical_mime(&self) -> &'static str {
        match self {
            SniffedFormat::Jpeg => "image/jpeg",
            SniffedFormat::Png => "image/png",
            SniffedFormat::Webp => "image/webp",
            SniffedFormat::Gif => "image/gif",
            SniffedFormat::Tiff => "image/tiff",
            SniffedFormat::Bmp => "image/bmp",
            SniffedFormat::Heic => "image/heic",
            SniffedFormat::Heif => "image/heif",
            SniffedFormat::Avif => "image/avif",
        }
    }

    /// Lowercase format name, used in metadata responses.
    pub fn name(&self) -> &'static str {
        match self {
            SniffedFormat::Jpeg => "jpeg",
            SniffedFormat::Png => "png",
            SniffedFormat::Webp => "webp",
            SniffedFormat::Gif => "gif",
            SniffedFormat::Tiff => "tiff",
            SniffedFormat::Bmp => "bmp",
            SniffedFormat::Heic => "heic",
            SniffedFormat::Heif => "heif",
            SniffedFormat::Avif => "avif",
        }
    }

    /// Whether the `image` crate can structurally decode this format.
    /// HEIC/HEIF/AVIF only get an ISO-BMFF box check.
    pub fn is_decodable(&self) -> bool {
        !matches!(
            self,
            SniffedFormat::Heic | SniffedFormat::Heif | SniffedFormat::Avif
        )
    }
}

/// Sniff the format from the buffer's leading bytes. Returns `None` when no
/// known signature matches.
pub fn sniff_format(data: &[u8]) -> Option<SniffedFormat> {
    if data.len() < 12 {
        return None;
    }

    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(SniffedFormat::Jpeg);
    }
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some(SniffedFormat::Png);
    }
    if &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Some(SniffedFormat::Webp);
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some(SniffedFormat::Gif);
    }
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return Some(SniffedFormat::Tiff);
    }
    if data.starts_with(b"BM") {
        return Some(SniffedFormat::Bmp);
    }

    // ISO-BMFF containers: size(4) "ftyp"(4) major_brand(4)
    if &data[4..8] == b"ftyp" {
        return match &data[8..12] {
            b"heic" | b"heix" | b"hevc" | b"hevx" => Some(SniffedFormat::Heic),
            b"mif1" | b"msf1" | b"heim" | b"heis" => Some(SniffedFormat::Heif),
            b"avif" | b"avis" => Some(SniffedFormat::Avif),
            _ => None,
        };
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ftyp(brand: &[u8; 4]) -> Vec<u8> {
        let mut buf = vec![0x00, 0x00, 0x00, 0x18];
        buf.extend_from_slice(b"ftyp");
        buf.extend_from_slice(brand);
        buf.extend_from_slice(&[0u8; 12]); // minor version + compatible brands
        buf
    }

    #[test]
    fn test_sniff_jpeg() {
        let mut buf = vec![0xFF, 0xD8, 0xFF, 0xE0];
        buf.extend_from_slice(&[0u8; 16]);
        assert_eq!(sniff_format(&buf), Some(SniffedFormat::Jpeg));
    }

    #[test]
    fn test_sniff_png() {
        let mut buf = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        buf.extend_from_slice(&[0u8; 16]);
        assert_eq!(sniff_format(&buf), Some(SniffedFormat::Png));
    }

    #[test]
    fn test_sniff_webp() {
        let mut buf = b"RIFF".to_vec();
        buf.extend_from_slice(&[0u8; 4]);
        buf.extend_from_slice(b"WEBP");
        buf.extend_from_slice(&[0u8; 8]);
        assert_eq!(sniff_format(&buf), Some(SniffedFormat::Webp));
    }

    #[test]
    fn test_sniff_heic_brands() {
        assert_eq!(sniff_format(&ftyp(b"heic")), Some(SniffedFormat::Heic));
        assert_eq!(sniff_format(&ftyp(b"heix")), Some(SniffedFormat::Heic));
        assert_eq!(sniff_format(&ftyp(b"mif1")), Some(SniffedFormat::Heif));
        assert_eq!(sniff_format(&ftyp(b"avif")), Some(SniffedFormat::Avif));
    }

    #[test]
    fn test_sniff_unknown_brand() {
        assert_eq!(sniff_format(&ftyp(b"mp42")), None);
    }

    #[test]
    fn test_sniff_text_is_unrecognized() {
        assert_eq!(sniff_format(b"this is definitely not an image"), None);
    }

    #[test]
    fn test_sniff_short_buffer() {
        assert_eq!(sniff_format(&[0xFF, 0xD8]), None);
    }
}
