//! Content sniffing for the file viewer.
//!
//! Classification looks at the bytes only; the file extension is never
//! consulted.

use super::types::{ContentKind, ImageFormat};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Detect an image format from its magic bytes.
pub fn detect_image(data: &[u8]) -> Option<ImageFormat> {
    if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some(ImageFormat::Png)
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageFormat::Jpeg)
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some(ImageFormat::Gif)
    } else if is_bmp(data) {
        Some(ImageFormat::Bmp)
    } else if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        Some(ImageFormat::WebP)
    } else if data.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        Some(ImageFormat::Ico)
    } else if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
        Some(ImageFormat::Tiff)
    } else {
        None
    }
}

/// Known BITMAPINFOHEADER family sizes (core, v1 through v5).
const BMP_DIB_HEADER_SIZES: [u32; 7] = [12, 40, 52, 56, 64, 108, 124];

/// A "BM" prefix counts only when the file header agrees with the data.
fn is_bmp(data: &[u8]) -> bool {
    if data.len() < 18 || !data.starts_with(b"BM") {
        return false;
    }
    let le_u32 = |at: usize| u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);

    let file_size = le_u32(2) as usize;
    let reserved = le_u32(6);
    let pixel_offset = le_u32(10) as usize;
    let dib_size = le_u32(14);

    file_size == data.len()
        && reserved == 0
        && BMP_DIB_HEADER_SIZES.contains(&dib_size)
        && pixel_offset >= 14 + dib_size as usize
        && pixel_offset <= data.len()
}

/// Classify `data` as an image, text (valid UTF-8 without NUL bytes), or other.
pub fn classify(data: &[u8]) -> ContentKind {
    if let Some(format) = detect_image(data) {
        return ContentKind::Image(format);
    }
    match std::str::from_utf8(data) {
        Ok(text) if !text.contains('\0') => ContentKind::Text,
        _ => ContentKind::Other,
    }
}

/// Number of newline-terminated lines.
pub fn count_lines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

pub fn data_uri(format: ImageFormat, data: &[u8]) -> String {
    format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(data))
}

/// Sniffed view of a file's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SniffedContent {
    pub kind: ContentKind,
    pub lines: usize,
    pub text: Option<String>,
    pub data_uri: Option<String>,
}

pub fn sniff(data: Vec<u8>) -> SniffedContent {
    match classify(&data) {
        ContentKind::Image(format) => SniffedContent {
            kind: ContentKind::Image(format),
            lines: 0,
            text: None,
            data_uri: Some(data_uri(format, &data)),
        },
        ContentKind::Text => {
            // `classify` already checked the bytes are UTF-8.
            let text = String::from_utf8(data).unwrap_or_default();
            SniffedContent {
                kind: ContentKind::Text,
                lines: count_lines(&text),
                text: Some(text),
                data_uri: None,
            }
        }
        ContentKind::Other => SniffedContent {
            kind: ContentKind::Other,
            lines: 0,
            text: None,
            data_uri: None,
        },
    }
}
