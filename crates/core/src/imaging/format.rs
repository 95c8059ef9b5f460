//! Content sniffing.
//!
//! Every step that needs to know what a file really is goes through
//! [`detect_format`]; file names are only ever used as hints.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::domain::ImageFormat;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Bytes needed by [`detect_format`].
pub const SNIFF_LEN: usize = 12;

/// Identify the encoded format from the leading bytes of a file.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(JPEG_MAGIC) {
        Some(ImageFormat::Jpeg)
    } else if bytes.starts_with(PNG_MAGIC) {
        Some(ImageFormat::Png)
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some(ImageFormat::Webp)
    } else {
        None
    }
}

/// Read just enough of a file to sniff its format.
pub fn sniff_file(path: &Path) -> std::io::Result<Option<ImageFormat>> {
    let mut header = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut header)?;
    Ok(detect_format(&header))
}

/// Lower-cased extension with `jpeg` folded into `jpg`.
pub fn extension_hint(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if ext == "jpeg" {
        "jpg".to_string()
    } else {
        ext
    }
}
