use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use fast_image_resize as fir;

use super::calculations::cap_dimensions;
use super::codec;
use super::format::sniff_file;
use crate::error::{Error, Result};

/// Downscale an original in place if it holds more than `max_pixels` pixels.
///
/// Dimensions come from the header alone, so the common under-the-ceiling
/// case never decodes pixel data. The file is rewritten in its actual
/// (sniffed) format; `ext` only filters which files are considered.
pub fn cap_original(
    resizer: &mut fir::Resizer,
    path: &Path,
    ext: &str,
    max_pixels: u64,
    quality: u8,
) -> Result<bool> {
    if !matches!(ext, "jpg" | "png" | "webp") {
        return Ok(false);
    }

    let format = sniff_file(path)?.ok_or_else(|| Error::UnsupportedFormat(path.to_path_buf()))?;
    let (width, height) = image::ImageReader::with_format(
        BufReader::new(File::open(path)?),
        format.to_image_format(),
    )
    .into_dimensions()?;

    let Some((new_w, new_h)) = cap_dimensions(width, height, max_pixels) else {
        return Ok(false);
    };

    let bytes = std::fs::read(path)?;
    let img = codec::decode(&bytes, format)?;
    drop(bytes);

    let resized = codec::resample(resizer, &img, new_w, new_h)?;
    drop(img);

    let encoded = codec::encode_as(&resized, format, quality, path)?;
    codec::write_atomic(path, &encoded)?;
    tracing::debug!(
        "capped {} from {}x{} to {}x{}",
        path.display(),
        width,
        height,
        new_w,
        new_h
    );
    Ok(true)
}
