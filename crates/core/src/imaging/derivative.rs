use std::path::Path;

use fast_image_resize as fir;

use super::calculations::fit_within;
use super::codec;
use super::format::detect_format;
use crate::error::{Error, Result};

/// Render `src` as a lossy WebP no larger than `max_dimension` on its
/// longest side and write it atomically to `dest`.
///
/// The source format is taken from its content, not its extension. Sources
/// already within the bound keep their dimensions.
pub fn render_webp(
    resizer: &mut fir::Resizer,
    src: &Path,
    dest: &Path,
    max_dimension: u32,
    quality: u8,
) -> Result<()> {
    let bytes = std::fs::read(src)?;
    let format = detect_format(&bytes).ok_or_else(|| Error::UnsupportedFormat(src.to_path_buf()))?;
    let img = codec::decode(&bytes, format)?;
    drop(bytes);

    let (width, height) = (img.width(), img.height());
    let (target_w, target_h) = fit_within(width, height, max_dimension);
    let img = if (target_w, target_h) == (width, height) {
        img
    } else {
        codec::resample(resizer, &img, target_w, target_h)?
    };

    let encoded = codec::encode_webp(&img, quality, dest)?;
    codec::write_atomic(dest, &encoded)
}
