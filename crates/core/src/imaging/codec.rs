//! Decode, resample, encode and write helpers shared by every rewrite.

use std::io::{Cursor, Write};
use std::path::Path;

use fast_image_resize::{self as fir, images::Image as FirImage};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, RgbImage, RgbaImage};

use crate::domain::ImageFormat;
use crate::error::{Error, Result};

pub(crate) fn decode(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage> {
    Ok(image::load_from_memory_with_format(
        bytes,
        format.to_image_format(),
    )?)
}

/// Resample to exactly `width` x `height` with a Lanczos3 convolution.
///
/// Images with an alpha channel are resized as RGBA so transparency survives;
/// everything else goes through RGB.
pub(crate) fn resample(
    resizer: &mut fir::Resizer,
    img: &DynamicImage,
    width: u32,
    height: u32,
) -> Result<DynamicImage> {
    let options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Lanczos3));

    if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        let src = FirImage::from_vec_u8(w, h, rgba.into_raw(), fir::PixelType::U8x4)?;
        let mut dst = FirImage::new(width, height, fir::PixelType::U8x4);
        resizer.resize(&src, &mut dst, &options)?;
        let out = RgbaImage::from_raw(width, height, dst.into_vec())
            .ok_or(fir::ImageBufferError::InvalidBufferSize)?;
        Ok(DynamicImage::ImageRgba8(out))
    } else {
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        let src = FirImage::from_vec_u8(w, h, rgb.into_raw(), fir::PixelType::U8x3)?;
        let mut dst = FirImage::new(width, height, fir::PixelType::U8x3);
        resizer.resize(&src, &mut dst, &options)?;
        let out = RgbImage::from_raw(width, height, dst.into_vec())
            .ok_or(fir::ImageBufferError::InvalidBufferSize)?;
        Ok(DynamicImage::ImageRgb8(out))
    }
}

/// Lossy WebP, keeping alpha when the image has it.
pub(crate) fn encode_webp(img: &DynamicImage, quality: u8, dest: &Path) -> Result<Vec<u8>> {
    let (w, h) = (img.width(), img.height());
    let encoded = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let encoder = webp::Encoder::from_rgba(rgba.as_raw(), w, h);
        encoder.encode_simple(false, quality as f32)
    } else {
        let rgb = img.to_rgb8();
        let encoder = webp::Encoder::from_rgb(rgb.as_raw(), w, h);
        encoder.encode_simple(false, quality as f32)
    };
    encoded
        .map(|memory| memory.to_vec())
        .map_err(|e| Error::Encode {
            path: dest.to_path_buf(),
            message: format!("{e:?}"),
        })
}

/// Encode in `format` at `quality`, for rewriting an original in its own format.
pub(crate) fn encode_as(
    img: &DynamicImage,
    format: ImageFormat,
    quality: u8,
    dest: &Path,
) -> Result<Vec<u8>> {
    match format {
        ImageFormat::Jpeg => {
            let mut buf = Cursor::new(Vec::new());
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            // JPEG has no alpha; flatten to RGB explicitly.
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
            Ok(buf.into_inner())
        }
        ImageFormat::Png => {
            let mut buf = Cursor::new(Vec::new());
            let encoder =
                PngEncoder::new_with_quality(&mut buf, png_compression(quality), FilterType::Adaptive);
            img.write_with_encoder(encoder)?;
            Ok(buf.into_inner())
        }
        ImageFormat::Webp => encode_webp(img, quality, dest),
    }
}

/// PNG is lossless, so quality only trades file size for encode time.
fn png_compression(quality: u8) -> CompressionType {
    match quality {
        90..=u8::MAX => CompressionType::Fast,
        50..=89 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// Replace `path` with `bytes` via a temp file in the same directory,
/// so readers never see a half-written file.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
