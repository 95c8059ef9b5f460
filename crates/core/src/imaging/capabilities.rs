use crate::domain::Capabilities;

/// Check which codecs this build can actually use.
///
/// WebP encoding is verified by encoding a single pixel rather than trusted
/// from the build configuration.
pub fn probe() -> Capabilities {
    let decode = image::ImageFormat::Jpeg.reading_enabled()
        && image::ImageFormat::Jpeg.writing_enabled()
        && image::ImageFormat::Png.reading_enabled()
        && image::ImageFormat::Png.writing_enabled()
        && image::ImageFormat::WebP.reading_enabled();

    Capabilities {
        decode,
        webp: webp_encoder_works(),
        exif: cfg!(feature = "exif"),
    }
}

fn webp_encoder_works() -> bool {
    let pixel = [255u8, 255, 255];
    let encoder = webp::Encoder::from_rgb(&pixel, 1, 1);
    match encoder.encode_simple(false, 75.0) {
        Ok(memory) => !memory.is_empty(),
        Err(e) => {
            tracing::debug!("WebP probe encode failed: {:?}", e);
            false
        }
    }
}
