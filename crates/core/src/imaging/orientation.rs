//! EXIF orientation correction for JPEG originals.
//!
//! Orientations:
//! 1: Normal                    5: Mirror + rotate 90° CW
//! 2: Mirror horizontal         6: Rotate 90° CW
//! 3: Rotate 180°               7: Mirror + rotate 90° CCW
//! 4: Mirror vertical           8: Rotate 90° CCW
//!
//! Only the pure rotations (3, 6, 8) are applied. Mirrored values (2, 4, 5, 7)
//! leave the file untouched.

use std::path::Path;

use image::DynamicImage;

use super::codec;
use super::format::detect_format;
use crate::domain::ImageFormat;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Cw90,
    Cw180,
    Ccw90,
}

impl Rotation {
    /// Rotation that undoes an EXIF orientation value, if it is a pure rotation.
    pub fn for_orientation(orientation: u32) -> Option<Self> {
        match orientation {
            3 => Some(Rotation::Cw180),
            6 => Some(Rotation::Cw90),
            8 => Some(Rotation::Ccw90),
            _ => None,
        }
    }

    pub fn apply(self, img: &DynamicImage) -> DynamicImage {
        match self {
            Rotation::Cw90 => img.rotate90(),
            Rotation::Cw180 => img.rotate180(),
            Rotation::Ccw90 => img.rotate270(),
        }
    }
}

/// Read the EXIF orientation tag. `None` if missing or unreadable.
#[cfg(feature = "exif")]
pub fn read_orientation(path: &Path) -> Option<u32> {
    let read = || -> Result<Option<u32>> {
        let file = std::fs::File::open(path)?;
        let mut reader = std::io::BufReader::new(file);
        let exif = exif::Reader::new().read_from_container(&mut reader)?;
        Ok(exif
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0)))
    };
    read().ok().flatten()
}

#[cfg(not(feature = "exif"))]
pub fn read_orientation(_path: &Path) -> Option<u32> {
    None
}

/// Rotate a JPEG in place so its pixels match the tagged orientation.
///
/// The JPEG encoder writes no EXIF block, so the rewritten file has no
/// orientation tag left. Returns `Ok(true)` only when the file was rewritten.
pub fn correct_orientation(path: &Path, ext: &str, quality: u8) -> Result<bool> {
    if ext != "jpg" {
        return Ok(false);
    }
    let Some(orientation) = read_orientation(path) else {
        return Ok(false);
    };
    let Some(rotation) = Rotation::for_orientation(orientation) else {
        if orientation != 1 {
            tracing::debug!(
                "orientation {} of {} is mirrored or unknown, leaving as-is",
                orientation,
                path.display()
            );
        }
        return Ok(false);
    };

    let bytes = std::fs::read(path)?;
    if detect_format(&bytes) != Some(ImageFormat::Jpeg) {
        return Ok(false);
    }
    let img = codec::decode(&bytes, ImageFormat::Jpeg)?;
    drop(bytes);

    let rotated = rotation.apply(&img);
    drop(img);

    let encoded = codec::encode_as(&rotated, ImageFormat::Jpeg, quality, path)?;
    codec::write_atomic(path, &encoded)?;
    Ok(true)
}

#[cfg(all(test, feature = "exif"))]
mod tests {
    use super::*;
    use crate::test_helpers::{jpeg_with_orientation, marker_image};

    #[test]
    fn test_rotation_mapping() {
        assert_eq!(Rotation::for_orientation(1), None);
        assert_eq!(Rotation::for_orientation(3), Some(Rotation::Cw180));
        assert_eq!(Rotation::for_orientation(6), Some(Rotation::Cw90));
        assert_eq!(Rotation::for_orientation(8), Some(Rotation::Ccw90));
        for mirrored in [2, 4, 5, 7] {
            assert_eq!(Rotation::for_orientation(mirrored), None);
        }
        assert_eq!(Rotation::for_orientation(0), None);
        assert_eq!(Rotation::for_orientation(9), None);
    }

    #[test]
    fn test_read_orientation_from_fixture() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tagged.jpg");
        std::fs::write(&path, jpeg_with_orientation(&marker_image(30, 20), 6)).unwrap();
        assert_eq!(read_orientation(&path), Some(6));
    }

    #[test]
    fn test_read_orientation_untagged() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("plain.jpg");
        marker_image(30, 20).save(&path).unwrap();
        assert_eq!(read_orientation(&path), None);
    }

    #[test]
    fn test_rotate_90_cw_rewrites_without_tag() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("phone.jpg");
        std::fs::write(&path, jpeg_with_orientation(&marker_image(60, 40), 6)).unwrap();

        assert!(correct_orientation(&path, "jpg", 92).unwrap());

        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (40, 60));
        assert_eq!(read_orientation(&path), None);
    }

    #[test]
    fn test_rotate_180_keeps_dimensions() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("upside.jpg");
        std::fs::write(&path, jpeg_with_orientation(&marker_image(60, 40), 3)).unwrap();

        assert!(correct_orientation(&path, "jpg", 92).unwrap());
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (60, 40));
    }

    #[test]
    fn test_rotate_90_ccw_moves_marker() {
        // The marker block sits in the top-left corner. Undoing orientation 8
        // rotates counter-clockwise, which moves it to the bottom-left.
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ccw.jpg");
        std::fs::write(&path, jpeg_with_orientation(&marker_image(60, 40), 8)).unwrap();

        assert!(correct_orientation(&path, "jpg", 92).unwrap());
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (40, 60));
        assert!(img.get_pixel(2, 57)[0] > 200, "marker not at bottom-left");
        assert!(img.get_pixel(2, 2)[0] < 60);
    }

    #[test]
    fn test_normal_orientation_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("normal.jpg");
        let bytes = jpeg_with_orientation(&marker_image(30, 20), 1);
        std::fs::write(&path, &bytes).unwrap();

        assert!(!correct_orientation(&path, "jpg", 92).unwrap());
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_mirrored_orientations_byte_for_byte_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        for orientation in [2, 4, 5, 7] {
            let path = tmp.path().join(format!("mirror_{orientation}.jpg"));
            let bytes = jpeg_with_orientation(&marker_image(30, 20), orientation);
            std::fs::write(&path, &bytes).unwrap();

            assert!(!correct_orientation(&path, "jpg", 92).unwrap());
            assert_eq!(std::fs::read(&path).unwrap(), bytes, "orientation {orientation}");
        }
    }

    #[test]
    fn test_non_jpeg_extension_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tagged.png");
        let bytes = jpeg_with_orientation(&marker_image(30, 20), 6);
        std::fs::write(&path, &bytes).unwrap();

        assert!(!correct_orientation(&path, "png", 92).unwrap());
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_missing_file_is_no_change() {
        assert!(!correct_orientation(Path::new("/nonexistent/a.jpg"), "jpg", 92).unwrap());
    }
}
