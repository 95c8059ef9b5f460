use std::fmt;
use std::path::{Path, PathBuf};

/// Raster formats the pipeline accepts, as identified from file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::Webp => "WebP",
        }
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Webp => image::ImageFormat::WebP,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded photograph as tracked by the catalog.
///
/// `web_path`, `thumbnail_path` and `processed_at` are either all set or all
/// `None`; the catalog never stores a partial combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub id: i64,
    /// Relative to the content root.
    pub original_path: PathBuf,
    pub web_path: Option<PathBuf>,
    pub thumbnail_path: Option<PathBuf>,
    /// Unix seconds (UTC).
    pub processed_at: Option<i64>,
}

impl SourceImage {
    pub fn is_processed(&self) -> bool {
        self.processed_at.is_some()
    }
}

/// Result of a runtime capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// JPEG/PNG/WebP decoding plus JPEG/PNG encoding.
    pub decode: bool,
    /// Lossy WebP encoding.
    pub webp: bool,
    /// EXIF orientation reading.
    pub exif: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            decode: true,
            webp: true,
            exif: true,
        }
    }

    /// First missing hard prerequisite, if any.
    pub fn missing_required(&self) -> Option<&'static str> {
        if !self.decode {
            Some("image decode/encode")
        } else if !self.webp {
            Some("WebP encoder")
        } else {
            None
        }
    }
}

/// The two standard renditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativeKind {
    WebDisplay,
    Thumbnail,
}

impl DerivativeKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            DerivativeKind::WebDisplay => "web_",
            DerivativeKind::Thumbnail => "thumb_",
        }
    }

    /// Sibling path of `original` for this rendition: `<dir>/<prefix><stem>.webp`.
    /// Works for both relative catalog paths and absolute filesystem paths.
    pub fn path_for(&self, original: &Path) -> PathBuf {
        let stem = original
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy();
        let file_name = format!("{}{}.webp", self.prefix(), stem);
        match original.parent() {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

/// Counters reported at the end of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub selected: usize,
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub reset: usize,
}

impl RunReport {
    pub fn seen(&self) -> usize {
        self.processed + self.failed + self.skipped
    }
}

/// How a batch run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Another instance holds the lock; nothing was touched.
    LockHeld,
    Completed(RunReport),
}

/// Catalog-wide counts for the status command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub processed: usize,
    pub pending: usize,
}
