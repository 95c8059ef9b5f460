use std::path::{Path, PathBuf};

/// Size and quality settings for every rewrite and rendition.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagingConfig {
    /// Originals above this many pixels are downscaled in place.
    pub max_pixels: u64,
    /// Quality for in-place rewrites of originals (JPEG/WebP).
    pub master_quality: u8,
    pub web_max_dimension: u32,
    pub web_quality: u8,
    pub thumb_max_dimension: u32,
    pub thumb_quality: u8,
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self {
            max_pixels: 10_000_000,
            master_quality: 92,
            web_max_dimension: 2000,
            web_quality: 82,
            thumb_max_dimension: 400,
            thumb_quality: 78,
        }
    }
}

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Directory that `original_path` values are relative to.
    pub content_root: PathBuf,
    /// Advisory lock file shared by all instances.
    pub lock_path: PathBuf,
    /// Maximum images per run; `None` processes everything pending.
    pub limit: Option<usize>,
    /// Clear all derivative state before selecting.
    pub reprocess: bool,
    /// Run a memory reclamation pass after this many images.
    pub reclaim_every: usize,
    pub imaging: ImagingConfig,
}

impl PipelineConfig {
    pub const LOCK_FILE_NAME: &'static str = "process_images.lock";

    /// Defaults with the lock file placed beside the catalog.
    pub fn new(content_root: impl Into<PathBuf>, catalog_path: &Path) -> Self {
        let lock_dir = catalog_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        Self {
            content_root: content_root.into(),
            lock_path: lock_dir.join(Self::LOCK_FILE_NAME),
            limit: None,
            reprocess: false,
            reclaim_every: 10,
            imaging: ImagingConfig::default(),
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|&n| n > 0);
        self
    }

    pub fn with_reprocess(mut self, reprocess: bool) -> Self {
        self.reprocess = reprocess;
        self
    }

    pub fn with_lock_path(mut self, lock_path: impl Into<PathBuf>) -> Self {
        self.lock_path = lock_path.into();
        self
    }

    /// Absolute location of a catalog-relative path.
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.content_root.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_beside_catalog() {
        let config = PipelineConfig::new("/srv/uploads", Path::new("/var/lib/ip/catalog.db"));
        assert_eq!(
            config.lock_path,
            PathBuf::from("/var/lib/ip/process_images.lock")
        );
    }

    #[test]
    fn test_lock_for_bare_catalog_name() {
        let config = PipelineConfig::new(".", Path::new("catalog.db"));
        assert_eq!(config.lock_path, PathBuf::from("./process_images.lock"));
    }

    #[test]
    fn test_zero_limit_means_unbounded() {
        let config = PipelineConfig::new(".", Path::new("c.db")).with_limit(Some(0));
        assert_eq!(config.limit, None);
        let config = config.with_limit(Some(20));
        assert_eq!(config.limit, Some(20));
    }

    #[test]
    fn test_resolve_joins_content_root() {
        let config = PipelineConfig::new("/srv/uploads", Path::new("c.db"));
        assert_eq!(
            config.resolve(Path::new("sessions/5/photo.jpg")),
            PathBuf::from("/srv/uploads/sessions/5/photo.jpg")
        );
    }

    #[test]
    fn test_imaging_defaults() {
        let imaging = ImagingConfig::default();
        assert_eq!(imaging.max_pixels, 10_000_000);
        assert_eq!((imaging.web_max_dimension, imaging.web_quality), (2000, 82));
        assert_eq!((imaging.thumb_max_dimension, imaging.thumb_quality), (400, 78));
        assert_eq!(imaging.master_quality, 92);
    }
}
