//! The image operations the batch run drives, behind one trait.
//!
//! Every step returns its cause on failure and leaves the reporting to the
//! orchestrator, which decides whether a failure ends the image or only
//! the step. [`Imager`] is the production implementation.

use std::path::Path;

use fast_image_resize as fir;

use super::{cap, capabilities, derivative, orientation};
use crate::config::ImagingConfig;
use crate::domain::Capabilities;
use crate::error::Result;

pub trait ImageBackend {
    /// Which codecs are usable right now.
    fn capabilities(&self) -> Capabilities;

    /// Rotate a JPEG original in place. `Ok(true)` only if it was rewritten.
    fn correct_orientation(&mut self, path: &Path, ext: &str) -> Result<bool>;

    /// Downscale an oversized original in place. `Ok(true)` only if it was resized.
    fn cap_original(&mut self, path: &Path, ext: &str) -> Result<bool>;

    fn create_web_display(&mut self, src: &Path, dest: &Path) -> Result<()>;

    fn create_thumbnail(&mut self, src: &Path, dest: &Path) -> Result<()>;

    /// Release memory held over from earlier images.
    fn reclaim(&mut self) {}
}

/// Decodes with `image`, resamples with `fast_image_resize`, writes WebP
/// through libwebp.
pub struct Imager {
    config: ImagingConfig,
    resizer: fir::Resizer,
}

impl Imager {
    pub fn new(config: ImagingConfig) -> Self {
        Self {
            config,
            resizer: fir::Resizer::new(),
        }
    }
}

impl Default for Imager {
    fn default() -> Self {
        Self::new(ImagingConfig::default())
    }
}

impl ImageBackend for Imager {
    fn capabilities(&self) -> Capabilities {
        capabilities::probe()
    }

    fn correct_orientation(&mut self, path: &Path, ext: &str) -> Result<bool> {
        orientation::correct_orientation(path, ext, self.config.master_quality)
    }

    fn cap_original(&mut self, path: &Path, ext: &str) -> Result<bool> {
        cap::cap_original(
            &mut self.resizer,
            path,
            ext,
            self.config.max_pixels,
            self.config.master_quality,
        )
    }

    fn create_web_display(&mut self, src: &Path, dest: &Path) -> Result<()> {
        derivative::render_webp(
            &mut self.resizer,
            src,
            dest,
            self.config.web_max_dimension,
            self.config.web_quality,
        )
    }

    fn create_thumbnail(&mut self, src: &Path, dest: &Path) -> Result<()> {
        derivative::render_webp(
            &mut self.resizer,
            src,
            dest,
            self.config.thumb_max_dimension,
            self.config.thumb_quality,
        )
    }

    fn reclaim(&mut self) {
        // The resizer keeps its largest scratch buffers between calls.
        self.resizer = fir::Resizer::new();
    }
}
