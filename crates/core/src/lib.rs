pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
mod fault;
pub mod imaging;
pub mod lock;

#[cfg(test)]
mod test_helpers;

use std::path::Path;

use catalog::Catalog;
use config::PipelineConfig;
use domain::*;
use error::{Error, Result};
use imaging::{extension_hint, ImageBackend, Imager};
use lock::RunLock;

/// Per-image result inside a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Processed,
    Failed,
    Skipped,
}

/// The main entry point: a catalog plus the image operations that fill it in.
pub struct Pipeline<B: ImageBackend = Imager> {
    catalog: Catalog,
    config: PipelineConfig,
    backend: B,
    /// What the current image is doing, reported if it faults.
    stage: &'static str,
}

impl Pipeline<Imager> {
    /// Open or create the catalog at `catalog_path` with the production backend.
    pub fn open(catalog_path: &Path, config: PipelineConfig) -> Result<Self> {
        let catalog = Catalog::open(catalog_path)?;
        let backend = Imager::new(config.imaging.clone());
        Ok(Self::with_backend(catalog, config, backend))
    }
}

impl<B: ImageBackend> Pipeline<B> {
    pub fn with_backend(catalog: Catalog, config: PipelineConfig, backend: B) -> Self {
        Self {
            catalog,
            config,
            backend,
            stage: "idle",
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn capabilities(&self) -> Capabilities {
        self.backend.capabilities()
    }

    pub fn status(&self) -> Result<CatalogStats> {
        self.catalog.stats()
    }

    /// Add a catalog record for an original already stored under the content root.
    pub fn register(&self, relative: &Path) -> Result<SourceImage> {
        if !self.config.resolve(relative).is_file() {
            return Err(Error::SourceNotFound(relative.to_path_buf()));
        }
        self.catalog.insert_image(relative)
    }

    /// One batch run: lock, probe, select, then process each image in id order.
    ///
    /// Per-image problems are counted in the report and never end the run.
    /// Only a missing required codec or an unusable catalog/lock returns `Err`.
    pub fn run(&mut self) -> Result<RunOutcome> {
        let Some(lock) = RunLock::try_acquire(&self.config.lock_path)? else {
            tracing::debug!(
                "{} is held by another run, nothing to do",
                self.config.lock_path.display()
            );
            return Ok(RunOutcome::LockHeld);
        };
        tracing::debug!("acquired {}", lock.path().display());

        let caps = self.backend.capabilities();
        if let Some(missing) = caps.missing_required() {
            tracing::error!(
                "FATAL: {} is not available. {}",
                missing,
                remediation_hint(missing)
            );
            return Err(Error::MissingCapability(missing));
        }
        if !caps.exif {
            tracing::warn!(
                "WARNING: EXIF reader not available. Phone photos may remain rotated. \
                 Build with the `exif` feature to enable orientation correction."
            );
        }

        let mut report = RunReport::default();
        if self.config.reprocess {
            report.reset = self.catalog.reset_all()?;
            tracing::info!("Reset all images for reprocessing.");
        }

        let images = self.catalog.list_unprocessed(self.config.limit)?;
        report.selected = images.len();
        if images.is_empty() {
            tracing::info!("No images to process.");
            return Ok(RunOutcome::Completed(report));
        }
        tracing::info!("{} image(s) to process.", images.len());

        for image in &images {
            let result = fault::catch(|| self.process_one(image, caps.exif));
            let step = match result {
                Ok(Ok(step)) => step,
                Ok(Err(e)) => {
                    tracing::error!(
                        "ERROR #{}: {} (file: {}, during {})",
                        image.id,
                        e,
                        image.original_path.display(),
                        self.stage
                    );
                    Step::Failed
                }
                Err(fault) => {
                    tracing::error!(
                        "ERROR #{}: panic: {} (file: {}, during {})",
                        image.id,
                        fault,
                        image.original_path.display(),
                        self.stage
                    );
                    Step::Failed
                }
            };
            match step {
                Step::Processed => report.processed += 1,
                Step::Failed => report.failed += 1,
                Step::Skipped => report.skipped += 1,
            }

            if self.config.reclaim_every > 0 && report.seen() % self.config.reclaim_every == 0 {
                self.reclaim(report.seen());
            }
        }

        tracing::info!(
            "Done: {} processed, {} failed, {} skipped.",
            report.processed,
            report.failed,
            report.skipped
        );
        drop(lock);
        Ok(RunOutcome::Completed(report))
    }

    fn process_one(&mut self, image: &SourceImage, exif: bool) -> Result<Step> {
        let id = image.id;
        self.stage = "source check";
        let original = self.config.resolve(&image.original_path);
        if !original.is_file() {
            tracing::warn!(
                "SKIP #{}: source file missing ({})",
                id,
                original.display()
            );
            return Ok(Step::Skipped);
        }
        let ext = extension_hint(&original);

        if exif {
            self.stage = "orientation correction";
            match self.backend.correct_orientation(&original, &ext) {
                Ok(true) => tracing::info!("#{}: EXIF rotation corrected", id),
                Ok(false) => {}
                Err(e) => tracing::warn!("#{}: orientation correction failed: {}", id, e),
            }
        }

        self.stage = "pixel cap";
        match self.backend.cap_original(&original, &ext) {
            Ok(true) => tracing::info!(
                "#{}: Original capped at ~{}MP",
                id,
                self.config.imaging.max_pixels / 1_000_000
            ),
            Ok(false) => {}
            Err(e) => tracing::warn!("#{}: pixel cap failed: {}", id, e),
        }

        let web_path = DerivativeKind::WebDisplay.path_for(&image.original_path);
        let thumb_path = DerivativeKind::Thumbnail.path_for(&image.original_path);
        let web_file = self.config.resolve(&web_path);
        let thumb_file = self.config.resolve(&thumb_path);

        self.stage = "web display";
        if let Err(e) = self.backend.create_web_display(&original, &web_file) {
            tracing::warn!(
                "FAIL #{}: web display generation failed for {}: {}. The file exists and \
                 passed the earlier steps, so it is likely corrupt or not a supported format.",
                id,
                image.original_path.display(),
                e
            );
            return Ok(Step::Failed);
        }

        self.stage = "thumbnail";
        if let Err(from_web) = self.backend.create_thumbnail(&web_file, &thumb_file) {
            tracing::info!(
                "#{}: Thumb from web failed ({}), trying from original...",
                id,
                from_web
            );
            if let Err(from_original) = self.backend.create_thumbnail(&original, &thumb_file) {
                tracing::warn!(
                    "FAIL #{}: thumbnail generation failed for {} from both web ({}) and original ({})",
                    id,
                    image.original_path.display(),
                    from_web,
                    from_original
                );
                return Ok(Step::Failed);
            }
        }

        self.stage = "catalog commit";
        self.catalog
            .mark_processed(id, &web_path, &thumb_path, chrono::Utc::now().timestamp())?;
        tracing::info!(
            "OK #{}: web={} thumb={}",
            id,
            web_path.display(),
            thumb_path.display()
        );
        Ok(Step::Processed)
    }

    fn reclaim(&mut self, seen: usize) {
        self.backend.reclaim();
        if let Err(e) = self.catalog.shrink_memory() {
            tracing::debug!("catalog memory release failed: {}", e);
        }
        tracing::debug!("reclaimed memory after {} images", seen);
    }
}

fn remediation_hint(missing: &str) -> &'static str {
    match missing {
        "WebP encoder" => "Rebuild with libwebp support (the `webp` crate) to write derivatives.",
        _ => "Rebuild with the `image` crate's jpeg, png and webp features enabled.",
    }
}
