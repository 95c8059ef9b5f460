use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[cfg(feature = "exif")]
    #[error("EXIF parsing error: {0}")]
    Exif(#[from] exif::Error),

    #[error("resize error: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    #[error("pixel buffer error: {0}")]
    PixelBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("failed to encode {}: {message}", .path.display())]
    Encode { path: PathBuf, message: String },

    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("source file does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("image not found in catalog: {0}")]
    ImageNotFound(i64),

    #[error("required capability unavailable: {0}")]
    MissingCapability(&'static str),

    #[error("catalog schema version {db} is newer than this build supports ({code})")]
    SchemaTooNew { db: u32, code: u32 },

    #[error("catalog schema version is not a number: {0:?}")]
    InvalidSchemaVersion(String),
}

pub type Result<T> = std::result::Result<T, Error>;
