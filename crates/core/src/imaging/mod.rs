pub mod backend;
pub mod calculations;
pub mod cap;
pub mod capabilities;
pub(crate) mod codec;
pub mod derivative;
pub mod format;
pub mod orientation;

pub use backend::{ImageBackend, Imager};
pub use format::{detect_format, extension_hint, sniff_file};
