//! Unified error type for EMF parsing and rendering.
use thiserror::Error;

/// Main error type for metafile operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Structurally invalid input: truncated stream, bad signature,
    /// inconsistent offsets, invalid record sizes.
    #[error("malformed metafile: {0}")]
    Malformed(String),

    /// A capability the interpreter does not provide.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Raster encoding error
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for metafile operations.
pub type Result<T> = std::result::Result<T, Error>;
