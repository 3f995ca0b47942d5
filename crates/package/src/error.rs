//! Package Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A package error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for package operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The package bytes are malformed or use an unsupported layout.
    #[display("malformed package: {_0}")]
    Malformed(#[error(not(source))] String),
    /// An object reference points outside the import/export tables.
    #[display("invalid object reference: {_0}")]
    InvalidReference(#[error(not(source))] i32),
    /// A named object does not exist in the package.
    #[display("object not found: {_0}")]
    ObjectNotFound(#[error(not(source))] String),
    /// Raster data could not be converted into an image.
    #[display("unsupported texture: {_0}")]
    UnsupportedTexture(#[error(not(source))] String),
    /// Releasing the package's underlying resources failed.
    #[display("failed to close package")]
    Close,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Package bytes are immutable input; decoding them again yields the
        // same outcome.
        false
    }
}
