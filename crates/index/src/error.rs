//! Indexing Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Most failures inside a submission are recorded in the
//! [`IndexLog`](crate::IndexLog) instead of being returned; only the kinds
//! below ever cross a step boundary.

use derive_more::{Display, Error};

/// An indexing error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for indexing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The submission archive could not be read or unpacked.
    #[display("unreadable submission archive")]
    Archive,
    /// A package or one of its objects could not be decoded.
    #[display("failed to decode package data")]
    Decode,
    /// A structure the content type requires is missing.
    #[display("missing required structure: {_0}")]
    MissingStructure(#[error(not(source))] &'static str),
    /// A cross-package reference could not be followed.
    #[display("failed to resolve reference: {_0}")]
    ReferenceResolution(#[error(not(source))] String),
    /// Image data could not be decoded or encoded.
    #[display("image conversion failed")]
    Image,
    /// Writing an attachment failed.
    #[display("I/O error")]
    Io,
    /// The attachment path template is invalid or rendered an unusable path.
    #[display("issue with path generation from template")]
    Template,
    /// Configuration could not be applied.
    #[display("invalid configuration")]
    Config,
    /// A background indexing task panicked or was cancelled.
    #[display("indexing task did not complete")]
    Task,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io | ErrorKind::Task)
    }
}
