//! Defines [`ShpError`], representing all errors returned by this crate.

use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
///
/// Decoding a [Null shape](crate::ShapeType::Null) is not an error: it yields
/// [`Geometry::Null`](crate::Geometry::Null).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ShpError {
    /// The file or a record violates the shapefile binary layout, for example
    /// an unknown shape-type code or a record whose declared type conflicts
    /// with the file-level type. Fatal and non-retriable.
    #[error("Invalid shapefile: {0}")]
    Format(String),

    /// Fewer bytes remain than a header or payload declares. Fatal; the
    /// reader's sequential position is undefined afterwards.
    #[error("Truncated shapefile: {0}")]
    Truncated(String),

    /// The operation cannot be performed with this reader configuration,
    /// for example moving backwards on a forward-only byte source. Caller
    /// misuse, not data corruption.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// [std::io::Error]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, ShpError>;
