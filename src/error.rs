//! Error types shared by all mappings.

use thiserror::Error;

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, MappingError>;

/// Errors that can occur while constructing or applying a mapping.
#[derive(Debug, Error)]
pub enum MappingError {
    /// A constructor argument or attribute assignment was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The inverse transformation was requested but is not defined.
    #[error("{0} has no inverse transformation")]
    NotInvertible(&'static str),

    /// The forward transformation was requested but is not defined.
    #[error("{0} has no forward transformation")]
    NoForward(&'static str),

    /// A mapping handle holds a different kind of mapping than requested.
    #[error("this is a {found}, which is not a {expected}")]
    TypeMismatch {
        /// Requested kind.
        expected: &'static str,
        /// Actual kind.
        found: &'static str,
    },

    /// Number of coordinates does not match the mapping.
    #[error("expected {expected} coordinates, found {found}")]
    DimensionMismatch {
        /// Number of coordinates the mapping works on.
        expected: usize,
        /// Number of coordinates supplied.
        found: usize,
    },

    /// Assembling a batch of transformed points failed.
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl MappingError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
