//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypesError {
    /// Color string is neither a hex code nor a known color name.
    #[error("invalid color: {0}")]
    InvalidColor(String),
    /// Value cannot be interpreted as a layer source.
    #[error("unsupported source type: {0}")]
    UnsupportedSource(String),
    /// Geometry conversion error.
    #[error("invalid input geometry: {0}")]
    Conversion(String),
}
