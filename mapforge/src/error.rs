//! Error types used by the crate.

use std::path::PathBuf;

use mapforge_types::TypesError;
use thiserror::Error;

/// Error of a map rendering call.
///
/// Every variant aborts the whole call. Entry points in [`crate::tools`] turn it into an error
/// [`MapOutput`](mapforge_types::MapOutput) using its `Display` text.
#[derive(Debug, Error)]
pub enum MapError {
    /// Layer data is not one of the supported source shapes for the selected renderer.
    #[error("unsupported source type: {0}")]
    UnsupportedSourceType(String),
    /// Well-known-text could not be parsed.
    #[error("malformed geometry text: {0}")]
    MalformedGeometryText(String),
    /// Vector or raster file could not be decoded.
    #[error("failed to decode {}: {reason}", path.display())]
    DecodeFailure {
        /// Decoded file.
        path: PathBuf,
        /// Error reported by the decoder.
        reason: String,
    },
    /// Style option was not accepted by the renderer.
    #[error("style rejected: {0}")]
    StyleRejected(String),
    /// Output directory or file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailure {
        /// Path of the directory or file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Requested static output format is unknown.
    #[error("unsupported output format: {0}")]
    UnsupportedOutputFormat(String),
    /// Requested basemap is neither a known provider nor a tile URL template.
    #[error("unsupported basemap: {0}")]
    UnsupportedBasemap(String),
    /// Failed to encode the output document.
    #[error("failed to encode output: {0}")]
    Encode(String),
}

impl MapError {
    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DecodeFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<TypesError> for MapError {
    fn from(value: TypesError) -> Self {
        match value {
            TypesError::InvalidColor(_) => Self::StyleRejected(value.to_string()),
            TypesError::UnsupportedSource(v) => Self::UnsupportedSourceType(v),
            TypesError::Conversion(v) => Self::MalformedGeometryText(v),
        }
    }
}

impl From<image::ImageError> for MapError {
    fn from(value: image::ImageError) -> Self {
        Self::Encode(value.to_string())
    }
}
