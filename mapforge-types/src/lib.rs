//! Data model shared by the `mapforge` renderers.
//!
//! Everything a caller hands to a renderer is described here: the [`LayerDescription`] with its
//! [`LayerSource`] and [`StyleOptions`], the in-memory [`VectorDataset`] and the [`MapOutput`]
//! record every entry point returns. Types in this crate do no I/O.

pub mod color;
pub mod dataset;
pub mod error;
pub mod layer;
pub mod output;
pub mod rect;
pub mod source;
pub mod style;

pub use color::Color;
pub use dataset::{AttributeValue, Feature, VectorDataset};
pub use error::TypesError;
pub use layer::LayerDescription;
pub use output::{MapOutput, MapStatus};
pub use rect::Rect;
pub use source::{is_raster_path, is_vector_path, LayerSource, RASTER_SUFFIXES, VECTOR_SUFFIXES};
pub use style::StyleOptions;

// Reexport geo_types
pub use geo_types;
