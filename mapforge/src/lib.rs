//! Mapforge renders maps from heterogeneous geospatial inputs: vector files (shapefile,
//! GeoJSON), GeoTIFF rasters, well-known-text strings, raw coordinate lists and already decoded
//! vector datasets.
//!
//! # Quick start
//!
//! ```no_run
//! use mapforge::static_map::StaticMapRequest;
//! use mapforge::tools::create_map;
//! use mapforge_types::{LayerDescription, StyleOptions};
//!
//! let request = StaticMapRequest::new(vec![
//!     LayerDescription::new("data/rivers.shp").with_style(StyleOptions::new().with_label("Rivers")),
//!     LayerDescription::new("POINT (30 10)").with_style(StyleOptions::new().with_color("red")),
//! ])
//! .with_title("Rivers");
//!
//! let output = create_map(&request);
//! println!("{}", output.message);
//! ```
//!
//! # Main components
//!
//! Every layer goes through the same pipeline:
//!
//! * the [resolver](resolver) turns the [`LayerSource`](mapforge_types::LayerSource) of the layer
//!   into a geometry, a vector dataset or a raster, reading files through a
//!   [`DataLoader`](loader::DataLoader);
//! * a renderer draws the resolved layers. The [static renderer](static_map) plots them into a
//!   [`Figure`](figure::Figure) and encodes it as PNG, JPEG or SVG. The
//!   [interactive renderer](web_map) adds them as toggleable overlays of a
//!   [`WebMapDocument`](web_map::WebMapDocument) and writes a Leaflet page;
//! * the result of the call is reported as a [`MapOutput`](mapforge_types::MapOutput).
//!
//! A call either writes its output file completely or returns an error and writes nothing.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod error;
pub mod figure;
pub mod loader;
pub mod raster;
pub mod render;
pub mod resolver;
pub mod static_map;
pub mod tools;
pub mod view;
pub mod web_map;

pub use error::MapError;
pub use static_map::{render_static, StaticMapOptions, StaticMapRequest};
pub use tools::{create_map, create_web_map};
pub use web_map::{render_interactive, WebMapOptions, WebMapRequest};

// Reexport mapforge_types
pub use mapforge_types;
