//! Elements drawn by a figure.

use geo_types::Coord;
use image::RgbaImage;
use mapforge_types::{Color, Rect};

use super::style::LineStyle;
use crate::render::PointShape;

/// Default drawing order of polygons and markers.
pub const PATCH_ZORDER: f64 = 1.0;
/// Default drawing order of lines.
pub const LINE_ZORDER: f64 = 2.0;
/// Default drawing order of raster images.
pub const IMAGE_ZORDER: f64 = 0.0;
/// Grid lines are drawn between patches and lines.
pub const GRID_ZORDER: f64 = 1.5;

/// Drawable element of a figure, in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtistKind {
    /// Filled polygon with optional outline.
    Polygon {
        /// Exterior ring followed by the holes.
        rings: Vec<Vec<Coord<f64>>>,
        /// Fill color.
        face: Color,
        /// Outline.
        edge: Option<Stroke>,
    },
    /// Polyline.
    Line {
        /// Vertices in drawing order.
        points: Vec<Coord<f64>>,
        /// Line style.
        stroke: Stroke,
    },
    /// Point marker.
    Marker {
        /// Marker center.
        position: Coord<f64>,
        /// Fill color.
        color: Color,
        /// Diameter in points.
        size: f64,
        /// Marker shape.
        shape: PointShape,
        /// Outline.
        edge: Option<Stroke>,
    },
    /// Raster image stretched over a data extent.
    Image {
        /// Colored raster pixels.
        image: RgbaImage,
        /// Covered data extent.
        extent: Rect,
    },
}

/// Outline style in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Line color.
    pub color: Color,
    /// Width in points.
    pub width: f64,
    /// Dash pattern.
    pub line_style: LineStyle,
}

/// Drawable element with its drawing order.
#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    /// What is drawn.
    pub kind: ArtistKind,
    /// Artists with lower values are drawn first.
    pub zorder: f64,
}

impl Artist {
    /// Data extent covered by the artist.
    pub fn bounds(&self) -> Option<Rect> {
        match &self.kind {
            ArtistKind::Polygon { rings, .. } => {
                Rect::from_points(rings.iter().flat_map(|ring| ring.iter().copied()))
            }
            ArtistKind::Line { points, .. } => Rect::from_points(points.iter().copied()),
            ArtistKind::Marker { position, .. } => Rect::from_points([*position]),
            ArtistKind::Image { extent, .. } => Some(*extent),
        }
    }
}

/// Sample shown next to a label in the legend.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleKind {
    /// Filled rectangle.
    Patch { face: Color, edge: Option<Stroke> },
    /// Short line segment.
    Line { stroke: Stroke },
    /// Single marker.
    Marker { color: Color, shape: PointShape },
}

/// Legend entry collected by the figure while drawing labelled layers.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendHandle {
    /// Label text.
    pub label: String,
    /// Sample drawn next to the label.
    pub kind: HandleKind,
}
