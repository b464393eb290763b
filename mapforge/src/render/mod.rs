//! Drawing backends of the static renderer.
//!
//! A [`Canvas`] receives already projected primitives in pixel coordinates (y axis pointing
//! down). The figure decides what to draw and where, backends only decide how.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use image::RgbaImage;
use mapforge_types::{Color, Rect};
use nalgebra::Point2;

use crate::error::MapError;

mod raster_canvas;
mod svg;
mod tessellation;
pub mod text;

pub use raster_canvas::RasterCanvas;
pub use svg::SvgCanvas;

/// Drawing surface in pixel coordinates.
pub trait Canvas {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Restricts the following draw calls to the rectangle. `None` removes the restriction.
    fn set_clip(&mut self, clip: Option<Rect>);

    /// Fills the rectangle and strokes its outline with the edge paint.
    fn fill_rect(&mut self, rect: Rect, paint: &Paint);

    /// Fills the area inside `rings` with the even-odd rule, then strokes every ring with the
    /// edge paint.
    fn draw_polygon(&mut self, rings: &[Vec<Point2<f64>>], paint: &Paint);

    /// Strokes the polyline.
    fn draw_line(&mut self, points: &[Point2<f64>], paint: &LinePaint);

    /// Draws a marker centered at `position`.
    fn draw_point(&mut self, position: Point2<f64>, paint: &PointPaint);

    /// Draws the image stretched over `bbox`.
    fn draw_image(&mut self, image: &RgbaImage, bbox: Rect) -> Result<(), MapError>;

    /// Draws a single line of text.
    fn draw_text(&mut self, text: &text::PlacedText);
}

/// Fill of an area with an optional outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    /// Fill color.
    pub color: Color,
    /// Outline.
    pub edge: Option<LinePaint>,
}

impl Paint {
    /// Fill without outline.
    pub fn fill(color: Color) -> Self {
        Self { color, edge: None }
    }

    /// Sets the outline.
    pub fn with_edge(mut self, edge: LinePaint) -> Self {
        self.edge = Some(edge);
        self
    }
}

/// Stroke style.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePaint {
    /// Line color.
    pub color: Color,
    /// Width in pixels.
    pub width: f64,
    /// Alternating dash and gap lengths in pixels. `None` draws a solid line.
    pub dash: Option<Vec<f64>>,
    /// Shape of line ends.
    pub line_cap: LineCap,
}

impl LinePaint {
    /// Solid line with round caps.
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
            line_cap: LineCap::Butt,
        }
    }

    /// Sets the dash pattern.
    pub fn with_dash(mut self, dash: Option<Vec<f64>>) -> Self {
        self.dash = dash;
        self
    }

    /// Sets the line cap.
    pub fn with_line_cap(mut self, line_cap: LineCap) -> Self {
        self.line_cap = line_cap;
        self
    }
}

/// Shape of line ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    /// Half circle.
    Round,
    /// Flat end at the last vertex.
    Butt,
    /// Flat end extended by half the width.
    Square,
}

impl From<LineCap> for lyon::tessellation::LineCap {
    fn from(value: LineCap) -> Self {
        match value {
            LineCap::Round => lyon::tessellation::LineCap::Round,
            LineCap::Butt => lyon::tessellation::LineCap::Butt,
            LineCap::Square => lyon::tessellation::LineCap::Square,
        }
    }
}

impl LineCap {
    fn svg_name(&self) -> &'static str {
        match self {
            LineCap::Round => "round",
            LineCap::Butt => "butt",
            LineCap::Square => "square",
        }
    }
}

/// Shape of a point marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointShape {
    /// Circle.
    Circle,
    /// Axis aligned square.
    Square,
}

/// Point marker style.
#[derive(Debug, Clone, PartialEq)]
pub struct PointPaint {
    /// Fill color.
    pub color: Color,
    /// Diameter (or side) in pixels.
    pub size: f64,
    /// Marker shape.
    pub shape: PointShape,
    /// Outline.
    pub edge: Option<LinePaint>,
}

/// Format of a static map file.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// SVG document.
    Svg,
}

impl OutputFormat {
    /// Whether the format is rendered by [`RasterCanvas`].
    pub fn is_raster(&self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::Jpeg)
    }
}

impl FromStr for OutputFormat {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "svg" => Ok(Self::Svg),
            _ => Err(MapError::UnsupportedOutputFormat(s.to_string())),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Svg => "svg",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_output_format() {
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("svg".parse::<OutputFormat>().unwrap(), OutputFormat::Svg);
        assert_matches!(
            "pdf".parse::<OutputFormat>(),
            Err(MapError::UnsupportedOutputFormat(f)) if f == "pdf"
        );
    }
}
