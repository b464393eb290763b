//! Validated drawing style of a layer.

use mapforge_types::{Color, StyleOptions};
use serde_json::Value;

use crate::error::MapError;
use crate::raster::Colormap;
use crate::render::PointShape;

/// Default polygon edge width in points.
pub const DEFAULT_EDGE_WIDTH: f64 = 1.0;
/// Default line width in points.
pub const DEFAULT_LINE_WIDTH: f64 = 1.5;
/// Default marker area in square points.
pub const DEFAULT_MARKER_SIZE: f64 = 36.0;
/// Widest accepted line, in points.
pub const MAX_LINE_WIDTH: f64 = 1000.0;
/// Largest accepted marker area in square points (a marker of 1000 pt across).
pub const MAX_MARKER_SIZE: f64 = 1.0e6;

/// Dash style of lines and polygon edges.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum LineStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// Long dashes.
    Dashed,
    /// Dots.
    Dotted,
}

impl LineStyle {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "solid" | "-" => Some(Self::Solid),
            "dashed" | "--" => Some(Self::Dashed),
            "dotted" | ":" => Some(Self::Dotted),
            _ => None,
        }
    }

    /// Dash pattern in points for the given line width.
    pub fn pattern(&self, width: f64) -> Option<Vec<f64>> {
        let width = width.max(0.1);
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some(vec![3.7 * width, 1.6 * width]),
            LineStyle::Dotted => Some(vec![width, 1.65 * width]),
        }
    }
}

/// Style of a layer in the static figure.
///
/// Built from [`StyleOptions`]; passthrough keys other than `linestyle`, `marker` and `zorder` are
/// rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawStyle {
    /// Fill or line color.
    pub color: Option<Color>,
    /// Outline color.
    pub edge_color: Option<Color>,
    /// Points.
    pub linewidth: Option<f64>,
    /// Opacity in `0..=1`.
    pub alpha: Option<f64>,
    /// Marker area in square points.
    pub markersize: Option<f64>,
    /// Colormap of single band rasters.
    pub colormap: Colormap,
    /// Dash pattern of lines and outlines.
    pub line_style: LineStyle,
    /// Marker shape.
    pub marker: PointShape,
    /// Drawing order override.
    pub zorder: Option<f64>,
}

impl DrawStyle {
    /// Validates the style options of a layer.
    pub fn from_options(options: &StyleOptions) -> Result<Self, MapError> {
        let colormap = match &options.cmap {
            Some(name) => Colormap::from_name(name).ok_or_else(|| {
                MapError::StyleRejected(format!("'{name}' is not a known colormap"))
            })?,
            None => Colormap::default(),
        };

        let mut style = Self {
            color: options.fill_color()?,
            edge_color: options.edge_color()?,
            linewidth: bounded("linewidth", options.linewidth, MAX_LINE_WIDTH)?,
            alpha: options.alpha,
            markersize: bounded("markersize", options.markersize, MAX_MARKER_SIZE)?,
            colormap,
            line_style: LineStyle::Solid,
            marker: PointShape::Circle,
            zorder: None,
        };

        if let Some(alpha) = style.alpha {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(MapError::StyleRejected(format!(
                    "alpha ({alpha}) is outside 0-1 range"
                )));
            }
        }

        for (key, value) in &options.extra {
            match key.as_str() {
                "linestyle" | "ls" => {
                    style.line_style = value
                        .as_str()
                        .and_then(LineStyle::from_name)
                        .ok_or_else(|| invalid_value(key, value))?;
                }
                "marker" => {
                    style.marker = match value.as_str() {
                        Some("o" | "circle") => PointShape::Circle,
                        Some("s" | "square") => PointShape::Square,
                        _ => return Err(invalid_value(key, value)),
                    };
                }
                "zorder" => {
                    style.zorder = Some(
                        value
                            .as_f64()
                            .filter(|v| v.is_finite())
                            .ok_or_else(|| invalid_value(key, value))?,
                    );
                }
                _ => {
                    return Err(MapError::StyleRejected(format!(
                        "unexpected style option '{key}'"
                    )))
                }
            }
        }

        Ok(style)
    }

    /// Opacity multiplier for colors.
    pub fn opacity(&self) -> f64 {
        self.alpha.unwrap_or(1.0)
    }
}

fn bounded(name: &str, value: Option<f64>, max: f64) -> Result<Option<f64>, MapError> {
    match value {
        Some(v) if !(0.0..=max).contains(&v) => Err(MapError::StyleRejected(format!(
            "{name} must be a number between 0 and {max}, got {v}"
        ))),
        other => Ok(other),
    }
}

fn invalid_value(key: &str, value: &Value) -> MapError {
    MapError::StyleRejected(format!("invalid value {value} for style option '{key}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn passthrough_options() {
        let options = StyleOptions::new()
            .with_color("tab:orange")
            .with_extra("linestyle", "--")
            .with_extra("marker", "s")
            .with_extra("zorder", 3);
        let style = DrawStyle::from_options(&options).unwrap();

        assert_eq!(style.color, Some(Color::rgba(0xff, 0x7f, 0x0e, 255)));
        assert_eq!(style.line_style, LineStyle::Dashed);
        assert_eq!(style.marker, PointShape::Square);
        assert_eq!(style.zorder, Some(3.0));
    }

    #[test]
    fn rejects_unknown_options() {
        let options = StyleOptions::new().with_extra("hatch", "//");
        assert_matches!(
            DrawStyle::from_options(&options),
            Err(MapError::StyleRejected(msg)) if msg.contains("hatch")
        );

        let options = StyleOptions::new().with_extra("linestyle", "wavy");
        assert_matches!(
            DrawStyle::from_options(&options),
            Err(MapError::StyleRejected(_))
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert_matches!(
            DrawStyle::from_options(&StyleOptions::new().with_color("notacolor")),
            Err(MapError::StyleRejected(_))
        );
        assert_matches!(
            DrawStyle::from_options(&StyleOptions::new().with_alpha(1.5)),
            Err(MapError::StyleRejected(_))
        );
        assert_matches!(
            DrawStyle::from_options(&StyleOptions::new().with_linewidth(-1.0)),
            Err(MapError::StyleRejected(_))
        );
        assert_matches!(
            DrawStyle::from_options(&StyleOptions::new().with_cmap("jet")),
            Err(MapError::StyleRejected(_))
        );
    }

    #[test]
    fn rejects_oversized_strokes_and_markers() {
        assert_matches!(
            DrawStyle::from_options(&StyleOptions::new().with_linewidth(1e300)),
            Err(MapError::StyleRejected(msg)) if msg.contains("linewidth")
        );
        assert_matches!(
            DrawStyle::from_options(&StyleOptions::new().with_markersize(1e300)),
            Err(MapError::StyleRejected(msg)) if msg.contains("markersize")
        );
        assert_matches!(
            DrawStyle::from_options(&StyleOptions::new().with_linewidth(f64::NAN)),
            Err(MapError::StyleRejected(_))
        );

        let style = DrawStyle::from_options(
            &StyleOptions::new()
                .with_linewidth(MAX_LINE_WIDTH)
                .with_markersize(MAX_MARKER_SIZE),
        )
        .unwrap();
        assert_eq!(style.linewidth, Some(MAX_LINE_WIDTH));
        assert_eq!(style.markersize, Some(MAX_MARKER_SIZE));
    }

    #[test]
    fn dash_patterns_scale_with_width() {
        assert_eq!(LineStyle::Solid.pattern(2.0), None);
        assert_eq!(LineStyle::Dotted.pattern(2.0), Some(vec![2.0, 3.3]));
    }
}
