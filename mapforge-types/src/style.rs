//! Per-layer drawing options shared by both renderers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::Color;
use crate::error::TypesError;

/// Per-layer drawing options.
///
/// The named fields are understood by both renderers. Any other key ends up in `extra` and is
/// interpreted (or rejected) by the renderer that draws the layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleOptions {
    /// Legend and overlay name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Fill, line or marker color as given by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Outline color of polygons and markers.
    #[serde(default, alias = "edge_color", skip_serializing_if = "Option::is_none")]
    pub edgecolor: Option<String>,
    /// Stroke width in points.
    #[serde(default, alias = "width", skip_serializing_if = "Option::is_none")]
    pub linewidth: Option<f64>,
    /// Opacity in `0..=1`.
    #[serde(default, alias = "fill_opacity", skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    /// Marker size in points.
    #[serde(default, alias = "marker_size", skip_serializing_if = "Option::is_none")]
    pub markersize: Option<f64>,
    /// Colormap name for single band rasters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmap: Option<String>,
    /// Backend specific options.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl StyleOptions {
    /// Style with every option unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the legend and overlay name.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the main color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the outline color.
    pub fn with_edgecolor(mut self, color: impl Into<String>) -> Self {
        self.edgecolor = Some(color.into());
        self
    }

    /// Sets the stroke width in points.
    pub fn with_linewidth(mut self, width: f64) -> Self {
        self.linewidth = Some(width);
        self
    }

    /// Sets the opacity.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Sets the marker size in points.
    pub fn with_markersize(mut self, size: f64) -> Self {
        self.markersize = Some(size);
        self
    }

    /// Sets the raster colormap.
    pub fn with_cmap(mut self, cmap: impl Into<String>) -> Self {
        self.cmap = Some(cmap.into());
        self
    }

    /// Adds a backend specific option.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Parsed `color`, if set.
    pub fn fill_color(&self) -> Result<Option<Color>, TypesError> {
        self.color.as_deref().map(str::parse).transpose()
    }

    /// Parsed `edgecolor`, if set.
    pub fn edge_color(&self) -> Result<Option<Color>, TypesError> {
        self.edgecolor.as_deref().map(str::parse).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn deserialize_with_aliases_and_extra() {
        let style: StyleOptions = serde_json::from_value(json!({
            "label": "Rivers",
            "color": "steelblue",
            "width": 1.5,
            "fill_opacity": 0.3,
            "linestyle": "--"
        }))
        .unwrap();

        assert_eq!(style.label.as_deref(), Some("Rivers"));
        assert_eq!(style.linewidth, Some(1.5));
        assert_eq!(style.alpha, Some(0.3));
        assert_eq!(style.extra.get("linestyle"), Some(&json!("--")));
        assert_eq!(style.extra.len(), 1);
    }

    #[test]
    fn parses_colors_on_demand() {
        let style = StyleOptions::new().with_color("red").with_edgecolor("nope");
        assert_eq!(style.fill_color(), Ok(Some(Color::RED)));
        assert_matches!(style.edge_color(), Err(TypesError::InvalidColor(_)));
        assert_eq!(StyleOptions::new().fill_color(), Ok(None));
    }

    #[test]
    fn serialize_skips_unset() {
        let value = serde_json::to_value(StyleOptions::new().with_label("a")).unwrap();
        assert_eq!(value, json!({"label": "a"}));
    }
}
