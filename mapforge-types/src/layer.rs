//! Layer requests: a data source with its style.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::source::LayerSource;
use crate::style::StyleOptions;

/// One requested map layer: where its data comes from and how to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescription {
    /// Where the geometry comes from.
    pub data: LayerSource,
    /// Drawing options, passed to the renderer unchanged.
    pub style: StyleOptions,
}

impl LayerDescription {
    /// Creates a layer with the default style.
    pub fn new(data: impl Into<LayerSource>) -> Self {
        Self {
            data: data.into(),
            style: StyleOptions::default(),
        }
    }

    /// Replaces the style of the layer.
    pub fn with_style(mut self, style: StyleOptions) -> Self {
        self.style = style;
        self
    }

    /// Value of `style.label`, if set.
    pub fn label(&self) -> Option<&str> {
        self.style.label.as_deref()
    }
}

#[derive(Deserialize)]
struct RawLayer {
    data: Value,
    #[serde(default)]
    style: Option<StyleOptions>,
}

impl<'de> Deserialize<'de> for LayerDescription {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawLayer::deserialize(deserializer)?;
        Ok(Self {
            data: LayerSource::from_json(raw.data),
            style: raw.style.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn deserialize_layer() {
        let layer: LayerDescription = serde_json::from_value(json!({
            "data": "POINT (1 1)",
            "style": {"label": "P", "color": "red"}
        }))
        .unwrap();

        assert_matches!(layer.data, LayerSource::WktText(ref t) if t == "POINT (1 1)");
        assert_eq!(layer.label(), Some("P"));
        assert_eq!(layer.style.color.as_deref(), Some("red"));
    }

    #[test]
    fn style_is_optional() {
        let layer: LayerDescription =
            serde_json::from_value(json!({"data": [[0, 0], [1, 1]], "style": null})).unwrap();
        assert_eq!(layer.style, StyleOptions::default());

        let layer: LayerDescription = serde_json::from_value(json!({"data": 5})).unwrap();
        assert_matches!(layer.data, LayerSource::Unsupported(_));
        assert_eq!(layer.label(), None);
    }

    #[test]
    fn data_is_required() {
        assert!(serde_json::from_value::<LayerDescription>(json!({"style": {}})).is_err());
    }
}
