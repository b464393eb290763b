//! Leaflet page assembled from resolved layers.

use geojson::FeatureCollection;
use mapforge_types::{Color, StyleOptions};
use serde_json::{json, Map, Value};

use super::basemap::Basemap;
use super::templates::{self, escape_html, script_json};
use super::WebMapOptions;
use crate::error::MapError;
use crate::resolver::{ResolvedData, ResolvedLayer};

/// Overlay name of layers without a label.
pub const DEFAULT_LABEL: &str = "Layer";
/// Color of layers without an explicit color.
pub const DEFAULT_COLOR: Color = Color::BLUE;
/// Radius of point markers in pixels.
const DEFAULT_RADIUS: f64 = 6.0;

/// Leaflet path options accepted as passthrough style keys.
const PASSTHROUGH_NUMBERS: [&str; 4] = ["opacity", "weight", "fillOpacity", "radius"];
const PASSTHROUGH_STRINGS: [&str; 3] = ["dashArray", "lineCap", "lineJoin"];

/// Legend line of the interactive map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    /// Layer label.
    pub label: String,
    /// CSS color of the swatch.
    pub color: String,
}

/// Toggleable GeoJSON layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// Name shown in the layer control.
    pub name: String,
    /// Features in WGS84 coordinates.
    pub features: FeatureCollection,
    /// Leaflet path options.
    pub style: Map<String, Value>,
    /// Attribute fields listed in the hover tooltip. Empty for layers without attributes.
    pub tooltip_fields: Vec<String>,
}

/// Controls added to the map besides the layer switcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    /// Show coordinates on click.
    pub lat_lng_popup: bool,
    /// Show a scale bar.
    pub scale_bar: bool,
    /// Show an overview minimap.
    pub minimap: bool,
    /// Show the legend.
    pub legend: bool,
}

/// Interactive map page.
///
/// The document only collects overlays and decorations, [`WebMapDocument::to_html`] produces the
/// page in one go.
#[derive(Debug, Clone)]
pub struct WebMapDocument {
    basemap: Basemap,
    options: WebMapOptions,
    overlays: Vec<Overlay>,
    legend: Vec<LegendEntry>,
    controls: Controls,
    title: Option<String>,
}

impl WebMapDocument {
    /// Creates a document with no overlays.
    pub fn new(basemap: Basemap, options: WebMapOptions) -> Self {
        Self {
            basemap,
            options,
            overlays: vec![],
            legend: vec![],
            controls: Controls::default(),
            title: None,
        }
    }

    /// Added overlays.
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    /// Entries accumulated for the legend, one per added layer.
    pub fn legend_entries(&self) -> &[LegendEntry] {
        &self.legend
    }

    /// Enabled map controls.
    pub fn controls(&self) -> Controls {
        self.controls
    }

    /// Sets the enabled map controls.
    pub fn set_controls(&mut self, controls: Controls) {
        self.controls = controls;
    }

    /// Sets the page title.
    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    /// Adds the layer as a named overlay and records its legend entry.
    pub fn add_layer(&mut self, layer: &ResolvedLayer) -> Result<(), MapError> {
        let name = layer
            .label
            .clone()
            .unwrap_or_else(|| DEFAULT_LABEL.to_string());
        let color = layer
            .style
            .fill_color()?
            .unwrap_or(DEFAULT_COLOR)
            .to_css_rgb();
        let style = self.overlay_style(&layer.style, &color)?;

        let (features, tooltip_fields) = match &layer.data {
            ResolvedData::Geometry(geometry) => (
                FeatureCollection {
                    bbox: None,
                    features: vec![geojson::Feature {
                        bbox: None,
                        geometry: Some(geojson::Geometry::new(geojson::Value::from(geometry))),
                        id: None,
                        properties: None,
                        foreign_members: None,
                    }],
                    foreign_members: None,
                },
                vec![],
            ),
            ResolvedData::Dataset(dataset) => {
                (dataset.to_feature_collection(), dataset.fields.clone())
            }
            ResolvedData::Raster(_) => {
                return Err(MapError::UnsupportedSourceType(
                    "raster layers cannot be added to the interactive map".into(),
                ))
            }
        };

        log::debug!(
            "Adding overlay '{name}' with {} features",
            features.features.len()
        );

        self.overlays.push(Overlay {
            name: name.clone(),
            features,
            style,
            tooltip_fields,
        });
        self.legend.push(LegendEntry { label: name, color });

        Ok(())
    }

    /// Leaflet path options: defaults, then the named style fields, then passthrough keys.
    fn overlay_style(
        &self,
        style: &StyleOptions,
        color: &str,
    ) -> Result<Map<String, Value>, MapError> {
        let mut options = Map::new();
        options.insert("color".into(), json!(color));
        options.insert("fillColor".into(), json!(color));
        options.insert("weight".into(), json!(self.options.weight));
        options.insert("fillOpacity".into(), json!(self.options.fill_opacity));
        options.insert("radius".into(), json!(DEFAULT_RADIUS));

        if let Some(edge_color) = style.edge_color()? {
            options.insert("color".into(), json!(edge_color.to_css_rgb()));
        }
        if let Some(width) = style.linewidth {
            options.insert("weight".into(), json!(width));
        }
        if let Some(alpha) = style.alpha {
            options.insert("fillOpacity".into(), json!(alpha));
        }
        if let Some(size) = style.markersize {
            options.insert("radius".into(), json!(size));
        }

        for (key, value) in &style.extra {
            let accepted = if PASSTHROUGH_NUMBERS.contains(&key.as_str()) {
                value.is_number()
            } else if PASSTHROUGH_STRINGS.contains(&key.as_str()) {
                value.is_string()
            } else {
                return Err(MapError::StyleRejected(format!(
                    "unexpected style option '{key}'"
                )));
            };

            if !accepted {
                return Err(MapError::StyleRejected(format!(
                    "invalid value {value} for style option '{key}'"
                )));
            }
            options.insert(key.clone(), value.clone());
        }

        Ok(options)
    }

    /// Renders the complete HTML page.
    pub fn to_html(&self) -> Result<String, MapError> {
        let mut assets = vec![
            templates::fill(
                templates::STYLESHEET,
                &[("href", escape_html(&self.options.leaflet_css))],
            )?,
            templates::fill(
                templates::SCRIPT_ASSET,
                &[("src", escape_html(&self.options.leaflet_js))],
            )?,
        ];
        if self.controls.minimap {
            assets.push(templates::fill(
                templates::STYLESHEET,
                &[("href", escape_html(&self.options.minimap_css))],
            )?);
            assets.push(templates::fill(
                templates::SCRIPT_ASSET,
                &[("src", escape_html(&self.options.minimap_js))],
            )?);
        }

        let mut fixed_elements = vec![];
        if let Some(title) = &self.title {
            fixed_elements.push(templates::fill(
                templates::TITLE,
                &[("title", escape_html(title))],
            )?);
        }
        if self.controls.legend && !self.legend.is_empty() {
            fixed_elements.push(self.legend_html()?);
        }

        templates::fill(
            templates::PAGE,
            &[
                (
                    "page_title",
                    escape_html(self.title.as_deref().unwrap_or("Map")),
                ),
                ("assets", assets.join("\n")),
                ("fixed_elements", fixed_elements.join("\n")),
                ("script", self.script()?),
            ],
        )
    }

    fn legend_html(&self) -> Result<String, MapError> {
        let items = self
            .legend
            .iter()
            .map(|entry| {
                templates::fill(
                    templates::LEGEND_ITEM,
                    &[
                        ("color", escape_html(&entry.color)),
                        ("label", escape_html(&entry.label)),
                    ],
                )
            })
            .collect::<Result<String, _>>()?;

        templates::fill(templates::LEGEND, &[("items", items)])
    }

    fn tile_layer(&self) -> Result<String, MapError> {
        let mut options = Map::new();
        options.insert("maxZoom".into(), json!(self.basemap.max_zoom()));
        if let Some(attribution) = self.basemap.attribution() {
            options.insert("attribution".into(), json!(attribution.to_html()));
        }
        if let Some(subdomains) = self.basemap.subdomains() {
            options.insert("subdomains".into(), json!(subdomains));
        }

        Ok(format!(
            "L.tileLayer({}, {})",
            script_json(self.basemap.tile_url())?,
            script_json(&options)?
        ))
    }

    fn script(&self) -> Result<String, MapError> {
        let map_options = json!({
            "center": self.options.center,
            "zoom": self.options.zoom,
        });

        let mut lines = vec![
            templates::ESCAPE_FUNCTION.to_string(),
            format!("var map = L.map('map', {});", script_json(&map_options)?),
            format!("{}.addTo(map);", self.tile_layer()?),
            "var overlays = {};".to_string(),
        ];

        for (index, overlay) in self.overlays.iter().enumerate() {
            lines.push(overlay_script(index, overlay)?);
        }

        lines.push(
            "L.control.layers(null, overlays, {\"collapsed\": true}).addTo(map);".to_string(),
        );

        if self.controls.lat_lng_popup {
            lines.push(templates::LAT_LNG_POPUP.to_string());
            if self.controls.scale_bar {
                lines.push("L.control.scale({\"position\": \"bottomleft\"}).addTo(map);".into());
            }
        }

        if self.controls.minimap {
            lines.push(format!(
                "new L.Control.MiniMap({}, {{\"toggleDisplay\": true, \"position\": \"bottomright\"}}).addTo(map);",
                self.tile_layer()?
            ));
        }

        if self.title.is_some() {
            lines.push(templates::TITLE_SCRIPT.to_string());
        }

        Ok(lines.join("\n"))
    }
}

fn overlay_script(index: usize, overlay: &Overlay) -> Result<String, MapError> {
    let variable = format!("overlay_{index}");
    let style = script_json(&overlay.style)?;

    let mut script = format!(
        "var {variable} = L.geoJSON({features}, {{
    style: function (feature) {{ return {style}; }},
    pointToLayer: function (feature, latlng) {{ return L.circleMarker(latlng, {style}); }}
}}).addTo(map);
overlays[{name}] = {variable};",
        features = script_json(&overlay.features)?,
        name = script_json(&overlay.name)?,
    );

    if !overlay.tooltip_fields.is_empty() {
        script.push_str(&format!(
            "
{variable}.bindTooltip(function (layer) {{
    var properties = layer.feature.properties || {{}};
    return '<table>' + {fields}.map(function (field) {{
        return '<tr><th>' + escapeHtml(field) + '</th><td>' + escapeHtml(properties[field]) + '</td></tr>';
    }}).join('') + '</table>';
}}, {{\"sticky\": true}});",
            fields = script_json(&overlay.tooltip_fields)?,
        ));
    }

    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::LayerKind;
    use assert_matches::assert_matches;
    use geo_types::{point, Geometry};
    use mapforge_types::{AttributeValue, Feature, Rect, VectorDataset};

    fn document() -> WebMapDocument {
        WebMapDocument::new(Basemap::OpenStreetMap, WebMapOptions::default())
    }

    fn geometry_layer(style: StyleOptions) -> ResolvedLayer {
        ResolvedLayer {
            kind: LayerKind::VectorGeometry,
            data: ResolvedData::Geometry(Geometry::Point(point!(x: 10.0, y: 20.0))),
            label: style.label.clone(),
            style,
        }
    }

    fn dataset_layer() -> ResolvedLayer {
        let dataset = VectorDataset::new(
            vec!["name".into(), "pop".into()],
            vec![Feature::new(Geometry::Point(point!(x: 1.0, y: 2.0)))
                .with_attribute("name", AttributeValue::String("Oslo".into()))
                .with_attribute("pop", AttributeValue::Int(700000))],
        );
        ResolvedLayer {
            kind: LayerKind::VectorDataset,
            data: ResolvedData::Dataset(dataset),
            style: StyleOptions::new().with_label("Cities").with_color("red"),
            label: Some("Cities".into()),
        }
    }

    #[test]
    fn defaults_for_unlabelled_layer() {
        let mut doc = document();
        doc.add_layer(&geometry_layer(StyleOptions::new())).unwrap();

        assert_eq!(
            doc.legend_entries(),
            &[LegendEntry {
                label: "Layer".into(),
                color: "#0000ff".into()
            }]
        );

        let overlay = &doc.overlays()[0];
        assert_eq!(overlay.style.get("color"), Some(&json!("#0000ff")));
        assert_eq!(overlay.style.get("fillColor"), Some(&json!("#0000ff")));
        assert_eq!(overlay.style.get("weight"), Some(&json!(2.0)));
        assert_eq!(overlay.style.get("fillOpacity"), Some(&json!(0.5)));
        assert!(overlay.tooltip_fields.is_empty());
    }

    #[test]
    fn passthrough_options() {
        let mut doc = document();
        doc.add_layer(&geometry_layer(
            StyleOptions::new()
                .with_color("green")
                .with_extra("dashArray", "5, 5")
                .with_extra("weight", 4),
        ))
        .unwrap();

        let style = &doc.overlays()[0].style;
        assert_eq!(style.get("dashArray"), Some(&json!("5, 5")));
        assert_eq!(style.get("weight"), Some(&json!(4)));
        assert_eq!(style.get("fillColor"), Some(&json!("#008000")));
    }

    #[test]
    fn colors_are_normalized() {
        let mut doc = document();
        doc.add_layer(&geometry_layer(
            StyleOptions::new()
                .with_label("Roads")
                .with_color("tab:orange")
                .with_edgecolor("k"),
        ))
        .unwrap();

        let style = &doc.overlays()[0].style;
        assert_eq!(style.get("fillColor"), Some(&json!("#ff7f0e")));
        assert_eq!(style.get("color"), Some(&json!("#000000")));
        assert_eq!(doc.legend_entries()[0].color, "#ff7f0e");
    }

    #[test]
    fn unknown_colors_are_rejected() {
        let mut doc = document();
        assert_matches!(
            doc.add_layer(&geometry_layer(StyleOptions::new().with_color("notacolor"))),
            Err(MapError::StyleRejected(msg)) if msg.contains("notacolor")
        );
        assert_matches!(
            doc.add_layer(&geometry_layer(StyleOptions::new().with_edgecolor("nope"))),
            Err(MapError::StyleRejected(_))
        );
        assert!(doc.overlays().is_empty());
        assert!(doc.legend_entries().is_empty());
    }

    #[test]
    fn rejected_options() {
        let mut doc = document();
        assert_matches!(
            doc.add_layer(&geometry_layer(StyleOptions::new().with_extra("hatch", "//"))),
            Err(MapError::StyleRejected(_))
        );
        assert_matches!(
            doc.add_layer(&geometry_layer(StyleOptions::new().with_extra("weight", "thick"))),
            Err(MapError::StyleRejected(_))
        );
        assert!(doc.overlays().is_empty());
        assert!(doc.legend_entries().is_empty());
    }

    #[test]
    fn raster_is_rejected() {
        let raster = crate::raster::Raster::new(
            1,
            1,
            1,
            vec![0.0],
            Rect::new(0.0, 0.0, 1.0, 1.0),
            None,
        )
        .unwrap();
        let layer = ResolvedLayer {
            kind: LayerKind::Raster,
            data: ResolvedData::Raster(raster),
            style: StyleOptions::new(),
            label: None,
        };

        assert_matches!(
            document().add_layer(&layer),
            Err(MapError::UnsupportedSourceType(_))
        );
    }

    #[test]
    fn dataset_tooltip() {
        let mut doc = document();
        doc.add_layer(&dataset_layer()).unwrap();

        assert_eq!(doc.overlays()[0].tooltip_fields, vec!["name", "pop"]);
        let html = doc.to_html().unwrap();
        assert!(html.contains("overlay_0.bindTooltip"));
        assert!(html.contains(r#"["name","pop"]"#));
        assert!(html.contains("Oslo"));
    }

    #[test]
    fn html_controls() {
        let mut doc = document();
        doc.add_layer(&geometry_layer(StyleOptions::new().with_label("A")))
            .unwrap();
        doc.add_layer(&dataset_layer()).unwrap();
        doc.set_title(Some("Europe <2024>".into()));
        doc.set_controls(Controls {
            lat_lng_popup: true,
            scale_bar: true,
            minimap: true,
            legend: true,
        });

        let html = doc.to_html().unwrap();
        assert_eq!(html.matches("L.geoJSON(").count(), 2);
        assert_eq!(html.matches("float:left;margin-right:8px;").count(), 2);
        assert!(html.contains("Europe &lt;2024&gt;<br>"));
        assert!(html.contains("Showing: All layers"));
        assert!(html.contains("overlayadd"));
        assert!(html.contains("L.control.scale"));
        assert!(html.contains("L.Control.MiniMap"));
        assert!(html.contains("Control.MiniMap.min.js"));
        assert!(html.contains("latLngPopup"));
        assert!(html.contains(r#"overlays["Cities"] = overlay_1;"#));
    }

    #[test]
    fn html_without_decorations() {
        let mut doc = document();
        doc.add_layer(&geometry_layer(StyleOptions::new())).unwrap();

        let html = doc.to_html().unwrap();
        assert!(!html.contains("mapLegend"));
        assert!(!html.contains("mapTitle"));
        assert!(!html.contains("overlayadd"));
        assert!(!html.contains("L.Control.MiniMap"));
        assert!(!html.contains("latLngPopup"));
        assert!(html.contains("L.control.layers"));
    }

    #[test]
    fn script_text_is_escaped() {
        let mut doc = document();
        doc.add_layer(&geometry_layer(
            StyleOptions::new().with_label("</script><script>alert(1)</script>"),
        ))
        .unwrap();

        let html = doc.to_html().unwrap();
        assert!(!html.contains("</script><script>alert"));
    }
}
