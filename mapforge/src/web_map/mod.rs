//! Interactive renderer: writes a self-contained Leaflet page with one toggleable overlay per
//! layer.

use std::path::PathBuf;

use mapforge_types::{LayerDescription, MapOutput};
use serde::Deserialize;

use crate::error::MapError;
use crate::loader::DataLoader;
use crate::resolver::{resolve, RenderPath};
use crate::static_map::{default_output_dir, write_output};

mod basemap;
mod document;
mod templates;

pub use basemap::{Attribution, Basemap};
pub use document::{
    Controls, LegendEntry, Overlay, WebMapDocument, DEFAULT_COLOR, DEFAULT_LABEL,
};

/// Rendering knobs of the interactive renderer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WebMapOptions {
    /// Initial map center as `[latitude, longitude]`.
    pub center: [f64; 2],
    /// Initial zoom level.
    pub zoom: u8,
    /// Default stroke width of overlays in pixels.
    pub weight: f64,
    /// Default fill opacity of overlays.
    pub fill_opacity: f64,
    /// Whether the grid controls include a scale bar.
    pub scale_bar: bool,
    /// URL of the Leaflet stylesheet.
    pub leaflet_css: String,
    /// URL of the Leaflet script.
    pub leaflet_js: String,
    /// URL of the minimap plugin stylesheet.
    pub minimap_css: String,
    /// URL of the minimap plugin script.
    pub minimap_js: String,
}

impl Default for WebMapOptions {
    fn default() -> Self {
        Self {
            center: [20.0, 0.0],
            zoom: 2,
            weight: 2.0,
            fill_opacity: 0.5,
            scale_bar: true,
            leaflet_css: "https://cdn.jsdelivr.net/npm/leaflet@1.9.3/dist/leaflet.css".into(),
            leaflet_js: "https://cdn.jsdelivr.net/npm/leaflet@1.9.3/dist/leaflet.js".into(),
            minimap_css:
                "https://cdnjs.cloudflare.com/ajax/libs/leaflet-minimap/3.6.1/Control.MiniMap.css"
                    .into(),
            minimap_js:
                "https://cdnjs.cloudflare.com/ajax/libs/leaflet-minimap/3.6.1/Control.MiniMap.min.js"
                    .into(),
        }
    }
}

impl WebMapOptions {
    /// Sets the initial center as `[lat, lon]`.
    pub fn with_center(mut self, center: [f64; 2]) -> Self {
        self.center = center;
        self
    }

    /// Sets the initial zoom level.
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    /// Sets the default outline weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the default fill opacity.
    pub fn with_fill_opacity(mut self, fill_opacity: f64) -> Self {
        self.fill_opacity = fill_opacity;
        self
    }

    /// Sets whether a scale bar is shown.
    pub fn with_scale_bar(mut self, scale_bar: bool) -> Self {
        self.scale_bar = scale_bar;
        self
    }
}

/// Parameters of an interactive map rendering call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebMapRequest {
    /// Layers in drawing order.
    pub layers: Vec<LayerDescription>,
    /// File name including the extension.
    #[serde(default = "default_filename")]
    pub filename: String,
    /// Page title.
    #[serde(default = "default_title")]
    pub title: Option<String>,
    /// Directory of the output file.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Show coordinates on click and the scale bar.
    #[serde(default = "enabled")]
    pub show_grid: bool,
    /// Show a legend of the labelled layers.
    #[serde(default = "enabled")]
    pub add_legend: bool,
    /// Provider name or tile URL template.
    #[serde(default = "default_basemap")]
    pub basemap: String,
    /// Show an overview minimap.
    #[serde(default = "enabled")]
    pub add_minimap: bool,
    /// Rendering options.
    #[serde(default)]
    pub options: WebMapOptions,
}

fn default_filename() -> String {
    "map.html".into()
}

fn default_title() -> Option<String> {
    Some("My Map".into())
}

fn default_basemap() -> String {
    "OpenStreetMap".into()
}

fn enabled() -> bool {
    true
}

impl WebMapRequest {
    /// Request with default parameters.
    pub fn new(layers: Vec<LayerDescription>) -> Self {
        Self {
            layers,
            filename: default_filename(),
            title: default_title(),
            output_dir: default_output_dir(),
            show_grid: true,
            add_legend: true,
            basemap: default_basemap(),
            add_minimap: true,
            options: WebMapOptions::default(),
        }
    }

    /// Sets the file name without extension.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Sets the page title.
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Sets the output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Sets whether coordinates are shown on click.
    pub fn with_grid(mut self, show_grid: bool) -> Self {
        self.show_grid = show_grid;
        self
    }

    /// Sets whether the legend is shown.
    pub fn with_legend(mut self, add_legend: bool) -> Self {
        self.add_legend = add_legend;
        self
    }

    /// Sets the basemap.
    pub fn with_basemap(mut self, basemap: impl Into<String>) -> Self {
        self.basemap = basemap.into();
        self
    }

    /// Sets whether the minimap is shown.
    pub fn with_minimap(mut self, add_minimap: bool) -> Self {
        self.add_minimap = add_minimap;
        self
    }

    /// Sets the rendering options.
    pub fn with_options(mut self, options: WebMapOptions) -> Self {
        self.options = options;
        self
    }

    /// Path of the file the request produces.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.filename)
    }
}

/// Renders the request into `{output_dir}/{filename}`.
///
/// Any failure aborts the call before anything is written to disk.
pub fn render_interactive(request: &WebMapRequest, loader: &dyn DataLoader) -> MapOutput {
    match write_web_map(request, loader) {
        Ok(path) => MapOutput::success(
            format!("Map created: {}", path.display()),
            path.display().to_string(),
        ),
        Err(err) => {
            log::error!("Failed to create web map: {err}");
            MapOutput::error(err.to_string())
        }
    }
}

/// Builds the page document for the request without writing it.
pub fn build_document(
    request: &WebMapRequest,
    loader: &dyn DataLoader,
) -> Result<WebMapDocument, MapError> {
    let basemap: Basemap = request.basemap.parse()?;
    let mut document = WebMapDocument::new(basemap, request.options.clone());

    for layer in &request.layers {
        let resolved = resolve(layer, RenderPath::Interactive, loader)?;
        document.add_layer(&resolved)?;
    }

    document.set_controls(Controls {
        lat_lng_popup: request.show_grid,
        scale_bar: request.show_grid && request.options.scale_bar,
        minimap: request.add_minimap,
        legend: request.add_legend,
    });
    document.set_title(request.title.clone());

    Ok(document)
}

fn write_web_map(request: &WebMapRequest, loader: &dyn DataLoader) -> Result<PathBuf, MapError> {
    let html = build_document(request, loader)?.to_html()?;

    let path = request.output_path();
    write_output(&request.output_dir, &path, html.as_bytes())?;
    log::info!("Web map saved to {}", path.display());

    Ok(path)
}
