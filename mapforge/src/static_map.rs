//! Static renderer: draws the layers into a figure and saves it as an image file.

use std::path::{Path, PathBuf};

use mapforge_types::{Color, LayerDescription, MapOutput};
use serde::Deserialize;

use crate::error::MapError;
use crate::figure::{Decorations, Figure, MAX_CANVAS_SIDE};
use crate::loader::DataLoader;
use crate::render::text::TextShaper;
use crate::render::OutputFormat;
use crate::resolver::{resolve, RenderPath};

/// Rendering knobs of the static renderer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StaticMapOptions {
    /// Figure width and height in inches.
    pub figure_size: [f64; 2],
    /// Pixels per inch.
    pub dpi: f64,
    /// Canvas background.
    pub background: Color,
    /// Font families for the figure text, in order of preference.
    pub font_families: Vec<String>,
    /// Additional directory to load fonts from.
    pub fonts_dir: Option<PathBuf>,
    /// Padding around the cropped content in inches.
    pub pad_inches: f64,
}

impl Default for StaticMapOptions {
    fn default() -> Self {
        Self {
            figure_size: [8.0, 8.0],
            dpi: 300.0,
            background: Color::WHITE,
            font_families: [
                "DejaVu Sans",
                "Liberation Sans",
                "Arial",
                "Helvetica",
                "Noto Sans",
                "FreeSans",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            fonts_dir: None,
            pad_inches: 0.1,
        }
    }
}

impl StaticMapOptions {
    /// Sets the figure size in inches.
    pub fn with_figure_size(mut self, figure_size: [f64; 2]) -> Self {
        self.figure_size = figure_size;
        self
    }

    /// Sets the resolution.
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    /// Sets the background.
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Sets the preferred font families.
    pub fn with_font_families(mut self, font_families: Vec<String>) -> Self {
        self.font_families = font_families;
        self
    }

    /// Loads additional fonts from the directory.
    pub fn with_fonts_dir(mut self, fonts_dir: impl Into<PathBuf>) -> Self {
        self.fonts_dir = Some(fonts_dir.into());
        self
    }

    /// Sets the padding around the figure.
    pub fn with_pad_inches(mut self, pad_inches: f64) -> Self {
        self.pad_inches = pad_inches;
        self
    }

    fn validate(&self) -> Result<(), MapError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.dpi) || !self.figure_size.into_iter().all(positive) {
            return Err(MapError::Encode(format!(
                "figure size {:?} at {} dpi cannot be rendered",
                self.figure_size, self.dpi
            )));
        }

        if !(self.pad_inches.is_finite() && self.pad_inches >= 0.0) {
            return Err(MapError::Encode(format!(
                "padding of {} inches cannot be rendered",
                self.pad_inches
            )));
        }

        let page_side = self.figure_size[0].max(self.figure_size[1]) + 2.0 * self.pad_inches;
        if page_side * self.dpi > MAX_CANVAS_SIDE {
            return Err(MapError::Encode(format!(
                "figure size {:?} with {} inches padding at {} dpi exceeds {MAX_CANVAS_SIDE} px",
                self.figure_size, self.pad_inches, self.dpi
            )));
        }

        Ok(())
    }
}

/// Parameters of a static map rendering call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StaticMapRequest {
    /// Layers in drawing order.
    pub layers: Vec<LayerDescription>,
    /// File name without extension.
    #[serde(default = "default_filename")]
    pub filename: String,
    /// `png`, `jpg`/`jpeg` or `svg`.
    #[serde(default = "default_filetype")]
    pub filetype: String,
    /// Title above the axes.
    #[serde(default)]
    pub title: Option<String>,
    /// Draw grid lines.
    #[serde(default = "enabled")]
    pub show_grid: bool,
    /// Draw a legend of the labelled layers.
    #[serde(default = "enabled")]
    pub add_legend: bool,
    /// Directory of the output file.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Rendering options.
    #[serde(default)]
    pub options: StaticMapOptions,
}

fn default_filename() -> String {
    "map".into()
}

fn default_filetype() -> String {
    "png".into()
}

fn enabled() -> bool {
    true
}

pub(crate) fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

impl StaticMapRequest {
    /// Request with default parameters.
    pub fn new(layers: Vec<LayerDescription>) -> Self {
        Self {
            layers,
            filename: default_filename(),
            filetype: default_filetype(),
            title: None,
            show_grid: true,
            add_legend: true,
            output_dir: default_output_dir(),
            options: StaticMapOptions::default(),
        }
    }

    /// Sets the file name without extension.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Sets the output format name.
    pub fn with_filetype(mut self, filetype: impl Into<String>) -> Self {
        self.filetype = filetype.into();
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets whether grid lines are drawn.
    pub fn with_grid(mut self, show_grid: bool) -> Self {
        self.show_grid = show_grid;
        self
    }

    /// Sets whether the legend is drawn.
    pub fn with_legend(mut self, add_legend: bool) -> Self {
        self.add_legend = add_legend;
        self
    }

    /// Sets the output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Sets the rendering options.
    pub fn with_options(mut self, options: StaticMapOptions) -> Self {
        self.options = options;
        self
    }

    /// Path of the file the request produces.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.filename, self.filetype))
    }
}

/// Renders the request into `{output_dir}/{filename}.{filetype}`.
///
/// Any failure aborts the call before anything is written to disk.
pub fn render_static(request: &StaticMapRequest, loader: &dyn DataLoader) -> MapOutput {
    match write_static_map(request, loader) {
        Ok(path) => MapOutput::success(
            format!("Map created and saved to {}", path.display()),
            path.display().to_string(),
        ),
        Err(err) => {
            log::error!("Failed to create static map: {err}");
            MapOutput::error(err.to_string())
        }
    }
}

fn write_static_map(
    request: &StaticMapRequest,
    loader: &dyn DataLoader,
) -> Result<PathBuf, MapError> {
    let format: OutputFormat = request.filetype.parse()?;
    request.options.validate()?;

    let mut figure = Figure::new();
    for layer in &request.layers {
        let resolved = resolve(layer, RenderPath::Static, loader)?;
        log::debug!(
            "Drawing {:?} layer {:?}",
            resolved.kind,
            resolved.label.as_deref().unwrap_or_default()
        );
        figure.draw_layer(&resolved)?;
    }

    let decorations = Decorations {
        title: request.title.clone(),
        show_grid: request.show_grid,
        add_legend: request.add_legend,
    };
    let shaper = TextShaper::with_system_fonts(
        request.options.font_families.clone(),
        request.options.fonts_dir.as_deref(),
    );
    let bytes = figure.render(&decorations, &request.options, &shaper, format)?;

    let path = request.output_path();
    write_output(&request.output_dir, &path, &bytes)?;
    log::info!("Static map saved to {}", path.display());

    Ok(path)
}

/// Creates the output directory and writes the file.
pub(crate) fn write_output(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), MapError> {
    std::fs::create_dir_all(dir).map_err(|source| MapError::WriteFailure {
        path: dir.to_path_buf(),
        source,
    })?;
    std::fs::write(path, bytes).map_err(|source| MapError::WriteFailure {
        path: path.to_path_buf(),
        source,
    })
}
