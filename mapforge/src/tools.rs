//! Entry points of the two renderers. Each call is independent: files are decoded, drawn and
//! written within the call, and every failure is reported in the returned [`MapOutput`].

use mapforge_types::MapOutput;

use crate::loader::FsDataLoader;
use crate::static_map::{render_static, StaticMapRequest};
use crate::web_map::{render_interactive, WebMapRequest};

/// Creates a static map image (`png`, `jpg` or `svg`) from the request layers.
///
/// ```no_run
/// use mapforge::tools::create_map;
/// use mapforge::static_map::StaticMapRequest;
/// use mapforge_types::{LayerDescription, StyleOptions};
///
/// let output = create_map(
///     &StaticMapRequest::new(vec![LayerDescription::new("POINT (30 10)")
///         .with_style(StyleOptions::new().with_label("Station"))])
///     .with_title("Stations"),
/// );
/// println!("{}", output.message);
/// ```
pub fn create_map(request: &StaticMapRequest) -> MapOutput {
    log::info!(
        "Creating static map '{}.{}' with {} layers",
        request.filename,
        request.filetype,
        request.layers.len()
    );
    render_static(request, &FsDataLoader)
}

/// Creates an interactive HTML map from the request layers.
pub fn create_web_map(request: &WebMapRequest) -> MapOutput {
    log::info!(
        "Creating web map '{}' with {} layers",
        request.filename,
        request.layers.len()
    );
    render_interactive(request, &FsDataLoader)
}

/// Parses a static map request from JSON and creates the map. Invalid JSON is reported as an
/// error output.
pub fn create_map_from_json(json: &str) -> MapOutput {
    match serde_json::from_str::<StaticMapRequest>(json) {
        Ok(request) => create_map(&request),
        Err(err) => MapOutput::error(format!("invalid request: {err}")),
    }
}

/// Parses a web map request from JSON and creates the map.
pub fn create_web_map_from_json(json: &str) -> MapOutput {
    match serde_json::from_str::<WebMapRequest>(json) {
        Ok(request) => create_web_map(&request),
        Err(err) => MapOutput::error(format!("invalid request: {err}")),
    }
}
