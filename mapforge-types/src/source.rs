//! Inputs a map layer can be built from.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::dataset::VectorDataset;

/// File suffixes decoded as vector datasets.
pub const VECTOR_SUFFIXES: [&str; 2] = ["shp", "geojson"];

/// File suffixes decoded as rasters.
pub const RASTER_SUFFIXES: [&str; 2] = ["tif", "tiff"];

/// Data source of a single map layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerSource {
    /// Path to a vector or raster file.
    FilePath(PathBuf),
    /// Well-known-text geometry, e.g. `POINT (30 10)`.
    WktText(String),
    /// Raw `[x, y]` pairs.
    Coordinates(Vec<[f64; 2]>),
    /// Vector data that was already decoded by the caller.
    Dataset(VectorDataset),
    /// Value that cannot be a layer source. Keeps a short description for the error message.
    Unsupported(String),
}

impl LayerSource {
    /// Interprets a dynamically typed JSON value as a layer source.
    ///
    /// Strings ending with a known file suffix become [`LayerSource::FilePath`], other strings are
    /// treated as WKT. Arrays of numeric pairs become [`LayerSource::Coordinates`], GeoJSON objects
    /// become [`LayerSource::Dataset`]. Everything else is kept as [`LayerSource::Unsupported`].
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(text) => Self::from_text(text),
            Value::Array(items) => Self::coordinates_from_json(&items),
            Value::Object(object) => match geojson::GeoJson::from_json_object(object) {
                Ok(geojson) => match VectorDataset::from_geojson(geojson) {
                    Ok(dataset) => Self::Dataset(dataset),
                    Err(err) => Self::Unsupported(err.to_string()),
                },
                Err(err) => Self::Unsupported(format!("object is not GeoJSON: {err}")),
            },
            Value::Null => Self::Unsupported("null".into()),
            Value::Bool(v) => Self::Unsupported(format!("boolean {v}")),
            Value::Number(v) => Self::Unsupported(format!("number {v}")),
        }
    }

    /// Classifies a string by its file suffix.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if is_vector_path(&text) || is_raster_path(&text) {
            Self::FilePath(PathBuf::from(text))
        } else {
            Self::WktText(text)
        }
    }

    fn coordinates_from_json(items: &[Value]) -> Self {
        let mut coordinates = Vec::with_capacity(items.len());
        for item in items {
            let pair = item.as_array().and_then(|pair| match pair.as_slice() {
                [x, y] => Some([x.as_f64()?, y.as_f64()?]),
                _ => None,
            });

            match pair {
                Some(pair) => coordinates.push(pair),
                None => {
                    return Self::Unsupported(format!("sequence item {item} is not an [x, y] pair"))
                }
            }
        }

        Self::Coordinates(coordinates)
    }

    /// Short name of the variant, used in log and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            LayerSource::FilePath(_) => "file path",
            LayerSource::WktText(_) => "WKT text",
            LayerSource::Coordinates(_) => "coordinate sequence",
            LayerSource::Dataset(_) => "vector dataset",
            LayerSource::Unsupported(_) => "unsupported value",
        }
    }
}

impl From<&str> for LayerSource {
    fn from(value: &str) -> Self {
        Self::from_text(value)
    }
}

impl From<Vec<[f64; 2]>> for LayerSource {
    fn from(value: Vec<[f64; 2]>) -> Self {
        Self::Coordinates(value)
    }
}

impl From<VectorDataset> for LayerSource {
    fn from(value: VectorDataset) -> Self {
        Self::Dataset(value)
    }
}

fn has_suffix(path: impl AsRef<Path>, suffixes: &[&str]) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| suffixes.iter().any(|s| s.eq_ignore_ascii_case(ext)))
}

/// Whether the path ends with one of [`VECTOR_SUFFIXES`] (case-insensitive).
pub fn is_vector_path(path: impl AsRef<Path>) -> bool {
    has_suffix(path, &VECTOR_SUFFIXES)
}

/// Whether the path ends with one of [`RASTER_SUFFIXES`] (case-insensitive).
pub fn is_raster_path(path: impl AsRef<Path>) -> bool {
    has_suffix(path, &RASTER_SUFFIXES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn strings_with_known_suffix_are_paths() {
        assert_matches!(LayerSource::from_json(json!("data/rivers.shp")), LayerSource::FilePath(p) if p == Path::new("data/rivers.shp"));
        assert_matches!(
            LayerSource::from_json(json!("dem.TIF")),
            LayerSource::FilePath(_)
        );
        assert_matches!(
            LayerSource::from_json(json!("zones.GeoJSON")),
            LayerSource::FilePath(_)
        );
    }

    #[test]
    fn other_strings_are_wkt() {
        assert_matches!(LayerSource::from_json(json!("POINT (30 10)")), LayerSource::WktText(t) if t == "POINT (30 10)");
        assert_matches!(
            LayerSource::from_json(json!("notes.txt")),
            LayerSource::WktText(_)
        );
    }

    #[test]
    fn coordinate_arrays() {
        assert_eq!(
            LayerSource::from_json(json!([[0, 0], [1.5, 2]])),
            LayerSource::Coordinates(vec![[0.0, 0.0], [1.5, 2.0]])
        );
        assert_eq!(
            LayerSource::from_json(json!([])),
            LayerSource::Coordinates(vec![])
        );
        assert_matches!(
            LayerSource::from_json(json!([[0, 0, 0]])),
            LayerSource::Unsupported(_)
        );
        assert_matches!(
            LayerSource::from_json(json!([["a", 1]])),
            LayerSource::Unsupported(_)
        );
    }

    #[test]
    fn geojson_objects_are_datasets() {
        let source = LayerSource::from_json(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
            "properties": {"name": "a"}
        }));
        assert_matches!(source, LayerSource::Dataset(ds) if ds.len() == 1 && ds.fields == vec!["name"]);
    }

    #[test]
    fn other_values_are_unsupported() {
        assert_matches!(LayerSource::from_json(json!(42)), LayerSource::Unsupported(_));
        assert_matches!(LayerSource::from_json(json!(null)), LayerSource::Unsupported(_));
        assert_matches!(
            LayerSource::from_json(json!({"foo": "bar"})),
            LayerSource::Unsupported(_)
        );
    }
}
