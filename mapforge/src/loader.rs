//! Readers for vector and raster files.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geojson::GeoJson;
use mapforge_types::{is_raster_path, AttributeValue, Feature, Rect, VectorDataset};
use shapefile::dbase::FieldValue;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::error::MapError;
use crate::raster::Raster;

const MODEL_PIXEL_SCALE_TAG: u16 = 33550;
const MODEL_TIEPOINT_TAG: u16 = 33922;
const GDAL_NODATA_TAG: u16 = 42113;

/// Decodes layer files.
///
/// The resolver only decides which method to call, the loader owns the file formats. Tests replace
/// it with in-memory fakes.
pub trait DataLoader {
    /// Decodes a vector file (shapefile or GeoJSON).
    fn load_vector(&self, path: &Path) -> Result<VectorDataset, MapError>;
    /// Decodes a raster file (GeoTIFF).
    fn load_raster(&self, path: &Path) -> Result<Raster, MapError>;
}

/// Loader reading files from the local file system.
#[derive(Debug, Default, Copy, Clone)]
pub struct FsDataLoader;

impl DataLoader for FsDataLoader {
    fn load_vector(&self, path: &Path) -> Result<VectorDataset, MapError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        let dataset = match extension.as_deref() {
            Some("shp") => read_shapefile(path)?,
            Some("geojson") => read_geojson(path)?,
            _ => {
                return Err(MapError::UnsupportedSourceType(format!(
                    "{} is not a vector file",
                    path.display()
                )))
            }
        };

        log::debug!(
            "Loaded {} features with {} fields from {}",
            dataset.len(),
            dataset.fields.len(),
            path.display()
        );

        Ok(dataset)
    }

    fn load_raster(&self, path: &Path) -> Result<Raster, MapError> {
        if !is_raster_path(path) {
            return Err(MapError::UnsupportedSourceType(format!(
                "{} is not a raster file",
                path.display()
            )));
        }

        let raster = read_geotiff(path)?;
        log::debug!(
            "Loaded {}x{} raster with {} bands from {}",
            raster.width(),
            raster.height(),
            raster.bands(),
            path.display()
        );

        Ok(raster)
    }
}

fn read_geojson(path: &Path) -> Result<VectorDataset, MapError> {
    let contents = std::fs::read_to_string(path).map_err(|err| MapError::decode(path, err))?;
    let geojson: GeoJson = contents.parse().map_err(|err| MapError::decode(path, err))?;
    VectorDataset::from_geojson(geojson).map_err(|err| MapError::decode(path, err))
}

fn read_shapefile(path: &Path) -> Result<VectorDataset, MapError> {
    let mut reader =
        shapefile::Reader::from_path(path).map_err(|err| MapError::decode(path, err))?;

    let mut fields: Vec<String> = vec![];
    let mut features = vec![];
    for item in reader.iter_shapes_and_records() {
        let (shape, record) = item.map_err(|err| MapError::decode(path, err))?;
        let geometry = match geo_types::Geometry::<f64>::try_from(shape) {
            Ok(geometry) => geometry,
            Err(err) => {
                log::debug!("Skipping shape without geometry in {}: {err}", path.display());
                continue;
            }
        };

        let mut attributes = HashMap::new();
        for (name, value) in record {
            if !fields.contains(&name) {
                fields.push(name.clone());
            }
            attributes.insert(name, field_value(value));
        }

        features.push(Feature {
            geometry,
            attributes,
        });
    }

    // dbase records are unordered maps
    fields.sort();

    Ok(VectorDataset::new(fields, features))
}

fn field_value(value: FieldValue) -> AttributeValue {
    match value {
        FieldValue::Character(Some(v)) | FieldValue::Memo(v) => AttributeValue::String(v),
        FieldValue::Numeric(Some(v)) | FieldValue::Double(v) | FieldValue::Currency(v) => {
            AttributeValue::Double(v)
        }
        FieldValue::Float(Some(v)) => AttributeValue::Double(v as f64),
        FieldValue::Integer(v) => AttributeValue::Int(v as i64),
        FieldValue::Logical(Some(v)) => AttributeValue::Bool(v),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None) => AttributeValue::Null,
        other => AttributeValue::String(format!("{other:?}")),
    }
}

fn read_geotiff(path: &Path) -> Result<Raster, MapError> {
    let file = File::open(path).map_err(|err| MapError::decode(path, err))?;
    let mut decoder =
        Decoder::new(BufReader::new(file)).map_err(|err| MapError::decode(path, err))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|err| MapError::decode(path, err))?;
    let color_type = decoder
        .colortype()
        .map_err(|err| MapError::decode(path, err))?;
    let bands = match color_type {
        tiff::ColorType::Gray(_) => 1,
        tiff::ColorType::GrayA(_) => 2,
        tiff::ColorType::RGB(_) => 3,
        tiff::ColorType::RGBA(_) => 4,
        other => {
            return Err(MapError::decode(
                path,
                format!("unsupported color type {other:?}"),
            ))
        }
    };

    let pixel_scale = decoder
        .get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE_TAG))
        .ok();
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TIEPOINT_TAG))
        .ok();
    let nodata = decoder
        .find_tag(Tag::from_u16_exhaustive(GDAL_NODATA_TAG))
        .ok()
        .flatten()
        .and_then(|value| value.into_string().ok())
        .and_then(|value| value.trim_end_matches('\0').trim().parse::<f64>().ok());

    let samples = match decoder
        .read_image()
        .map_err(|err| MapError::decode(path, err))?
    {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
    };

    let extent = georeferenced_extent(width, height, pixel_scale, tiepoint)
        .unwrap_or_else(|| Rect::new(0.0, 0.0, width as f64, height as f64));

    Raster::new(width, height, bands, samples, extent, nodata).ok_or_else(|| {
        MapError::decode(path, "sample count does not match the image dimensions")
    })
}

/// Extent from the GeoTIFF `ModelPixelScale` and `ModelTiepoint` tags.
fn georeferenced_extent(
    width: u32,
    height: u32,
    pixel_scale: Option<Vec<f64>>,
    tiepoint: Option<Vec<f64>>,
) -> Option<Rect> {
    let (pixel_scale, tiepoint) = (pixel_scale?, tiepoint?);
    let [scale_x, scale_y, ..] = pixel_scale[..] else {
        return None;
    };
    let [i, j, _, x, y, ..] = tiepoint[..] else {
        return None;
    };

    let x_min = x - i * scale_x;
    let y_max = y + j * scale_y;
    Some(Rect::new(
        x_min,
        y_max - height as f64 * scale_y,
        x_min + width as f64 * scale_x,
        y_max,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use geo_types::{point, Geometry};
    use std::io::Write;

    #[test]
    fn extent_from_tags() {
        let extent = georeferenced_extent(
            100,
            50,
            Some(vec![0.5, 0.25, 0.0]),
            Some(vec![0.0, 0.0, 0.0, 10.0, 20.0, 0.0]),
        )
        .unwrap();

        assert_eq!(extent, Rect::new(10.0, 7.5, 60.0, 20.0));
        assert!(georeferenced_extent(1, 1, None, Some(vec![0.0; 6])).is_none());
        assert!(georeferenced_extent(1, 1, Some(vec![1.0]), Some(vec![0.0; 6])).is_none());
    }

    #[test]
    fn loads_geojson_file() {
        let mut file = tempfile::Builder::new().suffix(".geojson").tempfile().unwrap();
        write!(
            file,
            r#"{{"type": "FeatureCollection", "features": [
                {{"type": "Feature", "geometry": {{"type": "Point", "coordinates": [3, 4]}},
                  "properties": {{"name": "a"}}}}
            ]}}"#
        )
        .unwrap();

        let dataset = FsDataLoader.load_vector(file.path()).unwrap();
        assert_eq!(dataset.fields, vec!["name"]);
        assert_eq!(
            dataset.features[0].geometry,
            Geometry::Point(point!(x: 3.0, y: 4.0))
        );
    }

    #[test]
    fn missing_file_is_decode_failure() {
        assert_matches!(
            FsDataLoader.load_vector(Path::new("/nonexistent/rivers.shp")),
            Err(MapError::DecodeFailure { .. })
        );
        assert_matches!(
            FsDataLoader.load_raster(Path::new("/nonexistent/dem.tif")),
            Err(MapError::DecodeFailure { .. })
        );
    }

    #[test]
    fn invalid_geojson_is_decode_failure() {
        let mut file = tempfile::Builder::new().suffix(".geojson").tempfile().unwrap();
        write!(file, "not json").unwrap();

        assert_matches!(
            FsDataLoader.load_vector(file.path()),
            Err(MapError::DecodeFailure { .. })
        );
    }
}
