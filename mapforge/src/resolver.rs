//! Turns layer descriptions into decoded geometry, datasets or rasters.

use geo_types::{Coord, Geometry, LineString, Point, Polygon};
use geozero::wkt::Wkt;
use geozero::ToGeo;
use mapforge_types::{
    is_raster_path, is_vector_path, LayerDescription, LayerSource, StyleOptions, VectorDataset,
};

use crate::error::MapError;
use crate::loader::DataLoader;
use crate::raster::Raster;

/// Renderer a layer is resolved for. Some sources are only supported by one of them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderPath {
    /// Image or SVG export.
    Static,
    /// Browser document.
    Interactive,
}

/// What kind of value a layer resolved to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerKind {
    /// Single geometry from WKT or coordinates.
    VectorGeometry,
    /// Decoded raster file.
    Raster,
    /// Features with attributes.
    VectorDataset,
}

/// Decoded layer value.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedData {
    /// Geometry parsed from WKT or coordinates.
    Geometry(Geometry<f64>),
    /// Decoded raster file.
    Raster(Raster),
    /// Features of a vector file or an in-memory dataset.
    Dataset(VectorDataset),
}

/// Layer ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayer {
    /// What the source resolved to.
    pub kind: LayerKind,
    /// Resolved data.
    pub data: ResolvedData,
    /// Style of the layer description.
    pub style: StyleOptions,
    /// Legend label of the layer description.
    pub label: Option<String>,
}

impl ResolvedLayer {
    fn new(kind: LayerKind, data: ResolvedData, style: &StyleOptions) -> Self {
        Self {
            kind,
            data,
            style: style.clone(),
            label: style.label.clone(),
        }
    }
}

/// Resolves one layer.
///
/// The source shape alone selects the branch: file suffix, then text, then coordinate count.
/// Nothing is read except through `loader`, so with a pure loader the result only depends on the
/// layer.
pub fn resolve(
    layer: &LayerDescription,
    path: RenderPath,
    loader: &dyn DataLoader,
) -> Result<ResolvedLayer, MapError> {
    log::debug!(
        "Resolving {} layer for the {path:?} renderer",
        layer.data.kind_name()
    );

    let style = &layer.style;
    match &layer.data {
        LayerSource::FilePath(file) if is_vector_path(file) => {
            let dataset = loader.load_vector(file)?;
            Ok(ResolvedLayer::new(
                LayerKind::VectorDataset,
                ResolvedData::Dataset(dataset),
                style,
            ))
        }
        LayerSource::FilePath(file) if is_raster_path(file) => match path {
            RenderPath::Static => {
                let raster = loader.load_raster(file)?;
                Ok(ResolvedLayer::new(
                    LayerKind::Raster,
                    ResolvedData::Raster(raster),
                    style,
                ))
            }
            RenderPath::Interactive => Err(MapError::UnsupportedSourceType(format!(
                "raster file {} cannot be added to a web map",
                file.display()
            ))),
        },
        LayerSource::FilePath(file) => {
            let geometry = parse_wkt(&file.to_string_lossy())?;
            Ok(ResolvedLayer::new(
                LayerKind::VectorGeometry,
                ResolvedData::Geometry(geometry),
                style,
            ))
        }
        LayerSource::WktText(text) => {
            let geometry = parse_wkt(text)?;
            Ok(ResolvedLayer::new(
                LayerKind::VectorGeometry,
                ResolvedData::Geometry(geometry),
                style,
            ))
        }
        LayerSource::Coordinates(coordinates) => {
            let geometry = geometry_from_coordinates(coordinates)?;
            Ok(ResolvedLayer::new(
                LayerKind::VectorGeometry,
                ResolvedData::Geometry(geometry),
                style,
            ))
        }
        LayerSource::Dataset(dataset) => match path {
            RenderPath::Interactive => Ok(ResolvedLayer::new(
                LayerKind::VectorDataset,
                ResolvedData::Dataset(dataset.clone()),
                style,
            )),
            RenderPath::Static => Err(MapError::UnsupportedSourceType(format!(
                "in-memory {} layers are only supported by the web map",
                layer.data.kind_name()
            ))),
        },
        LayerSource::Unsupported(description) => {
            Err(MapError::UnsupportedSourceType(description.clone()))
        }
    }
}

fn parse_wkt(text: &str) -> Result<Geometry<f64>, MapError> {
    Wkt(text)
        .to_geo()
        .map_err(|err| MapError::MalformedGeometryText(format!("'{text}': {err}")))
}

/// More than two points make a polygon (the ring is closed by the constructor), two make a line,
/// one makes a point.
pub fn geometry_from_coordinates(coordinates: &[[f64; 2]]) -> Result<Geometry<f64>, MapError> {
    let coords: Vec<Coord<f64>> = coordinates
        .iter()
        .map(|&[x, y]| Coord { x, y })
        .collect();

    match coords.len() {
        0 => Err(MapError::UnsupportedSourceType(
            "empty coordinate sequence".into(),
        )),
        1 => Ok(Geometry::Point(Point(coords[0]))),
        2 => Ok(Geometry::LineString(LineString::new(coords))),
        _ => Ok(Geometry::Polygon(Polygon::new(
            LineString::new(coords),
            vec![],
        ))),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use geo_types::point;
    use mapforge_types::{Feature, Rect};
    use std::path::Path;

    /// Loader returning fixed values without touching the file system.
    pub(crate) struct FakeLoader;

    impl DataLoader for FakeLoader {
        fn load_vector(&self, path: &Path) -> Result<VectorDataset, MapError> {
            if path.starts_with("/missing") {
                return Err(MapError::decode(path, "no such file"));
            }

            Ok(VectorDataset::new(
                vec!["name".into()],
                vec![Feature::new(Geometry::Point(point!(x: 1.0, y: 2.0)))],
            ))
        }

        fn load_raster(&self, _path: &Path) -> Result<Raster, MapError> {
            Ok(
                Raster::new(1, 1, 1, vec![1.0], Rect::new(0.0, 0.0, 1.0, 1.0), None)
                    .expect("valid raster"),
            )
        }
    }

    fn resolve_static(layer: LayerDescription) -> Result<ResolvedLayer, MapError> {
        resolve(&layer, RenderPath::Static, &FakeLoader)
    }

    #[test]
    fn coordinate_branches() {
        let polygon = resolve_static(LayerDescription::new(vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
        ]))
        .unwrap();
        assert_eq!(polygon.kind, LayerKind::VectorGeometry);
        assert_matches!(polygon.data, ResolvedData::Geometry(Geometry::Polygon(p)) if p.exterior().0.len() == 5);

        let line = resolve_static(LayerDescription::new(vec![[0.0, 0.0], [1.0, 1.0]])).unwrap();
        assert_matches!(line.data, ResolvedData::Geometry(Geometry::LineString(l)) if l.0.len() == 2);

        let point = resolve_static(LayerDescription::new(vec![[3.0, 4.0]])).unwrap();
        assert_eq!(
            point.data,
            ResolvedData::Geometry(Geometry::Point(point!(x: 3.0, y: 4.0)))
        );

        assert_matches!(
            resolve_static(LayerDescription::new(Vec::<[f64; 2]>::new())),
            Err(MapError::UnsupportedSourceType(_))
        );
    }

    #[test]
    fn wkt_point() {
        let layer = LayerDescription::new("POINT (30 10)")
            .with_style(StyleOptions::new().with_label("P"));
        let resolved = resolve_static(layer).unwrap();

        assert_eq!(resolved.kind, LayerKind::VectorGeometry);
        assert_eq!(resolved.label.as_deref(), Some("P"));
        assert_eq!(
            resolved.data,
            ResolvedData::Geometry(Geometry::Point(point!(x: 30.0, y: 10.0)))
        );
    }

    #[test]
    fn malformed_wkt() {
        assert_matches!(
            resolve_static(LayerDescription::new("POINT (30")),
            Err(MapError::MalformedGeometryText(_))
        );
        assert_matches!(
            resolve_static(LayerDescription::new("hello world")),
            Err(MapError::MalformedGeometryText(_))
        );
    }

    #[test]
    fn unknown_file_suffix_is_parsed_as_wkt() {
        let layer = LayerDescription {
            data: LayerSource::FilePath("notes.txt".into()),
            style: StyleOptions::default(),
        };
        assert_matches!(
            resolve_static(layer),
            Err(MapError::MalformedGeometryText(_))
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let layer = LayerDescription::new("POLYGON ((0 0, 4 0, 4 4, 0 0))");
        assert_eq!(resolve_static(layer.clone()).unwrap(), resolve_static(layer).unwrap());

        let layer = LayerDescription::new(vec![[0.0, 0.0], [2.0, 1.0], [1.0, 3.0]]);
        assert_eq!(resolve_static(layer.clone()).unwrap(), resolve_static(layer).unwrap());
    }

    #[test]
    fn files_go_through_loader() {
        let vector = resolve_static(LayerDescription::new("rivers.shp")).unwrap();
        assert_eq!(vector.kind, LayerKind::VectorDataset);

        let raster = resolve_static(LayerDescription::new("dem.tif")).unwrap();
        assert_eq!(raster.kind, LayerKind::Raster);

        assert_matches!(
            resolve_static(LayerDescription::new("/missing/rivers.geojson")),
            Err(MapError::DecodeFailure { .. })
        );
    }

    #[test]
    fn path_specific_sources() {
        let raster = LayerDescription::new("dem.tiff");
        assert_matches!(
            resolve(&raster, RenderPath::Interactive, &FakeLoader),
            Err(MapError::UnsupportedSourceType(_))
        );

        let dataset = LayerDescription::new(VectorDataset::from_geometry(Geometry::Point(
            point!(x: 0.0, y: 0.0),
        )));
        assert_matches!(
            resolve(&dataset, RenderPath::Static, &FakeLoader),
            Err(MapError::UnsupportedSourceType(msg)) if msg.contains("vector dataset")
        );
        let resolved = resolve(&dataset, RenderPath::Interactive, &FakeLoader).unwrap();
        assert_eq!(resolved.kind, LayerKind::VectorDataset);
        assert_eq!(resolved.data, ResolvedData::Dataset(match dataset.data {
            LayerSource::Dataset(ds) => ds,
            _ => unreachable!(),
        }));
    }

    #[test]
    fn unsupported_source() {
        let layer = LayerDescription {
            data: LayerSource::Unsupported("number 42".into()),
            style: StyleOptions::default(),
        };
        assert_matches!(
            resolve(&layer, RenderPath::Interactive, &FakeLoader),
            Err(MapError::UnsupportedSourceType(msg)) if msg == "number 42"
        );
    }
}
