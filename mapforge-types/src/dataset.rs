//! In-memory vector dataset: a table of features with a geometry column and attribute columns.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use geojson::{FeatureCollection, GeoJson, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Value of a single attribute field of a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Text value.
    String(String),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Double(f64),
    /// Boolean value.
    Bool(bool),
    /// Missing value.
    Null,
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::String(v) => write!(f, "{v}"),
            AttributeValue::Int(v) => write!(f, "{v}"),
            AttributeValue::Double(v) => write!(f, "{v}"),
            AttributeValue::Bool(v) => write!(f, "{v}"),
            AttributeValue::Null => write!(f, "<NONE>"),
        }
    }
}

impl From<&JsonValue> for AttributeValue {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(v) => Self::Bool(*v),
            JsonValue::Number(n) => match n.as_i64() {
                Some(v) => Self::Int(v),
                None => Self::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(v) => Self::String(v.clone()),
            other => Self::String(other.to_string()),
        }
    }
}

impl From<&AttributeValue> for JsonValue {
    fn from(value: &AttributeValue) -> Self {
        match value {
            AttributeValue::String(v) => JsonValue::String(v.clone()),
            AttributeValue::Int(v) => JsonValue::from(*v),
            AttributeValue::Double(v) => JsonValue::from(*v),
            AttributeValue::Bool(v) => JsonValue::Bool(*v),
            AttributeValue::Null => JsonValue::Null,
        }
    }
}

/// One row of a [`VectorDataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Geometry of the feature.
    pub geometry: geo_types::Geometry<f64>,
    /// Attribute values by field name.
    pub attributes: HashMap<String, AttributeValue>,
}

impl Feature {
    /// Creates a feature without attributes.
    pub fn new(geometry: geo_types::Geometry<f64>) -> Self {
        Self {
            geometry,
            attributes: HashMap::new(),
        }
    }

    /// Adds an attribute value to the feature.
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

/// Already decoded vector data: features sharing one set of attribute fields.
///
/// `fields` keeps the column order of the source, the geometry column is never part of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorDataset {
    /// Attribute field names in source order.
    pub fields: Vec<String>,
    /// Rows of the table.
    pub features: Vec<Feature>,
}

impl VectorDataset {
    /// Creates a dataset with the given attribute field names.
    pub fn new(fields: Vec<String>, features: Vec<Feature>) -> Self {
        Self { fields, features }
    }

    /// Creates a dataset with a single feature without attributes.
    pub fn from_geometry(geometry: geo_types::Geometry<f64>) -> Self {
        Self {
            fields: vec![],
            features: vec![Feature::new(geometry)],
        }
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the dataset has no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Converts a parsed GeoJSON document into a dataset.
    ///
    /// Features without geometry are skipped. Field order is the order in which property names
    /// are first seen.
    pub fn from_geojson(geojson: GeoJson) -> Result<Self, TypesError> {
        let features = match geojson {
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(geometry) => {
                let geometry = geo_types::Geometry::<f64>::try_from(geometry)
                    .map_err(|err| TypesError::Conversion(err.to_string()))?;
                return Ok(Self::from_geometry(geometry));
            }
        };

        let mut fields: Vec<String> = vec![];
        let mut converted = Vec::with_capacity(features.len());
        for feature in features {
            let Some(geometry) = feature.geometry else {
                continue;
            };

            let geometry = geo_types::Geometry::<f64>::try_from(geometry)
                .map_err(|err| TypesError::Conversion(err.to_string()))?;

            let mut attributes = HashMap::new();
            for (name, value) in feature.properties.into_iter().flatten() {
                if !fields.contains(&name) {
                    fields.push(name.clone());
                }
                attributes.insert(name, AttributeValue::from(&value));
            }

            converted.push(Feature {
                geometry,
                attributes,
            });
        }

        Ok(Self {
            fields,
            features: converted,
        })
    }

    /// Converts the dataset into a GeoJSON feature collection. Only the declared `fields` are
    /// written as properties.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .features
            .iter()
            .map(|feature| {
                let mut properties = JsonObject::new();
                for field in &self.fields {
                    let value = feature
                        .attributes
                        .get(field)
                        .map(JsonValue::from)
                        .unwrap_or(JsonValue::Null);
                    properties.insert(field.clone(), value);
                }

                geojson::Feature {
                    bbox: None,
                    geometry: Some(geojson::Geometry::new(geojson::Value::from(
                        &feature.geometry,
                    ))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use geo_types::{point, Geometry};

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
                "properties": {"name": "first", "population": 10}
            },
            {
                "type": "Feature",
                "geometry": null,
                "properties": {"name": "no geometry"}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [3.0, 4.0]},
                "properties": {"name": "second", "area": 1.5}
            }
        ]
    }"#;

    #[test]
    fn from_feature_collection() {
        let geojson: GeoJson = COLLECTION.parse().unwrap();
        let dataset = VectorDataset::from_geojson(geojson).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.fields, vec!["name", "population", "area"]);
        assert_eq!(
            dataset.features[0].geometry,
            Geometry::Point(point!(x: 1.0, y: 2.0))
        );
        assert_eq!(
            dataset.features[1].attributes.get("area"),
            Some(&AttributeValue::Double(1.5))
        );
        assert_matches!(
            dataset.features[0].attributes.get("population"),
            Some(AttributeValue::Int(10))
        );
    }

    #[test]
    fn from_bare_geometry() {
        let geojson: GeoJson = r#"{"type": "Point", "coordinates": [5.0, 6.0]}"#
            .parse()
            .unwrap();
        let dataset = VectorDataset::from_geojson(geojson).unwrap();

        assert!(dataset.fields.is_empty());
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn to_feature_collection_writes_declared_fields() {
        let dataset = VectorDataset::new(
            vec!["name".into(), "missing".into()],
            vec![Feature::new(Geometry::Point(point!(x: 1.0, y: 1.0)))
                .with_attribute("name", AttributeValue::String("a".into()))],
        );

        let collection = dataset.to_feature_collection();
        let properties = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(properties.get("name"), Some(&JsonValue::from("a")));
        assert_eq!(properties.get("missing"), Some(&JsonValue::Null));
    }
}
