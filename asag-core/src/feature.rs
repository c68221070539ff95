//! GeoJSON features produced from NeTEx entities.

use std::collections::BTreeMap;

use geo::{LineString, Point};
use geojson::{JsonObject, JsonValue};

/// A property value: either plain text or a list of texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// A string property.
    Text(String),
    /// A string array property.
    List(Vec<String>),
}

impl PropertyValue {
    /// Borrow the text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::List(_) => None,
        }
    }

    fn to_json(&self) -> JsonValue {
        match self {
            Self::Text(text) => JsonValue::String(text.clone()),
            Self::List(items) => {
                JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
            }
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Geometry of a feature, in `(lon, lat)` order.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    /// A single position.
    Point(Point<f64>),
    /// A polygon without holes, given by its exterior ring.
    ///
    /// The ring is emitted exactly as read; an open ring stays open.
    Polygon(LineString<f64>),
}

impl FeatureGeometry {
    fn to_geojson(&self) -> geojson::Geometry {
        let value = match self {
            Self::Point(point) => geojson::Value::Point(vec![point.x(), point.y()]),
            Self::Polygon(ring) => geojson::Value::Polygon(vec![
                ring.coords()
                    .map(|coord| vec![coord.x, coord.y])
                    .collect(),
            ]),
        };
        geojson::Geometry::new(value)
    }
}

/// One output feature.
///
/// Properties are kept in a sorted map so output is stable across runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Entity id.
    pub id: String,
    /// Required geometry.
    pub geometry: FeatureGeometry,
    /// String-valued properties.
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Feature {
    /// Create a feature without properties.
    pub fn new(id: impl Into<String>, geometry: FeatureGeometry) -> Self {
        Self {
            id: id.into(),
            geometry,
            properties: BTreeMap::new(),
        }
    }

    /// Set a property, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<PropertyValue>) {
        self.properties.insert(key.to_owned(), value.into());
    }

    /// Set a text property when `value` is present and not blank.
    pub fn set_non_empty(&mut self, key: &str, value: Option<&str>) {
        if let Some(text) = value.filter(|text| !text.trim().is_empty()) {
            self.set(key, text);
        }
    }

    /// Read a text property.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(PropertyValue::as_text)
    }

    /// Convert into a `geojson` feature ready for serialisation.
    #[must_use]
    pub fn to_geojson(&self) -> geojson::Feature {
        let properties: JsonObject = self
            .properties
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        geojson::Feature {
            bbox: None,
            geometry: Some(self.geometry.to_geojson()),
            id: Some(geojson::feature::Id::String(self.id.clone())),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}
