//! Region features as delivered by the statistics backend.
//!
//! The wire shape is a GeoJSON-like collection:
//! `{type, features:[{id, type, geometry:{type:"Polygon", coordinates}, properties}]}`.
//! Only `properties` varies per statistic type, so everything here is generic
//! over the properties payload `P`.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, AtlasResult};
use crate::extent::Extent;

/// Region identifier, stable across datasets and survey years.
///
/// Backends emit either numeric administrative codes or string keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Code(i64),
    Key(String),
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureId::Code(code) => write!(f, "{}", code),
            FeatureId::Key(key) => write!(f, "{}", key),
        }
    }
}

impl From<i64> for FeatureId {
    fn from(code: i64) -> Self {
        FeatureId::Code(code)
    }
}

impl From<&str> for FeatureId {
    fn from(key: &str) -> Self {
        FeatureId::Key(key.to_string())
    }
}

/// A map coordinate. Extra ordinates (altitude) in the input are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(v: Vec<f64>) -> Result<Self, Self::Error> {
        if v.len() < 2 {
            return Err(format!("position needs at least 2 ordinates, got {}", v.len()));
        }
        Ok(Self { x: v[0], y: v[1] })
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.x, p.y]
    }
}

/// A closed ring of positions. The closing position may or may not repeat the first.
pub type Ring = Vec<Position>;

/// Polygon geometry. Ring 0 is the outer boundary, later rings are holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Ring> },
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
}

impl Geometry {
    pub fn polygon(rings: Vec<Ring>) -> Self {
        Geometry::Polygon { coordinates: rings }
    }

    /// Iterate the polygons of this geometry as ring slices.
    pub fn polygons(&self) -> Box<dyn Iterator<Item = &[Ring]> + '_> {
        match self {
            Geometry::Polygon { coordinates } => Box::new(std::iter::once(coordinates.as_slice())),
            Geometry::MultiPolygon { coordinates } => {
                Box::new(coordinates.iter().map(|p| p.as_slice()))
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons()
            .all(|rings| rings.first().map_or(true, |outer| outer.len() < 3))
    }

    pub fn extent(&self) -> Extent {
        let mut extent = Extent::empty();
        for rings in self.polygons() {
            for ring in rings {
                for p in ring {
                    extent.expand(p.x, p.y);
                }
            }
        }
        extent
    }
}

/// One region with its statistic payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature<P> {
    pub id: FeatureId,
    pub geometry: Geometry,
    pub properties: P,
}

impl<P> Feature<P> {
    pub fn new(id: impl Into<FeatureId>, geometry: Geometry, properties: P) -> Self {
        Self {
            id: id.into(),
            geometry,
            properties,
        }
    }
}

/// Ordered, immutable-per-render sequence of features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection<P> {
    #[serde(rename = "type", default = "default_collection_type")]
    pub kind: String,
    pub features: Vec<Feature<P>>,
}

fn default_collection_type() -> String {
    "FeatureCollection".to_string()
}

impl<P> FeatureCollection<P> {
    pub fn new(features: Vec<Feature<P>>) -> Self {
        Self {
            kind: default_collection_type(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature<P>> {
        self.features.iter()
    }

    /// Linear lookup. Layers keep their own id index for per-event access.
    pub fn get(&self, id: &FeatureId) -> Option<&Feature<P>> {
        self.features.iter().find(|f| &f.id == id)
    }

    pub fn position(&self, id: &FeatureId) -> Option<usize> {
        self.features.iter().position(|f| &f.id == id)
    }

    /// Combined extent of every feature geometry.
    pub fn extent(&self) -> Extent {
        let mut extent = Extent::empty();
        for feature in &self.features {
            let e = feature.geometry.extent();
            if !e.is_empty() {
                extent.expand(e.min_x, e.min_y);
                extent.expand(e.max_x, e.max_y);
            }
        }
        extent
    }

    /// Ensure every feature id is unique.
    pub fn validate(&self) -> AtlasResult<()> {
        let mut seen = HashSet::with_capacity(self.features.len());
        for feature in &self.features {
            if !seen.insert(&feature.id) {
                return Err(AtlasError::Parse {
                    what: "feature collection".to_string(),
                    message: format!("duplicate feature id {}", feature.id),
                });
            }
        }
        Ok(())
    }
}

impl<P: DeserializeOwned> FeatureCollection<P> {
    /// Parse and validate a feature collection from JSON.
    pub fn from_json(json: &str) -> AtlasResult<Self> {
        let collection: Self = serde_json::from_str(json).map_err(|e| AtlasError::Parse {
            what: "feature collection".to_string(),
            message: e.to_string(),
        })?;
        collection.validate()?;
        tracing::debug!(features = collection.len(), "parsed feature collection");
        Ok(collection)
    }

    /// Load a feature collection from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> AtlasResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

impl<'a, P> IntoIterator for &'a FeatureCollection<P> {
    type Item = &'a Feature<P>;
    type IntoIter = std::slice::Iter<'a, Feature<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_parse_mixed_ids_and_altitude() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"id": 110101, "type": "Feature",
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0,5],[1,0,5],[1,1,5],[0,0,5]]]},
                 "properties": {"name": "A"}},
                {"id": "r-2", "type": "Feature",
                 "geometry": {"type": "MultiPolygon", "coordinates": [[[[2,2],[3,2],[3,3],[2,2]]]]},
                 "properties": {"name": "B"}}
            ]
        }"#;

        let collection: FeatureCollection<Value> = FeatureCollection::from_json(json).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.features[0].id, FeatureId::Code(110101));
        assert_eq!(collection.features[1].id, FeatureId::Key("r-2".into()));
        assert_eq!(collection.extent(), Extent::new(0.0, 0.0, 3.0, 3.0));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{"features": [
            {"id": 1, "geometry": {"type": "Polygon", "coordinates": []}, "properties": null},
            {"id": 1, "geometry": {"type": "Polygon", "coordinates": []}, "properties": null}
        ]}"#;
        let err = FeatureCollection::<Value>::from_json(json).unwrap_err();
        assert!(err.to_string().contains("duplicate feature id 1"));
    }

    #[test]
    fn test_empty_geometry() {
        let geometry = Geometry::polygon(vec![]);
        assert!(geometry.is_empty());
        assert!(geometry.extent().is_empty());
    }
}
