// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Vector features: named attributes plus a geometry.

use std::collections::HashMap;

use crate::projection::{Coordinate, Projection};

/// Attribute key for the display name of a feature.
pub const NAME: &str = "name";

/// Feature geometry. Coordinates are in whatever projection the owning
/// layer uses (Web Mercator for features loaded through [`crate::kml`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coordinate),
    LineString(Vec<Coordinate>),
    /// Outer ring first, then holes.
    Polygon(Vec<Vec<Coordinate>>),
    Multi(Vec<Geometry>),
}

impl Geometry {
    /// Return a reprojected copy. The original is left untouched.
    #[must_use]
    pub fn transform(&self, source: Projection, target: Projection) -> Geometry {
        let f = |c: &Coordinate| source.transform(*c, target);
        match self {
            Self::Point(c) => Self::Point(f(c)),
            Self::LineString(line) => Self::LineString(line.iter().map(f).collect()),
            Self::Polygon(rings) => {
                Self::Polygon(rings.iter().map(|ring| ring.iter().map(f).collect()).collect())
            }
            Self::Multi(parts) => {
                Self::Multi(parts.iter().map(|g| g.transform(source, target)).collect())
            }
        }
    }

    /// First coordinate in document order, if the geometry has any.
    #[must_use]
    pub fn first_coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Point(c) => Some(*c),
            Self::LineString(line) => line.first().copied(),
            Self::Polygon(rings) => rings.first().and_then(|r| r.first().copied()),
            Self::Multi(parts) => parts.iter().find_map(Geometry::first_coordinate),
        }
    }
}

/// A single map feature with string attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    attributes: HashMap<String, String>,
    geometry: Geometry,
}

impl Feature {
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            attributes: HashMap::new(),
            geometry,
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Attribute lookup. Empty values count as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get(NAME)
    }

    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_attribute_is_absent() {
        let feature = Feature::new(Geometry::Point(Coordinate::default()))
            .with("name", "Quake A")
            .with("website", "");

        assert_eq!(feature.name(), Some("Quake A"));
        assert_eq!(feature.get("website"), None);
        assert_eq!(feature.get("phone"), None);
    }

    #[test]
    fn test_transform_leaves_original_untouched() {
        let geometry = Geometry::LineString(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1_000_000.0, 0.0),
        ]);
        let projected = geometry.transform(Projection::WebMercator, Projection::Geographic);

        assert_eq!(geometry.first_coordinate(), Some(Coordinate::new(0.0, 0.0)));
        let Geometry::LineString(line) = projected else {
            panic!("expected line string");
        };
        assert!((line[1].x - 8.983_152_841_195_214).abs() < 1e-9);
    }

    #[test]
    fn test_first_coordinate_of_multi() {
        let geometry = Geometry::Multi(vec![
            Geometry::LineString(vec![]),
            Geometry::Polygon(vec![vec![Coordinate::new(3.0, 4.0), Coordinate::new(5.0, 6.0)]]),
        ]);
        assert_eq!(geometry.first_coordinate(), Some(Coordinate::new(3.0, 4.0)));
    }
}
