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

//! Coordinate reference systems and reprojection.
//!
//! Only the two systems a slippy map needs are supported: Web Mercator
//! (`EPSG:3857`, metres, used for rendering and hit-testing) and WGS84
//! geographic coordinates (`EPSG:4326`, degrees, used for KML input and
//! `geo:` URIs).

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// WGS84 semi-major axis in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Half the width of the Web Mercator world in metres.
pub const HALF_WORLD: f64 = PI * EARTH_RADIUS;

/// Latitude limit of the square Web Mercator world.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("unsupported projection code: {0}")]
    UnknownCode(String),
}

/// A 2D position. The projection it belongs to is tracked by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Supported coordinate reference systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Projection {
    /// Spherical Web Mercator, metres.
    WebMercator,
    /// WGS84 longitude/latitude, degrees.
    Geographic,
}

impl Projection {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::WebMercator => "EPSG:3857",
            Self::Geographic => "EPSG:4326",
        }
    }

    /// Reproject a single coordinate from `self` into `target`.
    #[must_use]
    pub fn transform(self, coord: Coordinate, target: Projection) -> Coordinate {
        match (self, target) {
            (Self::WebMercator, Self::Geographic) => mercator_to_lon_lat(coord),
            (Self::Geographic, Self::WebMercator) => lon_lat_to_mercator(coord),
            _ => coord,
        }
    }
}

impl FromStr for Projection {
    type Err = ProjectionError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code.trim().to_ascii_uppercase().as_str() {
            "EPSG:3857" | "EPSG:900913" | "EPSG:102100" => Ok(Self::WebMercator),
            "EPSG:4326" | "CRS:84" => Ok(Self::Geographic),
            _ => Err(ProjectionError::UnknownCode(code.to_string())),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Reproject by projection codes, e.g. `transform(c, "EPSG:3857", "EPSG:4326")`.
pub fn transform(coord: Coordinate, source: &str, target: &str) -> Result<Coordinate, ProjectionError> {
    let source: Projection = source.parse()?;
    let target: Projection = target.parse()?;
    Ok(source.transform(coord, target))
}

fn mercator_to_lon_lat(coord: Coordinate) -> Coordinate {
    let lon = (coord.x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (coord.y / EARTH_RADIUS).exp().atan() - FRAC_PI_2).to_degrees();
    Coordinate::new(lon, lat)
}

fn lon_lat_to_mercator(coord: Coordinate) -> Coordinate {
    let lat = coord.y.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
    let x = EARTH_RADIUS * coord.x.to_radians();
    let y = EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    Coordinate::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_parse_codes() {
        assert_eq!("EPSG:3857".parse::<Projection>(), Ok(Projection::WebMercator));
        assert_eq!("epsg:4326".parse::<Projection>(), Ok(Projection::Geographic));
        assert!("EPSG:27700".parse::<Projection>().is_err());
    }

    #[test]
    fn test_origin_maps_to_origin() {
        let c = Projection::WebMercator.transform(Coordinate::new(0.0, 0.0), Projection::Geographic);
        assert_eq!(c, Coordinate::new(0.0, 0.0));
    }

    #[test]
    fn test_world_edge_is_180_degrees() {
        let c = Projection::WebMercator.transform(Coordinate::new(HALF_WORLD, 0.0), Projection::Geographic);
        assert!(close(c.x, 180.0, 1e-9));
    }

    #[test]
    fn test_round_trip_berlin() {
        let berlin = Coordinate::new(13.404_954, 52.520_008);
        let merc = Projection::Geographic.transform(berlin, Projection::WebMercator);
        assert!(close(merc.x, 1_492_232.65, 0.01));
        assert!(close(merc.y, 6_894_701.26, 0.01));

        let back = transform(merc, "EPSG:3857", "EPSG:4326").unwrap();
        assert!(close(back.x, berlin.x, 1e-9));
        assert!(close(back.y, berlin.y, 1e-9));
    }

    #[test]
    fn test_identity_transform() {
        let c = Coordinate::new(12.5, -3.25);
        assert_eq!(Projection::Geographic.transform(c, Projection::Geographic), c);
    }
}
