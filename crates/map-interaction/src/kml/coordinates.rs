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

use super::KmlError;
use crate::projection::Coordinate;

/// Parse the body of a `<coordinates>` element.
///
/// Tuples are `lon,lat[,alt]` separated by whitespace. Altitude is dropped.
/// Returned coordinates are WGS84 degrees (x = longitude).
pub fn parse_coordinates(text: &str) -> Result<Vec<Coordinate>, KmlError> {
    text.split_whitespace().map(parse_tuple).collect()
}

fn parse_tuple(tuple: &str) -> Result<Coordinate, KmlError> {
    let mut parts = tuple.split(',').map(str::trim);
    let mut next = || -> Result<f64, KmlError> {
        parts
            .next()
            .and_then(|p| p.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .ok_or_else(|| KmlError::Coordinates(tuple.to_string()))
    };
    let lon = next()?;
    let lat = next()?;
    Ok(Coordinate::new(lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_altitude() {
        let coords = parse_coordinates("  13.4,52.5,0\n\t-0.1275,51.507222 ").unwrap();
        assert_eq!(
            coords,
            vec![Coordinate::new(13.4, 52.5), Coordinate::new(-0.1275, 51.507_222)]
        );
    }

    #[test]
    fn test_empty_body() {
        assert!(parse_coordinates(" \n ").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_garbage() {
        let err = parse_coordinates("13.4,abc").unwrap_err();
        assert!(matches!(err, KmlError::Coordinates(ref t) if t == "13.4,abc"));
        assert!(parse_coordinates("13.4").is_err());
    }
}
