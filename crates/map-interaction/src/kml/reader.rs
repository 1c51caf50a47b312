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

use std::collections::HashMap;

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{parse_coordinates, KmlError, KmlOptions};
use crate::feature::{Feature, Geometry};
use crate::projection::{Coordinate, Projection};

/// Geometry under construction, innermost last.
#[derive(Debug)]
enum GeometryFrame {
    Point(Option<Coordinate>),
    LineString(Vec<Coordinate>),
    LinearRing(Vec<Coordinate>),
    Polygon(Vec<Vec<Coordinate>>),
    Multi(Vec<Geometry>),
}

impl GeometryFrame {
    fn open(local_name: &[u8]) -> Option<Self> {
        match local_name {
            b"Point" => Some(Self::Point(None)),
            b"LineString" => Some(Self::LineString(Vec::new())),
            b"LinearRing" => Some(Self::LinearRing(Vec::new())),
            b"Polygon" => Some(Self::Polygon(Vec::new())),
            b"MultiGeometry" => Some(Self::Multi(Vec::new())),
            _ => None,
        }
    }

    fn set_coordinates(&mut self, coords: Vec<Coordinate>) {
        match self {
            Self::Point(point) => *point = coords.into_iter().next(),
            Self::LineString(line) | Self::LinearRing(line) => *line = coords,
            Self::Polygon(_) | Self::Multi(_) => {}
        }
    }
}

/// Placemark under construction.
#[derive(Debug, Default)]
struct PlacemarkBuilder {
    attributes: HashMap<String, String>,
    geometry: Option<Geometry>,
}

impl PlacemarkBuilder {
    fn finish(self) -> Option<Feature> {
        let geometry = self.geometry?;
        let mut feature = Feature::new(geometry);
        for (key, value) in self.attributes {
            feature.set(key, value);
        }
        Some(feature)
    }
}

/// Streaming KML reader.
#[derive(Debug, Default)]
pub struct KmlReader {
    options: KmlOptions,
}

impl KmlReader {
    #[must_use]
    pub fn new(options: KmlOptions) -> Self {
        Self { options }
    }

    /// Read every placemark with a geometry from `text`.
    ///
    /// Placemarks without a geometry are skipped. Geometries are converted
    /// from WGS84 into [`KmlOptions::feature_projection`].
    pub fn read_features(&self, text: &str) -> Result<Vec<Feature>, KmlError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut features = Vec::new();
        let mut path: Vec<String> = Vec::new();
        let mut text_buf = String::new();
        let mut placemark: Option<PlacemarkBuilder> = None;
        let mut geometry_stack: Vec<GeometryFrame> = Vec::new();
        let mut data_name: Option<String> = None;
        let mut skipped = 0_usize;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    let name = local_name(&start);
                    if path.is_empty() && name != "kml" {
                        return Err(KmlError::NotKml(name));
                    }
                    text_buf.clear();

                    if name == "Placemark" {
                        placemark = Some(PlacemarkBuilder::default());
                        geometry_stack.clear();
                    } else if placemark.is_some() {
                        if let Some(frame) = GeometryFrame::open(name.as_bytes()) {
                            geometry_stack.push(frame);
                        } else if name == "Data" || name == "SimpleData" {
                            data_name = start
                                .try_get_attribute("name")?
                                .map(|attr| attr.unescape_value().map(|v| v.into_owned()))
                                .transpose()?;
                        }
                    }
                    path.push(name);
                }
                Event::Empty(start) => {
                    let name = local_name(&start);
                    if path.is_empty() && name != "kml" {
                        return Err(KmlError::NotKml(name));
                    }
                }
                Event::Text(text) => text_buf.push_str(&text.unescape()?),
                Event::CData(cdata) => text_buf.push_str(&String::from_utf8_lossy(&cdata)),
                Event::End(_) => {
                    let Some(name) = path.pop() else {
                        continue;
                    };
                    if name == "Placemark" {
                        match placemark.take().and_then(PlacemarkBuilder::finish) {
                            Some(feature) => features.push(feature),
                            None => skipped += 1,
                        }
                        text_buf.clear();
                        continue;
                    }
                    let Some(builder) = placemark.as_mut() else {
                        text_buf.clear();
                        continue;
                    };
                    let parent = path.last().map(String::as_str);

                    match name.as_str() {
                        "coordinates" => {
                            let coords = parse_coordinates(&text_buf)?
                                .into_iter()
                                .map(|c| Projection::Geographic.transform(c, self.options.feature_projection))
                                .collect();
                            if let Some(frame) = geometry_stack.last_mut() {
                                frame.set_coordinates(coords);
                            }
                        }
                        "Point" | "LineString" | "LinearRing" | "Polygon" | "MultiGeometry" => {
                            if let Some(frame) = geometry_stack.pop() {
                                close_geometry(frame, geometry_stack.last_mut(), builder);
                            }
                        }
                        "value" if parent == Some("Data") => {
                            if let Some(key) = data_name.clone() {
                                builder.attributes.insert(key, text_buf.trim().to_string());
                            }
                        }
                        "SimpleData" => {
                            if let Some(key) = data_name.take() {
                                builder.attributes.insert(key, text_buf.trim().to_string());
                            }
                        }
                        "Data" => data_name = None,
                        "ExtendedData" => {}
                        "styleUrl" if parent == Some("Placemark") => {
                            if self.options.extract_styles {
                                builder.attributes.insert(name.clone(), text_buf.trim().to_string());
                            }
                        }
                        _ if parent == Some("Placemark") => {
                            builder.attributes.insert(name.clone(), text_buf.trim().to_string());
                        }
                        _ => {}
                    }
                    text_buf.clear();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if placemark.is_some() {
            warn!("KML document ended inside an unterminated <Placemark>");
        }
        debug!(
            "Read {} KML features ({} placemarks without geometry skipped)",
            features.len(),
            skipped
        );
        Ok(features)
    }
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

/// Attach a finished geometry to its parent frame or to the placemark.
fn close_geometry(
    frame: GeometryFrame,
    parent: Option<&mut GeometryFrame>,
    builder: &mut PlacemarkBuilder,
) {
    let geometry = match frame {
        GeometryFrame::LinearRing(ring) => {
            if let Some(GeometryFrame::Polygon(rings)) = parent {
                rings.push(ring);
                return;
            }
            Geometry::LineString(ring)
        }
        GeometryFrame::Point(Some(c)) => Geometry::Point(c),
        GeometryFrame::Point(None) => return,
        GeometryFrame::LineString(line) => Geometry::LineString(line),
        GeometryFrame::Polygon(rings) => Geometry::Polygon(rings),
        GeometryFrame::Multi(parts) => Geometry::Multi(parts),
    };

    match parent {
        Some(GeometryFrame::Multi(parts)) => parts.push(geometry),
        Some(_) => {}
        None => {
            if builder.geometry.is_none() {
                builder.geometry = Some(geometry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>export</name>
    <Style id="s"><IconStyle><scale>2</scale></IconStyle></Style>
    <Placemark>
      <name>Bäckerei &amp; Café</name>
      <styleUrl>#s</styleUrl>
      <ExtendedData>
        <Data name="addr:street"><value>Main</value></Data>
        <Data name="addr:housenumber"><value>12</value></Data>
        <SimpleData name="phone">+49 30 123</SimpleData>
      </ExtendedData>
      <Point><coordinates>0,0,0</coordinates></Point>
    </Placemark>
    <Placemark>
      <name>No geometry</name>
    </Placemark>
    <Placemark>
      <name><![CDATA[Park <b>North</b>]]></name>
      <Polygon>
        <outerBoundaryIs><LinearRing><coordinates>0,0 1,0 1,1 0,0</coordinates></LinearRing></outerBoundaryIs>
        <innerBoundaryIs><LinearRing><coordinates>0.2,0.2 0.4,0.2 0.4,0.4 0.2,0.2</coordinates></LinearRing></innerBoundaryIs>
      </Polygon>
    </Placemark>
    <Folder>
      <Placemark>
        <name>Route</name>
        <MultiGeometry>
          <LineString><coordinates>0,0 1,1</coordinates></LineString>
          <Point><coordinates>2,2</coordinates></Point>
        </MultiGeometry>
      </Placemark>
    </Folder>
  </Document>
</kml>"#;

    fn read(options: KmlOptions) -> Vec<Feature> {
        KmlReader::new(options).read_features(DOCUMENT).unwrap()
    }

    #[test]
    fn test_reads_placemarks_with_geometry() {
        let features = read(KmlOptions::default());
        assert_eq!(features.len(), 3);
        assert_eq!(features[0].name(), Some("Bäckerei & Café"));
        assert_eq!(features[1].name(), Some("Park <b>North</b>"));
        assert_eq!(features[2].name(), Some("Route"));
    }

    #[test]
    fn test_extended_data_becomes_attributes() {
        let features = read(KmlOptions::default());
        let bakery = &features[0];
        assert_eq!(bakery.get("addr:street"), Some("Main"));
        assert_eq!(bakery.get("addr:housenumber"), Some("12"));
        assert_eq!(bakery.get("phone"), Some("+49 30 123"));
    }

    #[test]
    fn test_style_url_only_kept_when_extracting_styles() {
        assert_eq!(read(KmlOptions::default())[0].get("styleUrl"), None);

        let with_styles = read(KmlOptions {
            extract_styles: true,
            ..KmlOptions::default()
        });
        assert_eq!(with_styles[0].get("styleUrl"), Some("#s"));
    }

    #[test]
    fn test_geometries_are_projected() {
        let features = read(KmlOptions::default());
        assert_eq!(
            features[0].geometry(),
            &Geometry::Point(Coordinate::new(0.0, 0.0))
        );

        let Geometry::Polygon(rings) = features[1].geometry() else {
            panic!("expected polygon");
        };
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].len(), 4);
        assert!((rings[0][1].x - 111_319.490_793_273_6).abs() < 1e-3);
    }

    #[test]
    fn test_multi_geometry() {
        let features = read(KmlOptions {
            feature_projection: Projection::Geographic,
            ..KmlOptions::default()
        });
        let Geometry::Multi(parts) = features[2].geometry() else {
            panic!("expected multi geometry");
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1], Geometry::Point(Coordinate::new(2.0, 2.0)));
    }

    #[test]
    fn test_rejects_non_kml_root() {
        let err = KmlReader::default().read_features("<gpx><trk/></gpx>").unwrap_err();
        assert!(matches!(err, KmlError::NotKml(ref root) if root == "gpx"));
    }

    #[test]
    fn test_rejects_bad_coordinates() {
        let doc = "<kml><Placemark><Point><coordinates>x,y</coordinates></Point></Placemark></kml>";
        assert!(KmlReader::default().read_features(doc).is_err());
    }
}
