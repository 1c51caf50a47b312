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

//! KML reading.
//!
//! Turns `<Placemark>` elements into [`Feature`](crate::feature::Feature)s.
//! Simple child elements (`name`, `description`, `address`, ...) and
//! `ExtendedData` entries (`<Data name="addr:street"><value>..</value></Data>`
//! or `<SimpleData name="..">..</SimpleData>`) become attributes. Point,
//! LineString, Polygon and MultiGeometry geometries are supported; document
//! styles are not interpreted.

mod coordinates;
mod reader;

pub use coordinates::parse_coordinates;
pub use reader::KmlReader;

use thiserror::Error;

use crate::projection::Projection;

/// Errors that can occur while reading a KML document.
#[derive(Debug, Error)]
pub enum KmlError {
    #[error("xml syntax error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid xml attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("invalid coordinate tuple '{0}'")]
    Coordinates(String),

    #[error("document is not KML (root element <{0}>)")]
    NotKml(String),
}

/// Reader options.
#[derive(Debug, Clone, Copy)]
pub struct KmlOptions {
    /// Keep each placemark's `styleUrl` as an attribute. When disabled, all
    /// appearance comes from the layer's own style.
    pub extract_styles: bool,
    /// Projection the produced geometries are expressed in.
    pub feature_projection: Projection,
}

impl Default for KmlOptions {
    fn default() -> Self {
        Self {
            extract_styles: false,
            feature_projection: Projection::WebMercator,
        }
    }
}
