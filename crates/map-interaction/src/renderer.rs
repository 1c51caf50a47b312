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

//! The map renderer seen from the interaction layer.

use crate::feature::Feature;
use crate::layer::VectorLayer;
use crate::projection::{Coordinate, Projection};
use crate::viewport::{Pixel, Viewport};

/// Hit-testing and projection services a rendered map offers to presenters.
pub trait MapRenderer {
    /// Features rendered under `pixel`, topmost first.
    fn features_at_pixel(&self, pixel: Pixel) -> Vec<&Feature>;

    /// The first feature under `pixel`. No tie-break beyond "first hit".
    fn feature_at_pixel(&self, pixel: Pixel) -> Option<&Feature> {
        self.features_at_pixel(pixel).into_iter().next()
    }

    /// Projection the feature geometries are expressed in.
    fn projection(&self) -> Projection {
        Projection::WebMercator
    }
}

/// A view onto a vector layer: what the user currently sees.
#[derive(Debug)]
pub struct MapScene {
    pub viewport: Viewport,
    pub layer: VectorLayer,
}

impl MapScene {
    #[must_use]
    pub fn new(center: Coordinate, zoom: f64, layer: VectorLayer) -> Self {
        Self {
            viewport: Viewport::new(center, zoom),
            layer,
        }
    }
}

impl MapRenderer for MapScene {
    fn features_at_pixel(&self, pixel: Pixel) -> Vec<&Feature> {
        self.layer.features_at_pixel(&self.viewport, pixel)
    }
}
