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

//! Vector layer: the feature collection, its style function and
//! pixel hit-testing.

use std::sync::Arc;

use crate::feature::{Feature, Geometry};
use crate::projection::Coordinate;
use crate::style::{Style, StyleCache, DEFAULT_RADIUS};
use crate::viewport::{Pixel, Viewport};

/// Extra pixels around lines and polygon outlines that still count as a hit.
const LINE_HIT_TOLERANCE: f32 = 3.0;

/// Features drawn above the base tiles, styled through a [`StyleCache`].
#[derive(Debug)]
pub struct VectorLayer {
    features: Vec<Feature>,
    styles: StyleCache,
    radius: f32,
}

impl Default for VectorLayer {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS)
    }
}

impl VectorLayer {
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self {
            features: Vec::new(),
            styles: StyleCache::new(),
            radius,
        }
    }

    /// Replace the layer's features.
    pub fn set_features(&mut self, features: Vec<Feature>) {
        self.features = features;
    }

    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Style function, called once per feature per render pass.
    pub fn style(&mut self, _feature: &Feature) -> Arc<Style> {
        self.styles.get_style(self.radius)
    }

    /// Features paired with their style, in draw order.
    pub fn styled_features(&mut self) -> Vec<(&Feature, Arc<Style>)> {
        let radius = self.radius;
        let styles = &mut self.styles;
        self.features
            .iter()
            .map(|f| (f, styles.get_style(radius)))
            .collect()
    }

    /// Every feature under `pixel`, topmost (last drawn) first.
    #[must_use]
    pub fn features_at_pixel(&self, viewport: &Viewport, pixel: Pixel) -> Vec<&Feature> {
        let point_tolerance = Style::marker(self.radius).hit_radius();
        let world_width = viewport.world_width();
        // Map the pixel back onto the primary world copy for every visible copy
        let candidates: Vec<Pixel> = viewport
            .world_copies()
            .map(|copy| Pixel::new(pixel.x - copy as f32 * world_width, pixel.y))
            .collect();
        self.features
            .iter()
            .rev()
            .filter(|f| {
                candidates
                    .iter()
                    .any(|p| hits(f.geometry(), viewport, *p, point_tolerance))
            })
            .collect()
    }
}

fn hits(geometry: &Geometry, viewport: &Viewport, pixel: Pixel, point_tolerance: f32) -> bool {
    match geometry {
        Geometry::Point(c) => viewport.to_pixel(*c).distance(pixel) <= point_tolerance,
        Geometry::LineString(line) => near_path(line, viewport, pixel),
        Geometry::Polygon(rings) => {
            contains(rings, viewport.to_coordinate(pixel))
                || rings.iter().any(|ring| near_path(ring, viewport, pixel))
        }
        Geometry::Multi(parts) => parts
            .iter()
            .any(|part| hits(part, viewport, pixel, point_tolerance)),
    }
}

fn near_path(path: &[Coordinate], viewport: &Viewport, pixel: Pixel) -> bool {
    let screen: Vec<Pixel> = path.iter().map(|c| viewport.to_pixel(*c)).collect();
    match screen.as_slice() {
        [] => false,
        [only] => only.distance(pixel) <= LINE_HIT_TOLERANCE,
        _ => screen
            .windows(2)
            .any(|w| segment_distance(pixel, w[0], w[1]) <= LINE_HIT_TOLERANCE),
    }
}

fn segment_distance(p: Pixel, a: Pixel, b: Pixel) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Pixel::new(a.x + t * dx, a.y + t * dy))
}

/// Even-odd rule over all rings, so holes are excluded.
fn contains(rings: &[Vec<Coordinate>], c: Coordinate) -> bool {
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (ring[i], ring[j]);
            if (a.y > c.y) != (b.y > c.y) && c.x < (b.x - a.x) * (c.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        let mut vp = Viewport::new(Coordinate::new(0.0, 0.0), 2.0);
        vp.set_size(800.0, 600.0);
        vp
    }

    fn point_at(vp: &Viewport, x: f32, y: f32, name: &str) -> Feature {
        Feature::new(Geometry::Point(vp.to_coordinate(Pixel::new(x, y)))).with("name", name)
    }

    #[test]
    fn test_point_hit_within_marker_radius() {
        let vp = viewport();
        let mut layer = VectorLayer::default();
        layer.set_features(vec![point_at(&vp, 100.0, 100.0, "A")]);

        assert_eq!(layer.features_at_pixel(&vp, Pixel::new(108.0, 104.0)).len(), 1);
        assert!(layer.features_at_pixel(&vp, Pixel::new(112.0, 100.0)).is_empty());
    }

    #[test]
    fn test_topmost_feature_first() {
        let vp = viewport();
        let mut layer = VectorLayer::default();
        layer.set_features(vec![
            point_at(&vp, 200.0, 200.0, "bottom"),
            point_at(&vp, 203.0, 200.0, "top"),
        ]);

        let hits = layer.features_at_pixel(&vp, Pixel::new(201.0, 200.0));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name(), Some("top"));
    }

    #[test]
    fn test_line_hit() {
        let vp = viewport();
        let mut layer = VectorLayer::default();
        layer.set_features(vec![Feature::new(Geometry::LineString(vec![
            vp.to_coordinate(Pixel::new(0.0, 0.0)),
            vp.to_coordinate(Pixel::new(100.0, 0.0)),
        ]))]);

        assert_eq!(layer.features_at_pixel(&vp, Pixel::new(50.0, 2.0)).len(), 1);
        assert!(layer.features_at_pixel(&vp, Pixel::new(50.0, 10.0)).is_empty());
    }

    #[test]
    fn test_polygon_hit_excludes_holes() {
        let vp = viewport();
        let ring = |pts: &[(f32, f32)]| -> Vec<Coordinate> {
            pts.iter().map(|&(x, y)| vp.to_coordinate(Pixel::new(x, y))).collect()
        };
        let mut layer = VectorLayer::default();
        layer.set_features(vec![Feature::new(Geometry::Polygon(vec![
            ring(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0), (0.0, 0.0)]),
            ring(&[(40.0, 40.0), (60.0, 40.0), (60.0, 60.0), (40.0, 60.0), (40.0, 40.0)]),
        ]))]);

        assert_eq!(layer.features_at_pixel(&vp, Pixel::new(20.0, 20.0)).len(), 1);
        assert!(layer.features_at_pixel(&vp, Pixel::new(50.0, 50.0)).is_empty());
        assert!(layer.features_at_pixel(&vp, Pixel::new(200.0, 200.0)).is_empty());
    }

    #[test]
    fn test_style_function_reuses_cached_style() {
        let mut layer = VectorLayer::default();
        let feature = Feature::new(Geometry::Point(Coordinate::default()));
        let a = layer.style(&feature);
        let b = layer.style(&feature);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_styled_features_share_one_style() {
        let vp = viewport();
        let mut layer = VectorLayer::new(6.0);
        layer.set_features(vec![point_at(&vp, 1.0, 1.0, "A"), point_at(&vp, 2.0, 2.0, "B")]);

        let styled = layer.styled_features();
        assert_eq!(styled.len(), 2);
        assert_eq!(styled[0].0.name(), Some("A"));
        assert!(Arc::ptr_eq(&styled[0].1, &styled[1].1));
        assert!((styled[1].1.image.radius - 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_hit_on_wrapped_world_copy() {
        let mut vp = Viewport::new(Coordinate::new(0.0, 0.0), 0.0);
        vp.set_size(800.0, 300.0);
        let mut layer = VectorLayer::default();
        layer.set_features(vec![Feature::new(Geometry::Point(Coordinate::new(0.0, 0.0))).with("name", "Null")]);

        assert_eq!(layer.features_at_pixel(&vp, Pixel::new(400.0, 150.0)).len(), 1);
        assert_eq!(layer.features_at_pixel(&vp, Pixel::new(656.0, 150.0)).len(), 1);
        assert_eq!(layer.features_at_pixel(&vp, Pixel::new(144.0, 150.0)).len(), 1);
        assert!(layer.features_at_pixel(&vp, Pixel::new(528.0, 150.0)).is_empty());
    }
}
