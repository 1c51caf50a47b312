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

//! Screen/world transforms for a Web Mercator view.
//!
//! Pixels are relative to the top-left corner of the map area, the same
//! convention a browser uses for map event pixels.

use std::ops::RangeInclusive;

use crate::projection::{Coordinate, HALF_WORLD};

/// Edge length of a raster tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 18.0;

/// A position on screen, relative to the map's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pixel {
    pub x: f32,
    pub y: f32,
}

impl Pixel {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Pixel) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Current view: centre (EPSG:3857), fractional zoom and pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    center: Coordinate,
    zoom: f64,
    width: f32,
    height: f32,
}

impl Viewport {
    #[must_use]
    pub fn new(center: Coordinate, zoom: f64) -> Self {
        Self {
            center: clamp_to_world(center),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width: 0.0,
            height: 0.0,
        }
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// Metres per pixel at the current zoom.
    #[must_use]
    pub fn resolution(&self) -> f64 {
        resolution_at(self.zoom)
    }

    #[must_use]
    pub fn to_pixel(&self, coord: Coordinate) -> Pixel {
        let res = self.resolution();
        Pixel::new(
            (f64::from(self.width) / 2.0 + (coord.x - self.center.x) / res) as f32,
            (f64::from(self.height) / 2.0 - (coord.y - self.center.y) / res) as f32,
        )
    }

    #[must_use]
    pub fn to_coordinate(&self, pixel: Pixel) -> Coordinate {
        let res = self.resolution();
        Coordinate::new(
            self.center.x + (f64::from(pixel.x) - f64::from(self.width) / 2.0) * res,
            self.center.y - (f64::from(pixel.y) - f64::from(self.height) / 2.0) * res,
        )
    }

    /// Width of one world copy in pixels.
    #[must_use]
    pub fn world_width(&self) -> f32 {
        (2.0 * HALF_WORLD / self.resolution()) as f32
    }

    /// Horizontal world copies that intersect the view, `0` being the primary one.
    #[must_use]
    pub fn world_copies(&self) -> RangeInclusive<i32> {
        let span = 2.0 * HALF_WORLD;
        let left = self.to_coordinate(Pixel::new(0.0, 0.0)).x;
        let right = self.to_coordinate(Pixel::new(self.width, 0.0)).x;
        let first = ((left + HALF_WORLD) / span).floor() as i32;
        let last = ((right + HALF_WORLD) / span).floor() as i32;
        first..=last
    }

    /// Move the view so content follows a pointer drag of `(dx, dy)` pixels.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        let res = self.resolution();
        self.center = clamp_to_world(Coordinate::new(
            self.center.x - f64::from(dx) * res,
            self.center.y + f64::from(dy) * res,
        ));
    }

    /// Change zoom by `delta` levels keeping the world point under `anchor` fixed.
    pub fn zoom_around(&mut self, anchor: Pixel, delta: f64) {
        let fixed = self.to_coordinate(anchor);
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        let res = self.resolution();
        self.center = clamp_to_world(Coordinate::new(
            fixed.x - (f64::from(anchor.x) - f64::from(self.width) / 2.0) * res,
            fixed.y + (f64::from(anchor.y) - f64::from(self.height) / 2.0) * res,
        ));
    }
}

/// Metres per pixel at a (fractional) zoom level.
#[must_use]
pub fn resolution_at(zoom: f64) -> f64 {
    2.0 * HALF_WORLD / (TILE_SIZE * 2_f64.powf(zoom))
}

fn clamp_to_world(c: Coordinate) -> Coordinate {
    Coordinate::new(c.x.clamp(-HALF_WORLD, HALF_WORLD), c.y.clamp(-HALF_WORLD, HALF_WORLD))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        let mut vp = Viewport::new(Coordinate::new(0.0, 0.0), 2.0);
        vp.set_size(800.0, 600.0);
        vp
    }

    #[test]
    fn test_world_fits_tiles_at_zoom() {
        // four tiles across at zoom 2
        let vp = viewport();
        assert!((vp.resolution() * TILE_SIZE * 4.0 - 2.0 * HALF_WORLD).abs() < 1e-6);
    }

    #[test]
    fn test_center_is_middle_of_screen() {
        let vp = viewport();
        assert_eq!(vp.to_pixel(Coordinate::new(0.0, 0.0)), Pixel::new(400.0, 300.0));
    }

    #[test]
    fn test_pixel_coordinate_round_trip() {
        let vp = viewport();
        let pixel = Pixel::new(123.0, 456.0);
        let back = vp.to_pixel(vp.to_coordinate(pixel));
        assert!(back.distance(pixel) < 1e-3);
    }

    #[test]
    fn test_north_is_up() {
        let vp = viewport();
        let north = vp.to_pixel(Coordinate::new(0.0, 1_000_000.0));
        assert!(north.y < 300.0);
    }

    #[test]
    fn test_pan_follows_drag() {
        let mut vp = viewport();
        let coord = Coordinate::new(2_000_000.0, 1_000_000.0);
        let before = vp.to_pixel(coord);
        vp.pan_by(30.0, -20.0);
        let after = vp.to_pixel(coord);
        assert!((after.x - before.x - 30.0).abs() < 1e-3);
        assert!((after.y - before.y + 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut vp = viewport();
        let anchor = Pixel::new(600.0, 200.0);
        let under = vp.to_coordinate(anchor);
        vp.zoom_around(anchor, 1.5);
        assert!((vp.zoom() - 3.5).abs() < f64::EPSILON);
        assert!(vp.to_pixel(under).distance(anchor) < 1e-2);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = viewport();
        vp.zoom_around(Pixel::new(0.0, 0.0), -10.0);
        assert!((vp.zoom() - MIN_ZOOM).abs() < f64::EPSILON);
        vp.zoom_around(Pixel::new(0.0, 0.0), 100.0);
        assert!((vp.zoom() - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_world_copies() {
        assert_eq!(viewport().world_copies(), 0..=0);

        let mut wide = Viewport::new(Coordinate::new(0.0, 0.0), 0.0);
        wide.set_size(800.0, 300.0);
        assert!((wide.world_width() - 256.0).abs() < 1e-3);
        assert_eq!(wide.world_copies(), -2..=2);
    }
}
