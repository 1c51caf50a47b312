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

//! Point marker styles and their per-radius cache.

use std::collections::HashMap;
use std::sync::Arc;

/// Default marker radius in pixels.
pub const DEFAULT_RADIUS: f32 = 10.0;

/// RGBA color, alpha in 0.0 - 1.0 like CSS `rgba()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Alpha scaled to 0 - 255.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "alpha is clamped to 0..=1")]
    pub fn alpha_u8(self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
}

/// Circle marker drawn at point geometries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleStyle {
    pub radius: f32,
    pub fill: Rgba,
    pub stroke: Stroke,
}

/// Immutable visual descriptor for a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub image: CircleStyle,
}

impl Style {
    /// Translucent orange circle with a faint yellow 1px outline.
    #[must_use]
    pub fn marker(radius: f32) -> Self {
        Self {
            image: CircleStyle {
                radius,
                fill: Rgba::new(255, 153, 0, 0.4),
                stroke: Stroke {
                    color: Rgba::new(255, 204, 0, 0.2),
                    width: 1.0,
                },
            },
        }
    }

    /// Pixel distance from a point's centre that still counts as a hit.
    #[must_use]
    pub fn hit_radius(&self) -> f32 {
        self.image.radius + self.image.stroke.width / 2.0
    }
}

/// Memoizes one [`Style`] per radius. Never evicts.
#[derive(Debug, Default)]
pub struct StyleCache {
    styles: HashMap<u32, Arc<Style>>,
}

impl StyleCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached style for `radius`, built on first request.
    pub fn get_style(&mut self, radius: f32) -> Arc<Style> {
        // -0.0 and 0.0 must share a slot
        let key = if radius == 0.0 { 0 } else { radius.to_bits() };
        Arc::clone(
            self.styles
                .entry(key)
                .or_insert_with(|| {
                    log::debug!("Creating marker style for radius {radius}");
                    Arc::new(Style::marker(radius))
                }),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
