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

//! Hover and click presenters.
//!
//! Both presenters only borrow the feature under the pointer for the
//! duration of one event and never mutate it.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::feature::Feature;
use crate::fragment::{DetailFragment, LinkTarget};
use crate::projection::{Coordinate, Projection};
use crate::renderer::MapRenderer;
use crate::surface::{Modal, Tooltip};
use crate::viewport::Pixel;

/// Vertical offset so the tooltip does not sit under the cursor.
pub const TOOLTIP_OFFSET_Y: f32 = 15.0;

pub const GEO_LINK_LABEL: &str = "Click here to open in map";

/// How spaces are removed from phone numbers and e-mail addresses before
/// they are put into `tel:` / `mailto:` URIs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpaceStripping {
    /// Remove only the first space.
    #[default]
    FirstSpace,
    /// Remove every whitespace character.
    AllWhitespace,
}

impl SpaceStripping {
    #[must_use]
    pub fn apply(self, value: &str) -> String {
        match self {
            Self::FirstSpace => value.replacen(' ', "", 1),
            Self::AllWhitespace => value.chars().filter(|c| !c.is_whitespace()).collect(),
        }
    }
}

fn tooltip_anchor(pixel: Pixel) -> Pixel {
    Pixel::new(pixel.x, pixel.y - TOOLTIP_OFFSET_Y)
}

/// Shows the hovered feature's name in a tooltip.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureInfoPresenter;

impl FeatureInfoPresenter {
    pub fn on_pointer_move(
        &self,
        pixel: Pixel,
        is_dragging: bool,
        renderer: &dyn MapRenderer,
        tooltip: &mut dyn Tooltip,
    ) {
        if is_dragging {
            tooltip.hide();
            return;
        }

        tooltip.set_position(tooltip_anchor(pixel));
        match renderer.feature_at_pixel(pixel) {
            Some(feature) => {
                tooltip.set_title(feature.name().unwrap_or_default());
                tooltip.show();
            }
            None => tooltip.hide(),
        }
    }
}

/// Opens the details dialog for a clicked feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureDetailPresenter {
    stripping: SpaceStripping,
}

impl FeatureDetailPresenter {
    #[must_use]
    pub fn new(stripping: SpaceStripping) -> Self {
        Self { stripping }
    }

    pub fn on_click(
        &self,
        pixel: Pixel,
        renderer: &dyn MapRenderer,
        tooltip: &mut dyn Tooltip,
        modal: &mut dyn Modal,
    ) {
        tooltip.set_position(tooltip_anchor(pixel));
        tooltip.hide();

        let Some(feature) = renderer.feature_at_pixel(pixel) else {
            return;
        };

        let Some(lon_lat) = feature
            .geometry()
            .transform(renderer.projection(), Projection::Geographic)
            .first_coordinate()
        else {
            debug!("Clicked feature {:?} has an empty geometry", feature.name());
            return;
        };

        modal.set_header(feature.name().unwrap_or_default());
        modal.set_body(detail_body(feature, lon_lat, self.stripping));
        modal.show();
    }
}

/// Paragraph with address, optional contact links and a `geo:` link.
///
/// Lines appear in a fixed order: address, website, phone, email, map link.
/// Optional lines are omitted when the attribute is absent.
#[must_use]
pub fn detail_body(feature: &Feature, lon_lat: Coordinate, stripping: SpaceStripping) -> DetailFragment {
    let mut body = DetailFragment::new()
        .text("Address: ")
        .text(feature.get("addr:street").unwrap_or_default())
        .text(" ")
        .text(feature.get("addr:housenumber").unwrap_or_default());

    if let Some(website) = feature.get("website") {
        body = body.line_break().text("Website: ").link(website, website, LinkTarget::BlankWide);
    }
    if let Some(phone) = feature.get("phone") {
        body = body
            .line_break()
            .text("Phone: ")
            .link(format!("tel:{}", stripping.apply(phone)), phone, LinkTarget::Same);
    }
    if let Some(email) = feature.get("email") {
        body = body
            .line_break()
            .text("Email: ")
            .link(format!("mailto:{}", stripping.apply(email)), email, LinkTarget::Same);
    }

    body.line_break()
        .text(" ")
        .link(geo_uri(lon_lat), GEO_LINK_LABEL, LinkTarget::Blank)
}

/// `geo:<lon>,<lat>` with shortest round-trip decimal formatting.
#[must_use]
pub fn geo_uri(lon_lat: Coordinate) -> String {
    format!("geo:{},{}", shortest_decimal(lon_lat.x), shortest_decimal(lon_lat.y))
}

/// Shortest round-trip decimal for `value`.
///
/// Plain notation for magnitudes in `[1e-6, 1e21)`, otherwise `d.ddde±N`.
/// Negative zero prints as `0`.
fn shortest_decimal(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }

    let sign = if value < 0.0 { "-" } else { "" };
    // `{:e}` already yields the shortest digits, e.g. `1.2345e3`
    let sci = format!("{:e}", value.abs());
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return format!("{value}");
    };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let Ok(exponent) = exponent.parse::<i32>() else {
        return format!("{value}");
    };
    let k = digits.len() as i32;
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{exp_sign}{}", exponent.abs())
        } else {
            format!("{first}.{rest}e{exp_sign}{}", exponent.abs())
        }
    };
    format!("{sign}{body}")
}
