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

//! Application configuration management.
//!
//! This module handles persistent configuration storage using TOML format:
//! where the KML comes from, which tile layer to draw, the initial view and
//! how contact details are normalised.

use map_interaction::projection::Coordinate;
use map_interaction::SpaceStripping;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "kmlmap-desktop";
const CONFIG_NAME: &str = "config";

/// Default KML document, relative to the working directory
pub const DEFAULT_KML_SOURCE: &str = "data/kml/export.kml";

/// Default raster tile layer
pub const DEFAULT_TILE_LAYER: &str = "toner";

/// Stamen styles hosted by Stadia Maps; `{layer}`, `{z}`, `{x}`, `{y}` are substituted
pub const DEFAULT_TILE_URL: &str = "https://tiles.stadiamaps.com/tiles/stamen_{layer}/{z}/{x}/{y}.png";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// KML file path or http(s) URL
    #[serde(default = "default_kml_source")]
    pub kml_source: String,

    /// Named tile layer style
    #[serde(default = "default_tile_layer")]
    pub tile_layer: String,

    /// Tile URL template
    #[serde(default = "default_tile_url")]
    pub tile_url_template: String,

    /// Attribution shown in the map corner
    #[serde(default = "default_attribution")]
    pub tile_attribution: String,

    /// Initial map centre in EPSG:3857 metres
    #[serde(default)]
    pub initial_center: Coordinate,

    /// Initial zoom level (0.0 - 18.0)
    #[serde(default = "default_zoom")]
    pub initial_zoom: f64,

    /// Point marker radius in pixels
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f32,

    /// Space removal for tel:/mailto: links
    #[serde(default)]
    pub contact_space_stripping: SpaceStripping,

    /// Remove cached tiles older than this many days
    #[serde(default = "default_tile_cache_days")]
    pub tile_cache_days: u64,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_kml_source() -> String {
    DEFAULT_KML_SOURCE.to_string()
}

fn default_tile_layer() -> String {
    DEFAULT_TILE_LAYER.to_string()
}

fn default_tile_url() -> String {
    DEFAULT_TILE_URL.to_string()
}

fn default_attribution() -> String {
    "© Stadia Maps © Stamen Design © OpenStreetMap contributors".to_string()
}

fn default_zoom() -> f64 {
    2.0
}

fn default_marker_radius() -> f32 {
    map_interaction::style::DEFAULT_RADIUS
}

fn default_tile_cache_days() -> u64 {
    7
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            kml_source: default_kml_source(),
            tile_layer: default_tile_layer(),
            tile_url_template: default_tile_url(),
            tile_attribution: default_attribution(),
            initial_center: Coordinate::default(),
            initial_zoom: default_zoom(),
            marker_radius: default_marker_radius(),
            contact_space_stripping: SpaceStripping::default(),
            tile_cache_days: default_tile_cache_days(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Tile URL template with the layer name filled in
    pub fn tile_url(&self) -> String {
        self.tile_url_template.replace("{layer}", &self.tile_layer)
    }
}
