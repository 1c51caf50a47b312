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

mod app;
mod config;
mod loader;
mod map_view;
mod tiles;
mod ui;

use clap::Parser;
use config::AppConfig;
use log::{error, info, warn};

/// Interactive map of KML placemarks over raster tiles
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// KML file path or http(s) URL (overrides config)
    #[arg(long)]
    kml: Option<String>,

    /// Tile layer name, e.g. toner or terrain (overrides config)
    #[arg(long)]
    layer: Option<String>,

    /// Initial zoom level (overrides config)
    #[arg(long)]
    zoom: Option<f64>,

    /// Print the config file location and exit
    #[arg(long)]
    print_config_path: bool,

    /// Write the effective configuration back to disk
    #[arg(long)]
    save_config: bool,
}

impl Args {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(kml) = &self.kml {
            config.kml_source.clone_from(kml);
        }
        if let Some(layer) = &self.layer {
            config.tile_layer.clone_from(layer);
        }
        if let Some(zoom) = self.zoom {
            config.initial_zoom = zoom;
        }
    }
}

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.print_config_path {
        match AppConfig::get_config_path() {
            Ok(path) => println!("{}", path.display()),
            Err(e) => error!("Could not determine config path: {}", e),
        }
        return Ok(());
    }

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });
    args.apply(&mut config);

    if args.save_config {
        if let Err(e) = config.save() {
            error!("Failed to save config: {}", e);
        }
    }

    info!("Starting KML Map with {}", config.kml_source);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("KML Map"),
        ..Default::default()
    };

    eframe::run_native(
        "KML Map",
        options,
        Box::new(|cc| Ok(Box::new(app::KmlMapApp::new(cc, config)))),
    )
}
