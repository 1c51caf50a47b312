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

use crate::config::AppConfig;
use crate::loader::KmlLoader;
use crate::map_view::MapView;
use crate::tiles::TileManager;
use crate::ui::{details_window, DetailsWindow, FeatureTooltip};
use log::info;
use map_interaction::{
    EventDispatcher, FeatureDetailPresenter, FeatureInfoPresenter, MapScene, Surfaces, Tooltip, VectorLayer,
};

pub struct KmlMapApp {
    config: AppConfig,
    map: MapView,
    loader: KmlLoader,
    dispatcher: EventDispatcher,
    tooltip: FeatureTooltip,
    details: DetailsWindow,
    source: Option<String>,
}

impl std::fmt::Debug for KmlMapApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KmlMapApp")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl KmlMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        info!("Initializing map with {} tiles", config.tile_layer);
        let scene = MapScene::new(
            config.initial_center,
            config.initial_zoom,
            VectorLayer::new(config.marker_radius),
        );
        let tiles = TileManager::new(config.tile_url(), config.tile_cache_days);
        let map = MapView::new(scene, tiles, config.tile_attribution.clone());

        let dispatcher = EventDispatcher::with_presenters(
            FeatureInfoPresenter,
            FeatureDetailPresenter::new(config.contact_space_stripping),
        );

        let loader = KmlLoader::new();
        loader.load(config.kml_source.clone(), &cc.egui_ctx);

        Self {
            config,
            map,
            loader,
            dispatcher,
            tooltip: FeatureTooltip::default(),
            details: DetailsWindow::default(),
            source: None,
        }
    }

    fn open_kml(&mut self, source: String, ctx: &egui::Context) {
        self.tooltip.state.hide();
        self.details.state.close();
        self.config.kml_source.clone_from(&source);
        self.loader.load(source, ctx);
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open KML...").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("KML Files", &["kml"])
                    .add_filter("All Files", &["*"])
                    .pick_file()
                {
                    self.open_kml(path.display().to_string(), ui.ctx());
                }
            }
            if ui.button("Reload").clicked() {
                self.open_kml(self.config.kml_source.clone(), ui.ctx());
            }

            ui.separator();
            let layer = self.map.layer();
            match &self.source {
                Some(source) if layer.is_empty() => ui.label(format!("No placemarks in {source}")),
                Some(source) => ui.label(format!("{} features from {}", layer.len(), source)),
                None => ui.label("No features loaded"),
            };
        });
    }
}

impl eframe::App for KmlMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some((source, features)) = self.loader.take_loaded() {
            self.map.set_features(features);
            self.source = Some(source);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        let notice = self.loader.status().map(|msg| (msg, self.loader.is_failed()));
        let output = egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.map.show(ui, notice))
            .inner;

        let mut surfaces = Surfaces {
            renderer: self.map.scene(),
            tooltip: &mut self.tooltip.state,
            modal: &mut self.details.state,
        };
        for event in &output.events {
            self.dispatcher.dispatch(event, &mut surfaces);
        }
        if !output.hovered {
            self.tooltip.state.hide();
        }

        self.tooltip.show(ctx, output.rect);
        if let Some(href) = self.details.show(ctx) {
            details_window::open_link(&href);
        }
    }
}
