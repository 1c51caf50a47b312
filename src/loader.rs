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

//! Background loading of the KML feature source.
//!
//! A source is either a local path or an `http(s)` URL. Loading happens on a
//! worker thread; the UI polls [`KmlLoader::take_loaded`] each frame.

use log::{error, info};
use map_interaction::{Feature, KmlError, KmlOptions, KmlReader};
use std::fs;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid KML: {0}")]
    Kml(#[from] KmlError),

    #[error("could not start loader runtime: {0}")]
    Runtime(std::io::Error),
}

#[derive(Debug, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading(String),
    Loaded { source: String, features: Vec<Feature> },
    Failed(String),
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Parse KML text with the options the map layer expects
pub fn parse_kml(text: &str) -> Result<Vec<Feature>, LoadError> {
    let reader = KmlReader::new(KmlOptions {
        extract_styles: false,
        ..KmlOptions::default()
    });
    Ok(reader.read_features(text)?)
}

fn read_local(path: &str) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_string(),
        source,
    })
}

async fn fetch_remote(url: &str) -> Result<String, LoadError> {
    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        return Err(LoadError::Status(response.status()));
    }
    Ok(response.text().await?)
}

fn load_source(source: &str) -> Result<Vec<Feature>, LoadError> {
    let text = if is_remote(source) {
        let rt = tokio::runtime::Runtime::new().map_err(LoadError::Runtime)?;
        rt.block_on(fetch_remote(source))?
    } else {
        read_local(source)?
    };
    parse_kml(&text)
}

/// Loads one KML source at a time off the UI thread
#[derive(Debug, Clone, Default)]
pub struct KmlLoader {
    state: Arc<Mutex<LoadState>>,
}

impl KmlLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start loading `source`; a later call supersedes an earlier one
    pub fn load(&self, source: String, ctx: &egui::Context) {
        info!("Loading KML from {}", source);
        *self.lock() = LoadState::Loading(source.clone());

        let state = Arc::clone(&self.state);
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = load_source(&source);
            let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);

            // Drop results for a source that has since been replaced
            if !matches!(&*guard, LoadState::Loading(current) if *current == source) {
                return;
            }
            *guard = match result {
                Ok(features) => {
                    info!("Loaded {} features from {}", features.len(), source);
                    LoadState::Loaded { source, features }
                }
                Err(e) => {
                    error!("Failed to load {}: {}", source, e);
                    LoadState::Failed(format!("Failed to load {source}: {e}"))
                }
            };
            drop(guard);
            ctx.request_repaint();
        });
    }

    /// Take finished features, leaving the loader idle
    pub fn take_loaded(&self) -> Option<(String, Vec<Feature>)> {
        let mut guard = self.lock();
        if !matches!(&*guard, LoadState::Loaded { .. }) {
            return None;
        }
        match std::mem::take(&mut *guard) {
            LoadState::Loaded { source, features } => Some((source, features)),
            _ => None,
        }
    }

    /// Status line for the map banner, if any
    pub fn status(&self) -> Option<String> {
        match &*self.lock() {
            LoadState::Loading(source) => Some(format!("Loading {source}...")),
            LoadState::Failed(message) => Some(message.clone()),
            LoadState::Idle | LoadState::Loaded { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(&*self.lock(), LoadState::Failed(_))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_detection() {
        assert!(is_remote("https://example.com/export.kml"));
        assert!(is_remote("http://example.com/export.kml"));
        assert!(!is_remote("data/kml/export.kml"));
    }

    #[test]
    fn test_parse_kml_ignores_styles() {
        let features = parse_kml(
            r#"<kml><Placemark><name>A</name><styleUrl>#s</styleUrl>
               <Point><coordinates>0,0</coordinates></Point></Placemark></kml>"#,
        )
        .unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].get("styleUrl"), None);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_source("/definitely/not/here.kml").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.kml"));
    }

    #[test]
    fn test_local_file_loads() {
        let path = std::env::temp_dir().join("kmlmap_loader_test.kml");
        fs::write(
            &path,
            "<kml><Placemark><name>B</name><Point><coordinates>1,2</coordinates></Point></Placemark></kml>",
        )
        .unwrap();

        let features = load_source(path.to_str().unwrap()).unwrap();
        assert_eq!(features[0].name(), Some("B"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_take_loaded_resets_state() {
        let loader = KmlLoader::new();
        *loader.lock() = LoadState::Loaded {
            source: "x.kml".into(),
            features: Vec::new(),
        };
        assert!(loader.take_loaded().is_some());
        assert!(loader.take_loaded().is_none());
        assert!(loader.status().is_none());
    }
}
