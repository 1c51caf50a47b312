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

//! Feature interaction for slippy map viewers.
//!
//! This library holds everything between a drawn map and the UI widgets that
//! describe what is on it, independent of any UI toolkit:
//!
//! - **Data layer**: [`Feature`]s with string attributes and [`Geometry`],
//!   read from KML by [`KmlReader`] and reprojected with [`Projection`]
//! - **Layer**: [`VectorLayer`] with a per-radius [`StyleCache`] and pixel
//!   hit-testing through a [`Viewport`]
//! - **Presenters**: [`FeatureInfoPresenter`] (hover tooltip) and
//!   [`FeatureDetailPresenter`] (click dialog with a [`DetailFragment`])
//! - **Dispatch**: [`EventDispatcher`] routes [`MapEvent`]s to subscribers
//!
//! # Quick Start
//!
//! ```
//! use map_interaction::{
//!     EventDispatcher, FeatureDetailPresenter, FeatureInfoPresenter, KmlReader, MapEvent,
//!     MapScene, ModalState, Pixel, Surfaces, TooltipState, VectorLayer,
//! };
//! use map_interaction::projection::Coordinate;
//!
//! let kml = r#"<kml><Placemark><name>Quake A</name>
//!     <Point><coordinates>0,0</coordinates></Point></Placemark></kml>"#;
//! let mut layer = VectorLayer::default();
//! layer.set_features(KmlReader::default().read_features(kml).unwrap());
//!
//! let mut scene = MapScene::new(Coordinate::new(0.0, 0.0), 2.0, layer);
//! scene.viewport.set_size(800.0, 600.0);
//!
//! let mut tooltip = TooltipState::default();
//! let mut modal = ModalState::default();
//! let mut dispatcher =
//!     EventDispatcher::with_presenters(FeatureInfoPresenter, FeatureDetailPresenter::default());
//!
//! let mut surfaces = Surfaces { renderer: &scene, tooltip: &mut tooltip, modal: &mut modal };
//! dispatcher.dispatch(
//!     &MapEvent::PointerMove { pixel: Pixel::new(400.0, 300.0), dragging: false },
//!     &mut surfaces,
//! );
//! assert_eq!(tooltip.title.as_deref(), Some("Quake A"));
//! ```

pub mod dispatcher;
pub mod feature;
pub mod fragment;
pub mod kml;
pub mod layer;
pub mod presenter;
pub mod projection;
pub mod renderer;
pub mod style;
pub mod surface;
pub mod viewport;

pub use dispatcher::{EventDispatcher, EventKind, MapEvent, Surfaces};
pub use feature::{Feature, Geometry};
pub use fragment::{DetailFragment, Inline, LinkTarget};
pub use kml::{KmlError, KmlOptions, KmlReader};
pub use layer::VectorLayer;
pub use presenter::{FeatureDetailPresenter, FeatureInfoPresenter, SpaceStripping};
pub use projection::{Projection, ProjectionError};
pub use renderer::{MapRenderer, MapScene};
pub use style::{Style, StyleCache};
pub use surface::{Modal, ModalState, Tooltip, TooltipState};
pub use viewport::{Pixel, Viewport};
