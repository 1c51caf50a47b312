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

//! Map event subscription and delivery.
//!
//! Handlers subscribe to an [`EventKind`] and are called synchronously, in
//! registration order, for every matching [`MapEvent`]. There is no
//! debouncing or throttling.

use crate::presenter::{FeatureDetailPresenter, FeatureInfoPresenter};
use crate::renderer::MapRenderer;
use crate::surface::{Modal, Tooltip};
use crate::viewport::Pixel;

/// Pointer events emitted by the map view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    PointerMove { pixel: Pixel, dragging: bool },
    Click { pixel: Pixel },
}

impl MapEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PointerMove { .. } => EventKind::PointerMove,
            Self::Click { .. } => EventKind::Click,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    Click,
}

/// Everything a handler may read or write while handling one event.
pub struct Surfaces<'a> {
    pub renderer: &'a dyn MapRenderer,
    pub tooltip: &'a mut dyn Tooltip,
    pub modal: &'a mut dyn Modal,
}

impl std::fmt::Debug for Surfaces<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surfaces").finish_non_exhaustive()
    }
}

pub type Handler = Box<dyn FnMut(&MapEvent, &mut Surfaces<'_>)>;

#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<(EventKind, Handler)>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish()
    }
}

impl EventDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer moves go to the info presenter, clicks to the detail presenter.
    #[must_use]
    pub fn with_presenters(info: FeatureInfoPresenter, detail: FeatureDetailPresenter) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.on(EventKind::PointerMove, move |event, s| {
            if let MapEvent::PointerMove { pixel, dragging } = *event {
                info.on_pointer_move(pixel, dragging, s.renderer, &mut *s.tooltip);
            }
        });
        dispatcher.on(EventKind::Click, move |event, s| {
            if let MapEvent::Click { pixel } = *event {
                detail.on_click(pixel, s.renderer, &mut *s.tooltip, &mut *s.modal);
            }
        });
        dispatcher
    }

    /// Subscribe `handler` to events of `kind`.
    pub fn on<F>(&mut self, kind: EventKind, handler: F)
    where
        F: FnMut(&MapEvent, &mut Surfaces<'_>) + 'static,
    {
        self.handlers.push((kind, Box::new(handler)));
    }

    /// Deliver `event` to its subscribers. Returns how many handlers ran.
    pub fn dispatch(&mut self, event: &MapEvent, surfaces: &mut Surfaces<'_>) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        for (_, handler) in self.handlers.iter_mut().filter(|(k, _)| *k == kind) {
            handler(event, surfaces);
            delivered += 1;
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::feature::{Feature, Geometry};
    use crate::projection::Coordinate;
    use crate::surface::{ModalState, TooltipState};

    struct OneFeature(Feature);

    impl MapRenderer for OneFeature {
        fn features_at_pixel(&self, pixel: Pixel) -> Vec<&Feature> {
            if pixel.x < 50.0 {
                vec![&self.0]
            } else {
                Vec::new()
            }
        }
    }

    fn renderer() -> OneFeature {
        OneFeature(
            Feature::new(Geometry::Point(Coordinate::new(0.0, 0.0)))
                .with("name", "Quake A")
                .with("addr:street", "Main"),
        )
    }

    #[test]
    fn test_pointer_move_routes_to_tooltip() {
        let renderer = renderer();
        let mut tooltip = TooltipState::default();
        let mut modal = ModalState::default();
        let mut dispatcher = EventDispatcher::with_presenters(
            FeatureInfoPresenter,
            FeatureDetailPresenter::default(),
        );

        let mut surfaces = Surfaces {
            renderer: &renderer,
            tooltip: &mut tooltip,
            modal: &mut modal,
        };
        let ran = dispatcher.dispatch(
            &MapEvent::PointerMove {
                pixel: Pixel::new(10.0, 40.0),
                dragging: false,
            },
            &mut surfaces,
        );

        assert_eq!(ran, 1);
        assert!(tooltip.visible);
        assert_eq!(tooltip.title.as_deref(), Some("Quake A"));
        assert!(!modal.open);
    }

    #[test]
    fn test_click_routes_to_modal() {
        let renderer = renderer();
        let mut tooltip = TooltipState::default();
        let mut modal = ModalState::default();
        let mut dispatcher = EventDispatcher::with_presenters(
            FeatureInfoPresenter,
            FeatureDetailPresenter::default(),
        );

        let mut surfaces = Surfaces {
            renderer: &renderer,
            tooltip: &mut tooltip,
            modal: &mut modal,
        };
        dispatcher.dispatch(&MapEvent::Click { pixel: Pixel::new(10.0, 40.0) }, &mut surfaces);

        assert!(modal.open);
        assert_eq!(modal.header, "Quake A");
        assert!(!tooltip.visible);
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let renderer = renderer();
        let mut tooltip = TooltipState::default();
        let mut modal = ModalState::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();

        for tag in ["first", "second"] {
            let log = Rc::clone(&log);
            dispatcher.on(EventKind::Click, move |_, _| log.borrow_mut().push(tag));
        }
        let other = Rc::clone(&log);
        dispatcher.on(EventKind::PointerMove, move |_, _| other.borrow_mut().push("move"));

        let mut surfaces = Surfaces {
            renderer: &renderer,
            tooltip: &mut tooltip,
            modal: &mut modal,
        };
        let ran = dispatcher.dispatch(&MapEvent::Click { pixel: Pixel::default() }, &mut surfaces);

        assert_eq!(ran, 2);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }
}
