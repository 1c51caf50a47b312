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

//! UI surfaces the presenters write to.
//!
//! [`TooltipState`] and [`ModalState`] are plain state holders; a UI toolkit
//! draws them each frame.

use crate::fragment::DetailFragment;
use crate::viewport::Pixel;

/// Hover tooltip: manually shown and hidden, never animated.
pub trait Tooltip {
    fn set_position(&mut self, pixel: Pixel);
    fn set_title(&mut self, title: &str);
    fn show(&mut self);
    fn hide(&mut self);
}

/// Modal details dialog.
pub trait Modal {
    fn set_header(&mut self, header: &str);
    fn set_body(&mut self, body: DetailFragment);
    fn show(&mut self);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipState {
    pub position: Option<Pixel>,
    pub title: Option<String>,
    pub visible: bool,
}

impl Tooltip for TooltipState {
    fn set_position(&mut self, pixel: Pixel) {
        self.position = Some(pixel);
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalState {
    pub header: String,
    pub body: DetailFragment,
    pub open: bool,
}

impl ModalState {
    pub fn close(&mut self) {
        self.open = false;
    }
}

impl Modal for ModalState {
    fn set_header(&mut self, header: &str) {
        self.header = header.to_string();
    }

    fn set_body(&mut self, body: DetailFragment) {
        self.body = body;
    }

    fn show(&mut self) {
        self.open = true;
    }
}
