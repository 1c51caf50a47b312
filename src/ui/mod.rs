//! UI components for the KML map viewer.
//!
//! The presenters write into plain state holders; these components draw
//! that state with egui each frame.

pub mod details_window;
pub mod feature_tooltip;

pub use details_window::DetailsWindow;
pub use feature_tooltip::FeatureTooltip;
