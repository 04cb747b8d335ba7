#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Sector map overlay.
//!
//! Loads every sector boundary from the backend once the map is ready,
//! colors each by green cover, and keeps the camera, status line and
//! popups as plain data. The browser applies a [`MapProjection`] and never
//! mutates map state on its own.

pub mod bounds;
pub mod controller;
pub mod features;
pub mod layers;
pub mod palette;
pub mod popup;
pub mod state;

pub use bounds::LngLatBounds;
pub use controller::OverlayController;
pub use features::{FeatureError, SectorFeature};
pub use palette::{ColorBucket, LegendEntry, color_for, legend};
pub use popup::SectorPopup;
pub use state::{
    CameraTarget, LoadOutcome, LoadStatus, MapProjection, MessageLevel, OverlayState,
    SelectionOutcome, StatusMessage,
};
