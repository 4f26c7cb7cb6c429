//! # lanemap
//!
//! A map view controller for lane data, built on a small Leaflet-style
//! map core.
//!
//! The crate owns a [`Map`] with a base [`TileLayer`] and a single GeoJSON
//! "lanes" layer, reads filter values from the UI through [`FilterInputs`],
//! queries a lane API through a [`LaneSource`] and replaces the lanes layer
//! with whatever comes back.

pub mod api;
pub mod controller;
pub mod core;
pub mod data;
pub mod layers;
pub mod prelude;
pub mod traits;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::LaneMapConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::Map,
    viewport::Viewport,
};

pub use layers::{base::LayerTrait, tile::TileLayer};

pub use data::{
    geojson::{GeoJson, GeoJsonLayer},
    lanes::{LaneCollection, LaneFeature},
};

pub use api::{
    client::{HttpLaneClient, LaneSource},
    filter::FilterParams,
};

pub use ui::{
    controls::{FilterForm, FilterInputs, LogNotifier, Notice, Notifier, RecordingNotifier},
    popup::Popup,
};

pub use controller::{LaneRequest, LoadOutcome, MapViewController};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger` as the `log` backend. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(cfg!(test))
        .try_init();
}
