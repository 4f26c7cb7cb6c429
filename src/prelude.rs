//! Prelude module for common lanemap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use lanemap::prelude::*;`

pub use crate::core::{
    config::LaneMapConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{Map, MapOptions},
    viewport::Viewport,
};

pub use crate::layers::{
    base::{LayerProperties, LayerTrait, LayerType},
    manager::LayerManager,
    tile::{TileLayer, TileLayerOptions},
};

pub use crate::data::{
    geojson::{FeatureStyle, GeoJson, GeoJsonFeature, GeoJsonGeometry, GeoJsonLayer},
    lanes::{LaneCollection, LaneFeature},
};

pub use crate::api::{
    client::{HttpLaneClient, LaneSource},
    filter::{FilterParams, LANE_NOMINAL},
};

pub use crate::ui::{
    controls::{FilterForm, FilterInputs, LogNotifier, Notice, Notifier, RecordingNotifier},
    popup::{Popup, PopupField},
};

pub use crate::controller::{LaneRequest, LoadOutcome, MapViewController};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
