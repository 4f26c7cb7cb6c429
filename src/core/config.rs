//! Configuration for the lane map.
//!
//! Defaults reproduce the stock setup: San Francisco at zoom 13, OpenStreetMap
//! tiles, blue two-pixel lanes and a lane API on `localhost:5000`. A config
//! can be loaded from JSON and individual settings overridden from the
//! environment.

use crate::{
    core::{
        constants::{
            DEFAULT_BASE_URL, DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG,
            DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_VIEWPORT_SIZE, DEFAULT_ZOOM, LANES_ENDPOINT,
            LANE_COLOR, LANE_WEIGHT,
        },
        geo::{LatLng, Point},
    },
    data::geojson::FeatureStyle,
    layers::tile::TileLayerOptions,
    MapError, Result,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`LaneMapConfig::base_url`]
pub const ENV_BASE_URL: &str = "LANEMAP_BASE_URL";
/// Environment variable overriding [`LaneMapConfig::request_timeout_secs`]
pub const ENV_TIMEOUT_SECS: &str = "LANEMAP_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneMapConfig {
    /// Origin the lane endpoint is resolved against
    pub base_url: String,
    /// Path of the lane endpoint
    pub endpoint: String,
    pub center: LatLng,
    pub zoom: f64,
    /// Viewport size in pixels
    pub viewport_size: Point,
    pub tile: TileLayerOptions,
    pub lane_color: String,
    pub lane_weight: f64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for LaneMapConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: LANES_ENDPOINT.to_string(),
            center: LatLng::new(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG),
            zoom: DEFAULT_ZOOM,
            viewport_size: Point::new(DEFAULT_VIEWPORT_SIZE.0, DEFAULT_VIEWPORT_SIZE.1),
            tile: TileLayerOptions::default(),
            lane_color: LANE_COLOR.to_string(),
            lane_weight: LANE_WEIGHT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: concat!("lanemap/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl LaneMapConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parses a JSON config; missing keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MapError::Config(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from a key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = timeout.trim().parse().map_err(|_| {
                MapError::Config(format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))
            })?;
        }
        self.validate()
    }

    /// Rejects settings the map cannot start with
    pub fn validate(&self) -> Result<()> {
        self.endpoint_url()?;
        if !self.center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "center ({}, {}) is out of range",
                self.center.lat, self.center.lng
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(MapError::Config(
                "request timeout must be at least one second".to_string(),
            ));
        }
        if self.tile.min_zoom > self.tile.max_zoom {
            return Err(MapError::Config(format!(
                "tile min_zoom {} is above max_zoom {}",
                self.tile.min_zoom, self.tile.max_zoom
            )));
        }
        Ok(())
    }

    /// Absolute URL of the lane endpoint
    pub fn endpoint_url(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .and_then(|base| base.join(&self.endpoint))
            .map_err(|e| {
                MapError::Config(format!(
                    "cannot build lane endpoint from '{}' + '{}': {}",
                    self.base_url, self.endpoint, e
                ))
            })
    }

    /// The constant style every lane is drawn with
    pub fn lane_style(&self) -> FeatureStyle {
        FeatureStyle::line(&self.lane_color, self.lane_weight)
    }
}
