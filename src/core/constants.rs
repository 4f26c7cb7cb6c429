//! Core constants for the lane map: initial view, base tiles and lane styling.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Initial map center latitude (San Francisco).
pub const DEFAULT_CENTER_LAT: f64 = 37.7749;

/// Initial map center longitude (San Francisco).
pub const DEFAULT_CENTER_LNG: f64 = -122.4194;

/// Initial zoom level.
pub const DEFAULT_ZOOM: f64 = 13.0;

/// Viewport size used when no rendering surface has reported one yet.
pub const DEFAULT_VIEWPORT_SIZE: (f64, f64) = (1024.0, 768.0);

/// Padding in pixels kept around fitted bounds.
pub const FIT_BOUNDS_PADDING: f64 = 20.0;

/// OpenStreetMap tile URL template.
pub const OSM_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Highest zoom the OpenStreetMap tile server provides.
pub const OSM_MAX_ZOOM: u8 = 19;

/// Attribution shown for OpenStreetMap tiles.
pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Base URL of the lane API when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Path of the lane endpoint, relative to the base URL.
pub const LANES_ENDPOINT: &str = "/api/lanes";

/// Layer id of the base tile layer.
pub const BASE_LAYER_ID: &str = "osm";

/// Layer id of the lanes layer.
pub const LANES_LAYER_ID: &str = "lanes";

/// Stroke color applied to every lane.
pub const LANE_COLOR: &str = "blue";

/// Stroke weight applied to every lane.
pub const LANE_WEIGHT: f64 = 2.0;

/// HTTP request timeout for lane queries, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
