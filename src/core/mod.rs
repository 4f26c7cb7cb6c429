//! Map core: coordinates, viewport, the map itself and its configuration.

pub mod config;
pub mod constants;
pub mod geo;
pub mod map;
pub mod viewport;
