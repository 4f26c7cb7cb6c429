//! GeoJSON data types, the GeoJSON layer and validated lane records.

pub mod geojson;
pub mod lanes;
