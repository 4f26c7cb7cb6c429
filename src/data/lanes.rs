//! Lane records as returned by the lane API, validated at the boundary.
//!
//! The API answers with a GeoJSON `FeatureCollection` whose features carry
//! `id`, `type_names` and `semantic_description` properties. Anything that
//! does not look like that is rejected here so the map never renders a
//! half-understood payload.

use crate::{
    core::geo::LatLngBounds,
    data::geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry},
    MapError, Result,
};
use serde_json::Value;

/// One lane feature
#[derive(Debug, Clone, PartialEq)]
pub struct LaneFeature {
    pub id: String,
    pub type_names: Option<String>,
    pub semantic_description: Option<String>,
    pub geometry: GeoJsonGeometry,
    feature: GeoJsonFeature,
}

impl LaneFeature {
    /// Validates a GeoJSON feature as a lane. `index` is only used in error messages.
    pub fn try_from_feature(index: usize, feature: GeoJsonFeature) -> Result<Self> {
        let geometry = feature.geometry.clone().ok_or_else(|| {
            MapError::InvalidResponse(format!("feature {} has no geometry", index))
        })?;

        let points = geometry.to_lat_lng_points();
        if points.is_empty() {
            return Err(MapError::InvalidResponse(format!(
                "feature {} has an empty geometry",
                index
            )));
        }
        if let Some(bad) = points.iter().find(|p| !p.is_valid()) {
            return Err(MapError::InvalidCoordinates(format!(
                "feature {} has coordinate ({}, {}) out of range",
                index, bad.lat, bad.lng
            )));
        }

        let id = feature
            .id_text()
            .ok_or_else(|| MapError::InvalidResponse(format!("feature {} has no id", index)))?;

        Ok(Self {
            id,
            type_names: feature.property_text("type_names"),
            semantic_description: feature.property_text("semantic_description"),
            geometry,
            feature,
        })
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.geometry.bounds()
    }

    /// The validated feature as it arrived
    pub fn as_feature(&self) -> &GeoJsonFeature {
        &self.feature
    }

    pub fn into_feature(self) -> GeoJsonFeature {
        self.feature
    }
}

/// A validated response from the lane API
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaneCollection {
    lanes: Vec<LaneFeature>,
}

impl LaneCollection {
    pub fn new(lanes: Vec<LaneFeature>) -> Self {
        Self { lanes }
    }

    /// Validates a decoded JSON body.
    ///
    /// A missing or `null` `features` member counts as an empty collection.
    /// A `type` other than `FeatureCollection`, a non-array `features` or any
    /// invalid feature is an [`MapError::InvalidResponse`].
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut object) = value else {
            return Err(MapError::InvalidResponse(
                "expected a JSON object".to_string(),
            ));
        };

        match object.get("type") {
            None | Some(Value::Null) => {}
            Some(Value::String(kind)) if kind == "FeatureCollection" => {}
            Some(other) => {
                return Err(MapError::InvalidResponse(format!(
                    "expected a FeatureCollection, got type {}",
                    other
                )))
            }
        }

        let raw_features = match object.remove("features") {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(MapError::InvalidResponse(format!(
                    "features must be an array, got {}",
                    other
                )))
            }
        };

        let lanes = raw_features
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                let feature: GeoJsonFeature = serde_json::from_value(raw).map_err(|e| {
                    MapError::InvalidResponse(format!("feature {} is malformed: {}", index, e))
                })?;
                LaneFeature::try_from_feature(index, feature)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { lanes })
    }

    /// Validates a JSON body given as text
    pub fn from_json_str(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| MapError::InvalidResponse(format!("body is not JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn lanes(&self) -> &[LaneFeature] {
        &self.lanes
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Bounding box of every lane
    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.lanes
            .iter()
            .filter_map(LaneFeature::bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    /// Back to a GeoJSON document, ready to be added to a layer
    pub fn into_geojson(self) -> GeoJson {
        GeoJson::FeatureCollection {
            features: self
                .lanes
                .into_iter()
                .map(LaneFeature::into_feature)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use serde_json::json;

    fn lane_json(id: i64, coords: Value) -> Value {
        json!({
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": coords},
            "properties": {
                "id": id,
                "type_names": "Lane Nominal",
                "semantic_description": "curved"
            }
        })
    }

    #[test]
    fn test_valid_collection() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [
                lane_json(1, json!([[-122.42, 37.77], [-122.41, 37.78]])),
                lane_json(2, json!([[-122.40, 37.76], [-122.39, 37.75]])),
            ]
        });

        let lanes = LaneCollection::from_value(body).unwrap();
        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes.lanes()[0].id, "1");
        assert_eq!(lanes.lanes()[0].type_names.as_deref(), Some("Lane Nominal"));
        assert_eq!(lanes.lanes()[1].semantic_description.as_deref(), Some("curved"));

        let bounds = lanes.bounds().unwrap();
        assert_eq!(bounds.south_west, LatLng::new(37.75, -122.42));
        assert_eq!(bounds.north_east, LatLng::new(37.78, -122.39));
    }

    #[test]
    fn test_missing_or_null_features_is_empty() {
        assert!(LaneCollection::from_value(json!({})).unwrap().is_empty());
        assert!(LaneCollection::from_value(json!({"features": null}))
            .unwrap()
            .is_empty());
        assert!(LaneCollection::from_value(json!({"type": "FeatureCollection", "features": []}))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_wrong_shapes_are_rejected() {
        for body in [
            json!([]),
            json!("lanes"),
            json!({"type": "Feature"}),
            json!({"features": {"a": 1}}),
            json!({"features": [{"geometry": {"type": "Blob"}}]}),
        ] {
            assert!(
                matches!(LaneCollection::from_value(body.clone()), Err(MapError::InvalidResponse(_))),
                "accepted {}",
                body
            );
        }
    }

    #[test]
    fn test_feature_without_geometry_or_id() {
        let no_geometry = json!({"features": [{"type": "Feature", "properties": {"id": 1}}]});
        assert!(LaneCollection::from_value(no_geometry).is_err());

        let no_id = json!({"features": [{
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [-122.4, 37.7]},
            "properties": {"type_names": "Lane Nominal"}
        }]});
        assert!(LaneCollection::from_value(no_id).is_err());
    }

    #[test]
    fn test_feature_level_id_is_accepted() {
        let body = json!({"features": [{
            "type": "Feature",
            "id": "lane-9",
            "geometry": {"type": "Point", "coordinates": [-122.4, 37.7]},
            "properties": {}
        }]});

        let lanes = LaneCollection::from_value(body).unwrap();
        assert_eq!(lanes.lanes()[0].id, "lane-9");
        assert_eq!(lanes.lanes()[0].type_names, None);
    }

    #[test]
    fn test_positions_with_altitude_are_accepted() {
        let body = json!({"type": "FeatureCollection", "features": [
            lane_json(1, json!([[-122.42, 37.77, 0.0], [-122.41, 37.78, 0.0]]))
        ]});

        let lanes = LaneCollection::from_value(body).unwrap();
        assert_eq!(lanes.len(), 1);
        let bounds = lanes.bounds().unwrap();
        assert_eq!(bounds.south_west, LatLng::new(37.77, -122.42));
        assert_eq!(bounds.north_east, LatLng::new(37.78, -122.41));
    }

    #[test]
    fn test_short_position_is_rejected() {
        let body = json!({"features": [lane_json(1, json!([[-122.42], [-122.41, 37.78]]))]});
        assert!(matches!(
            LaneCollection::from_value(body),
            Err(MapError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let body = json!({"features": [lane_json(1, json!([[-122.42, 137.77], [-122.41, 37.78]]))]});
        assert!(matches!(
            LaneCollection::from_value(body),
            Err(MapError::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_body_that_is_not_json() {
        assert!(matches!(
            LaneCollection::from_json_str("<html>oops</html>"),
            Err(MapError::InvalidResponse(_))
        ));
    }
}
