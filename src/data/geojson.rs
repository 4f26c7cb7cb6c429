use crate::{
    core::{
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    ui::popup::Popup,
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// A GeoJSON position. Longitude and latitude are kept; an altitude or any
/// further members are accepted and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position(pub [f64; 2]);

impl Position {
    pub fn to_lat_lng(self) -> LatLng {
        LatLng::from_position(self.0)
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(values: Vec<f64>) -> std::result::Result<Self, Self::Error> {
        match values.as_slice() {
            [lng, lat, ..] => Ok(Self([*lng, *lat])),
            _ => Err(format!(
                "a position needs at least 2 numbers, got {}",
                values.len()
            )),
        }
    }
}

impl From<[f64; 2]> for Position {
    fn from(position: [f64; 2]) -> Self {
        Self(position)
    }
}

impl From<Position> for [f64; 2] {
    fn from(position: Position) -> Self {
        position.0
    }
}

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: Position,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonGeometry>,
    },
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    pub id: Option<serde_json::Value>,
    pub geometry: Option<GeoJsonGeometry>,
    pub properties: Option<HashMap<String, serde_json::Value>>,
}

impl GeoJsonFeature {
    /// Raw property value
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.as_ref()?.get(key)
    }

    /// Property rendered as display text: strings without quotes, `null` and
    /// missing values as `None`
    pub fn property_text(&self, key: &str) -> Option<String> {
        match self.property(key)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Identifier as display text: `properties.id`, else the feature-level `id`
    pub fn id_text(&self) -> Option<String> {
        self.property_text("id")
            .or_else(|| match self.id.as_ref()? {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
    }

    /// Bounding box of the feature's geometry
    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.geometry.as_ref().and_then(GeoJsonGeometry::bounds)
    }
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Feature(GeoJsonFeature),
    FeatureCollection {
        #[serde(default)]
        features: Vec<GeoJsonFeature>,
    },
}

impl GeoJson {
    /// Features in document order
    pub fn features(&self) -> &[GeoJsonFeature] {
        match self {
            GeoJson::Feature(feature) => std::slice::from_ref(feature),
            GeoJson::FeatureCollection { features } => features,
        }
    }
}

impl FromStr for GeoJson {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| MapError::ParseError(format!("Invalid GeoJSON: {}", e)))
    }
}

/// Style information for rendering GeoJSON features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStyle {
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub stroke_opacity: Option<f64>,
    pub fill: Option<String>,
    pub fill_opacity: Option<f64>,
}

impl FeatureStyle {
    /// Stroke-only style with a color and a weight
    pub fn line(color: &str, weight: f64) -> Self {
        Self {
            stroke: Some(color.to_string()),
            stroke_width: Some(weight),
            ..Default::default()
        }
    }
}

impl Default for FeatureStyle {
    fn default() -> Self {
        Self {
            stroke: Some("#3388ff".to_string()),
            stroke_width: Some(3.0),
            stroke_opacity: Some(1.0),
            fill: Some("#3388ff".to_string()),
            fill_opacity: Some(0.2),
        }
    }
}

/// A feature that has been added to a [`GeoJsonLayer`], with its resolved
/// style and any popup bound to it
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub feature: GeoJsonFeature,
    pub style: FeatureStyle,
    pub popup: Option<Popup>,
}

impl RenderedFeature {
    pub fn bind_popup(&mut self, popup: Popup) {
        self.popup = Some(popup);
    }
}

/// A feature outline projected into container pixels
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenPath {
    pub points: Vec<Point>,
    pub style: FeatureStyle,
}

type StyleFn = Box<dyn Fn(&GeoJsonFeature) -> FeatureStyle + Send + Sync>;
type EachFeatureFn = Box<dyn Fn(&mut RenderedFeature) + Send + Sync>;

/// GeoJSON layer for displaying geographic data.
///
/// Mirrors the Leaflet `L.geoJSON` contract: a style rule is applied to each
/// feature as it is added, an `on_each_feature` hook can bind popups, and
/// [`clear_layers`](Self::clear_layers) drops everything at once.
pub struct GeoJsonLayer {
    properties: LayerProperties,
    rendered: Vec<RenderedFeature>,
    style: FeatureStyle,
    style_function: Option<StyleFn>,
    on_each_feature: Option<EachFeatureFn>,
}

impl GeoJsonLayer {
    /// Creates an empty GeoJSON layer
    pub fn new(id: String, name: String) -> Self {
        Self {
            properties: LayerProperties::new(id, name, LayerType::GeoJson),
            rendered: Vec::new(),
            style: FeatureStyle::default(),
            style_function: None,
            on_each_feature: None,
        }
    }

    /// Sets the default style for all features
    pub fn set_style(mut self, style: FeatureStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets a function to style features based on their properties
    pub fn set_style_function<F>(mut self, style_fn: F) -> Self
    where
        F: Fn(&GeoJsonFeature) -> FeatureStyle + Send + Sync + 'static,
    {
        self.style_function = Some(Box::new(style_fn));
        self
    }

    /// Sets a hook that runs once for every feature as it is added
    pub fn set_on_each_feature<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RenderedFeature) + Send + Sync + 'static,
    {
        self.on_each_feature = Some(Box::new(hook));
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.properties.z_index = z_index;
        self
    }

    /// Adds every feature of a GeoJSON document
    pub fn add_data(&mut self, data: &GeoJson) {
        self.add_features(data.features().iter().cloned());
    }

    /// Adds features, styling each one and running the per-feature hook
    pub fn add_features<I>(&mut self, features: I)
    where
        I: IntoIterator<Item = GeoJsonFeature>,
    {
        for feature in features {
            let style = self.feature_style(&feature);
            let mut rendered = RenderedFeature {
                feature,
                style,
                popup: None,
            };
            if let Some(hook) = &self.on_each_feature {
                hook(&mut rendered);
            }
            self.rendered.push(rendered);
        }
    }

    /// Removes every feature from the layer
    pub fn clear_layers(&mut self) {
        self.rendered.clear();
    }

    /// Gets all features in the layer
    pub fn features(&self) -> impl Iterator<Item = &GeoJsonFeature> {
        self.rendered.iter().map(|r| &r.feature)
    }

    pub fn rendered(&self) -> &[RenderedFeature] {
        &self.rendered
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }

    /// Gets the bounding box of all features
    pub fn features_bounds(&self) -> Option<LatLngBounds> {
        self.rendered
            .iter()
            .filter_map(|r| r.feature.bounds())
            .reduce(|acc, b| acc.union(&b))
    }

    /// Gets the style for a specific feature
    pub fn feature_style(&self, feature: &GeoJsonFeature) -> FeatureStyle {
        if let Some(style_fn) = &self.style_function {
            style_fn(feature)
        } else {
            self.style.clone()
        }
    }

    /// Projects every feature's outline into container pixels
    pub fn screen_paths(&self, viewport: &Viewport) -> Vec<ScreenPath> {
        self.rendered
            .iter()
            .filter_map(|r| {
                let points: Vec<Point> = r
                    .feature
                    .geometry
                    .as_ref()?
                    .to_lat_lng_points()
                    .iter()
                    .map(|p| viewport.lat_lng_to_pixel(p))
                    .collect();
                Some(ScreenPath {
                    points,
                    style: r.style.clone(),
                })
            })
            .collect()
    }
}

impl LayerTrait for GeoJsonLayer {
    crate::impl_layer_trait!(GeoJsonLayer, properties);

    fn bounds(&self) -> Option<LatLngBounds> {
        self.features_bounds()
    }

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "style": self.style,
            "feature_count": self.rendered.len(),
        })
    }

    fn set_options(&mut self, options: serde_json::Value) -> Result<()> {
        if let Some(style) = options.get("style") {
            self.style = serde_json::from_value(style.clone())?;
        }
        Ok(())
    }
}

impl GeoJsonGeometry {
    /// Converts coordinates to LatLng points
    pub fn to_lat_lng_points(&self) -> Vec<LatLng> {
        match self {
            GeoJsonGeometry::Point { coordinates } => vec![coordinates.to_lat_lng()],
            GeoJsonGeometry::LineString { coordinates }
            | GeoJsonGeometry::MultiPoint { coordinates } => {
                coordinates.iter().copied().map(Position::to_lat_lng).collect()
            }
            GeoJsonGeometry::Polygon { coordinates }
            | GeoJsonGeometry::MultiLineString { coordinates } => coordinates
                .iter()
                .flatten()
                .copied()
                .map(Position::to_lat_lng)
                .collect(),
            GeoJsonGeometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .flatten()
                .flatten()
                .copied()
                .map(Position::to_lat_lng)
                .collect(),
            GeoJsonGeometry::GeometryCollection { geometries } => geometries
                .iter()
                .flat_map(GeoJsonGeometry::to_lat_lng_points)
                .collect(),
        }
    }

    /// Bounding box of every position in the geometry
    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(&self.to_lat_lng_points())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i64, coords: &[[f64; 2]]) -> GeoJsonFeature {
        let mut properties = HashMap::new();
        properties.insert("id".to_string(), serde_json::json!(id));
        GeoJsonFeature {
            id: None,
            geometry: Some(GeoJsonGeometry::LineString {
                coordinates: coords.iter().copied().map(Position::from).collect(),
            }),
            properties: Some(properties),
        }
    }

    #[test]
    fn test_geojson_parsing() {
        let geojson: GeoJson = r#"
        {
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"id": 7, "type_names": "Lane Nominal"},
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[-122.42, 37.77], [-122.41, 37.78]]
                    }
                }
            ]
        }
        "#
        .parse()
        .unwrap();

        let features = geojson.features();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].property_text("type_names").as_deref(), Some("Lane Nominal"));
        assert_eq!(features[0].property_text("id").as_deref(), Some("7"));
        assert_eq!(features[0].property_text("missing"), None);
    }

    #[test]
    fn test_positions_with_altitude() {
        let geometry: GeoJsonGeometry = serde_json::from_str(
            r#"{"type": "LineString", "coordinates": [[-122.42, 37.77, 12.5], [-122.41, 37.78, 0.0, 7.0]]}"#,
        )
        .unwrap();

        assert_eq!(
            geometry.to_lat_lng_points(),
            vec![LatLng::new(37.77, -122.42), LatLng::new(37.78, -122.41)]
        );
        assert!(serde_json::from_str::<GeoJsonGeometry>(
            r#"{"type": "Point", "coordinates": [-122.42]}"#
        )
        .is_err());
    }

    #[test]
    fn test_feature_id_falls_back_to_feature_level() {
        let feature: GeoJsonFeature =
            serde_json::from_str(r#"{"id": "lane-9", "geometry": null, "properties": {}}"#).unwrap();
        assert_eq!(feature.id_text().as_deref(), Some("lane-9"));

        let feature: GeoJsonFeature =
            serde_json::from_str(r#"{"id": 1, "geometry": null, "properties": {"id": 2}}"#).unwrap();
        assert_eq!(feature.id_text().as_deref(), Some("2"));
    }

    #[test]
    fn test_invalid_geojson() {
        assert!(matches!(
            "{\"type\": \"Nope\"}".parse::<GeoJson>(),
            Err(MapError::ParseError(_))
        ));
    }

    #[test]
    fn test_polygon_points_use_all_rings() {
        let ring = |coords: [[f64; 2]; 4]| coords.into_iter().map(Position::from).collect();
        let geometry = GeoJsonGeometry::Polygon {
            coordinates: vec![
                ring([[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 0.0]]),
                ring([[0.5, 0.5], [1.0, 0.5], [1.0, 1.0], [0.5, 0.5]]),
            ],
        };

        assert_eq!(geometry.to_lat_lng_points().len(), 8);
        let bounds = geometry.bounds().unwrap();
        assert_eq!(bounds.north_east, LatLng::new(2.0, 2.0));
    }

    #[test]
    fn test_style_function_and_hook_run_per_feature() {
        let mut layer = GeoJsonLayer::new("lanes".to_string(), "Lanes".to_string())
            .set_style_function(|_| FeatureStyle::line("blue", 2.0))
            .set_on_each_feature(|rendered| {
                let id = rendered.feature.property_text("id").unwrap_or_default();
                rendered.bind_popup(Popup::new(id, LatLng::default(), Vec::new()));
            });

        layer.add_features(vec![
            line(1, &[[-122.42, 37.77], [-122.41, 37.78]]),
            line(2, &[[-122.40, 37.76], [-122.39, 37.75]]),
        ]);

        assert_eq!(layer.len(), 2);
        for rendered in layer.rendered() {
            assert_eq!(rendered.style.stroke.as_deref(), Some("blue"));
            assert_eq!(rendered.style.stroke_width, Some(2.0));
            assert!(rendered.popup.is_some());
        }
    }

    #[test]
    fn test_clear_layers_and_bounds() {
        let mut layer = GeoJsonLayer::new("lanes".to_string(), "Lanes".to_string());
        assert!(layer.features_bounds().is_none());

        layer.add_features(vec![
            line(1, &[[-122.42, 37.77], [-122.41, 37.78]]),
            line(2, &[[-122.40, 37.76], [-122.39, 37.75]]),
        ]);
        let bounds = layer.features_bounds().unwrap();
        assert_eq!(bounds.south_west, LatLng::new(37.75, -122.42));
        assert_eq!(bounds.north_east, LatLng::new(37.78, -122.39));

        layer.clear_layers();
        assert!(layer.is_empty());
        assert!(layer.features_bounds().is_none());
    }

    #[test]
    fn test_screen_paths_follow_geometry() {
        let mut layer = GeoJsonLayer::new("lanes".to_string(), "Lanes".to_string());
        layer.add_features(vec![line(1, &[[-122.42, 37.77], [-122.41, 37.78]])]);
        let viewport = Viewport::new(LatLng::new(37.775, -122.415), 15.0, Point::new(800.0, 600.0));

        let paths = layer.screen_paths(&viewport);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].points.len(), 2);
        // second vertex is north-east of the first
        assert!(paths[0].points[1].x > paths[0].points[0].x);
        assert!(paths[0].points[1].y < paths[0].points[0].y);
    }
}
