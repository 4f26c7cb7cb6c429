//! The map view controller.
//!
//! Owns the map, its base tile layer and the single "lanes" GeoJSON layer.
//! Every load reads the filter form, asks the [`LaneSource`] for lanes and
//! replaces the lanes layer with the answer. Each request is numbered and
//! only the newest one may change the map.

use crate::{
    api::{client::HttpLaneClient, client::LaneSource, filter::FilterParams},
    core::{
        config::LaneMapConfig,
        constants::{BASE_LAYER_ID, LANES_LAYER_ID},
        geo::LatLngBounds,
        map::Map,
        viewport::Viewport,
    },
    data::{geojson::GeoJsonLayer, lanes::LaneCollection},
    layers::tile::TileLayer,
    ui::{
        controls::{FilterInputs, Notice, Notifier},
        popup::Popup,
    },
    MapError, Result,
};
use std::sync::Arc;

/// A request that has been numbered but not yet answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneRequest {
    pub seq: u64,
    pub params: FilterParams,
}

/// What a completed request did to the map
#[derive(Debug)]
pub enum LoadOutcome {
    /// The lanes layer now holds `features` lanes and the view fits `bounds`
    Rendered {
        features: usize,
        bounds: LatLngBounds,
    },
    /// The answer was empty; the layer was cleared and the view left alone
    NoResults,
    /// The request failed; the map is unchanged
    Failed(MapError),
    /// A newer request was issued after this one; the answer was dropped
    Stale { seq: u64, latest: u64 },
}

impl LoadOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, LoadOutcome::Rendered { .. })
    }
}

pub struct MapViewController {
    map: Map,
    source: Arc<dyn LaneSource>,
    inputs: Arc<dyn FilterInputs>,
    notifier: Arc<dyn Notifier>,
    config: LaneMapConfig,
    latest_seq: u64,
}

impl MapViewController {
    /// Controller with the default configuration
    pub fn new(
        source: Arc<dyn LaneSource>,
        inputs: Arc<dyn FilterInputs>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        Self::with_config(LaneMapConfig::default(), source, inputs, notifier)
    }

    pub fn with_config(
        config: LaneMapConfig,
        source: Arc<dyn LaneSource>,
        inputs: Arc<dyn FilterInputs>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config.validate()?;
        let map = Self::build_map(&config)?;

        Ok(Self {
            map,
            source,
            inputs,
            notifier,
            config,
            latest_seq: 0,
        })
    }

    /// Controller talking to the HTTP lane API named in `config`
    pub fn connect(
        config: LaneMapConfig,
        inputs: Arc<dyn FilterInputs>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let client = HttpLaneClient::new(&config)?;
        log::info!("lane API at {}", client.endpoint());
        Self::with_config(config, Arc::new(client), inputs, notifier)
    }

    fn build_map(config: &LaneMapConfig) -> Result<Map> {
        let mut map = Map::new(config.center, config.zoom, config.viewport_size);

        let base = TileLayer::with_options(
            BASE_LAYER_ID.to_string(),
            "OpenStreetMap".to_string(),
            config.tile.clone(),
        );
        map.add_layer(Box::new(base))?;

        let lane_style = config.lane_style();
        let lanes = GeoJsonLayer::new(LANES_LAYER_ID.to_string(), "Lanes".to_string())
            .set_style_function(move |_| lane_style.clone())
            .set_on_each_feature(|rendered| {
                let popup = Popup::for_lane(&rendered.feature);
                rendered.bind_popup(popup);
            })
            .with_z_index(1);
        map.add_layer(Box::new(lanes))?;

        Ok(map)
    }

    /// Runs the first load with whatever the filter form holds at startup
    pub async fn start(&mut self) -> LoadOutcome {
        log::info!(
            "map ready at ({:.4}, {:.4}) zoom {}",
            self.map.viewport().center.lat,
            self.map.viewport().center.lng,
            self.map.viewport().zoom
        );
        self.load_lanes().await
    }

    /// Handler for the filter button
    pub async fn on_filter_click(&mut self) -> LoadOutcome {
        self.load_lanes().await
    }

    /// Reads the filters, fetches lanes and applies the answer
    pub async fn load_lanes(&mut self) -> LoadOutcome {
        let LaneRequest { seq, params } = self.begin_request();
        let source = Arc::clone(&self.source);
        let result = source.fetch_lanes(&params).await;
        self.complete_request(seq, result)
    }

    /// Reads the filter inputs and numbers a new request. Any request begun
    /// earlier becomes stale.
    pub fn begin_request(&mut self) -> LaneRequest {
        let params = FilterParams::from_inputs(
            &self.inputs.type_names(),
            &self.inputs.semantic_description(),
        );
        self.latest_seq += 1;
        log::debug!("lane request #{} with {:?}", self.latest_seq, params);

        LaneRequest {
            seq: self.latest_seq,
            params,
        }
    }

    /// Starts a request on the tokio runtime. Pass the joined result to
    /// [`complete_request`](Self::complete_request) together with the sequence number.
    #[cfg(feature = "tokio-runtime")]
    pub fn spawn_request(&mut self) -> (u64, tokio::task::JoinHandle<Result<LaneCollection>>) {
        let LaneRequest { seq, params } = self.begin_request();
        let source = Arc::clone(&self.source);
        let handle = tokio::spawn(async move { source.fetch_lanes(&params).await });
        (seq, handle)
    }

    /// Applies the answer to request `seq`
    pub fn complete_request(&mut self, seq: u64, result: Result<LaneCollection>) -> LoadOutcome {
        if seq < self.latest_seq {
            log::debug!(
                "dropping answer to lane request #{}, #{} is newer",
                seq,
                self.latest_seq
            );
            return LoadOutcome::Stale {
                seq,
                latest: self.latest_seq,
            };
        }

        let lanes = match result {
            Ok(lanes) => lanes,
            Err(error) => {
                log::error!("lane request #{} failed: {}", seq, error);
                self.notifier.notify(Notice::RequestFailed);
                return LoadOutcome::Failed(error);
            }
        };

        let features = lanes.len();
        let bounds = lanes.bounds();
        let data = lanes.into_geojson();
        let replaced = self.map.with_layer_as_mut::<GeoJsonLayer, _, _>(LANES_LAYER_ID, |layer| {
            layer.clear_layers();
            layer.add_data(&data);
        });
        if replaced.is_none() {
            let error = MapError::Layer(format!("layer '{}' is missing", LANES_LAYER_ID));
            log::error!("lane request #{}: {}", seq, error);
            self.notifier.notify(Notice::RequestFailed);
            return LoadOutcome::Failed(error);
        }

        let Some(bounds) = bounds else {
            log::info!("lane request #{} matched no lanes", seq);
            self.notifier.notify(Notice::NoResults);
            return LoadOutcome::NoResults;
        };

        if let Err(error) = self.map.fit_bounds(&bounds, None) {
            log::warn!("cannot fit view to lanes: {}", error);
        }
        log::info!(
            "rendered {} lanes, view at zoom {}",
            features,
            self.map.viewport().zoom
        );

        LoadOutcome::Rendered { features, bounds }
    }

    pub fn lanes_layer(&self) -> Option<&GeoJsonLayer> {
        self.map.layer::<GeoJsonLayer>(LANES_LAYER_ID)
    }

    pub fn base_layer(&self) -> Option<&TileLayer> {
        self.map.layer::<TileLayer>(BASE_LAYER_ID)
    }

    pub fn viewport(&self) -> &Viewport {
        self.map.viewport()
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn config(&self) -> &LaneMapConfig {
        &self.config
    }

    /// Sequence number of the newest request issued
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::LatLng,
        ui::controls::{FilterForm, RecordingNotifier},
    };
    use async_trait::async_trait;
    use futures::executor::block_on;
    use serde_json::json;

    struct FixedSource(serde_json::Value);

    #[async_trait]
    impl LaneSource for FixedSource {
        async fn fetch_lanes(&self, _params: &FilterParams) -> Result<LaneCollection> {
            LaneCollection::from_value(self.0.clone())
        }
    }

    fn lanes_body() -> serde_json::Value {
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": [[-122.45, 37.70], [-122.44, 37.71]]},
                "properties": {"id": 3, "type_names": "Lane Nominal", "semantic_description": "straight"}
            }]
        })
    }

    fn controller(body: serde_json::Value) -> (MapViewController, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = MapViewController::new(
            Arc::new(FixedSource(body)),
            Arc::new(FilterForm::default()),
            notifier.clone(),
        )
        .unwrap();
        (controller, notifier)
    }

    #[test]
    fn test_initial_map() {
        let (controller, _) = controller(json!({}));

        assert_eq!(controller.viewport().center, LatLng::new(37.7749, -122.4194));
        assert_eq!(controller.viewport().zoom, 13.0);
        assert_eq!(controller.map().list_layers(), vec!["osm", "lanes"]);
        assert!(controller.lanes_layer().unwrap().is_empty());
        assert_eq!(controller.base_layer().unwrap().max_zoom(), 19);
    }

    #[test]
    fn test_load_binds_popups_and_style() {
        let (mut controller, notifier) = controller(lanes_body());

        let outcome = block_on(controller.start());
        assert!(outcome.is_rendered());
        assert!(notifier.notices().is_empty());

        let rendered = &controller.lanes_layer().unwrap().rendered()[0];
        assert_eq!(rendered.style.stroke.as_deref(), Some("blue"));
        assert_eq!(rendered.style.stroke_width, Some(2.0));
        let popup = rendered.popup.as_ref().unwrap();
        assert_eq!(popup.field("ID"), Some("3"));
        assert_eq!(popup.field("Semantic Description"), Some("straight"));
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let (mut controller, _) = controller(json!({}));

        assert_eq!(controller.begin_request().seq, 1);
        assert_eq!(controller.begin_request().seq, 2);
        assert_eq!(controller.latest_seq(), 2);
    }

    #[test]
    fn test_stale_answer_is_dropped() {
        let (mut controller, notifier) = controller(json!({}));
        let first = controller.begin_request();
        let _second = controller.begin_request();

        let outcome = controller.complete_request(
            first.seq,
            Err(MapError::InvalidResponse("late".to_string())),
        );

        assert!(matches!(outcome, LoadOutcome::Stale { seq: 1, latest: 2 }));
        assert!(notifier.notices().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = LaneMapConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        let result = MapViewController::with_config(
            config,
            Arc::new(FixedSource(json!({}))),
            Arc::new(FilterForm::default()),
            Arc::new(RecordingNotifier::new()),
        );
        assert!(matches!(result, Err(MapError::Config(_))));
    }
}
