use crate::{
    core::{
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    layers::{base::LayerTrait, manager::LayerManager, tile::TileLayer},
    MapError, Result,
};

#[derive(Debug, Clone)]
pub struct MapOptions {
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub attribution_control: bool,
    /// Padding in pixels used by `fit_bounds` when none is given
    pub fit_padding: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            min_zoom: None,
            max_zoom: None,
            attribution_control: true,
            fit_padding: crate::core::constants::FIT_BOUNDS_PADDING,
        }
    }
}

/// A map: one viewport and the layers drawn on it
pub struct Map {
    pub viewport: Viewport,
    layer_manager: LayerManager,
    options: MapOptions,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        let viewport = Viewport::new(center, zoom, size);
        Self::with_options(viewport, MapOptions::default())
    }

    pub fn with_options(mut viewport: Viewport, options: MapOptions) -> Self {
        if options.min_zoom.is_some() || options.max_zoom.is_some() {
            viewport.set_zoom_limits(
                options.min_zoom.unwrap_or(viewport.min_zoom),
                options.max_zoom.unwrap_or(viewport.max_zoom),
            );
        }

        Self {
            viewport,
            layer_manager: LayerManager::new(),
            options,
        }
    }

    /// Sets center and zoom
    pub fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        if !center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "({}, {})",
                center.lat, center.lng
            )));
        }
        self.viewport.set_view(center, zoom);
        Ok(())
    }

    /// Centers and zooms the map so `bounds` is fully visible
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: Option<f64>) -> Result<()> {
        if !bounds.south_west.is_valid() || !bounds.north_east.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "bounds {:?} are out of range",
                bounds
            )));
        }
        self.viewport
            .fit_bounds(bounds, Some(padding.unwrap_or(self.options.fit_padding)));
        Ok(())
    }

    /// Attaches a layer. A tile layer also caps the map's max zoom at what its source serves.
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        if let Some(tile) = layer.as_any().downcast_ref::<TileLayer>() {
            let max_zoom = self
                .options
                .max_zoom
                .unwrap_or(f64::INFINITY)
                .min(tile.max_zoom() as f64);
            let min_zoom = self.viewport.min_zoom;
            self.viewport.set_zoom_limits(min_zoom, max_zoom);
        }
        log::debug!("adding layer '{}' ({})", layer.id(), layer.layer_type());
        self.layer_manager.add_layer(layer)
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Result<()> {
        self.layer_manager
            .remove_layer(layer_id)
            .map(|_| ())
            .ok_or_else(|| MapError::Layer(format!("no layer '{}'", layer_id)))
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layer_manager.get_layer(layer_id)
    }

    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layer_manager.with_layer_mut(layer_id, f)
    }

    /// Typed access to a layer
    pub fn layer<T: 'static>(&self, layer_id: &str) -> Option<&T> {
        self.get_layer(layer_id)?.as_any().downcast_ref::<T>()
    }

    /// Typed mutable access to a layer
    pub fn with_layer_as_mut<T, F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        T: 'static,
        F: FnOnce(&mut T) -> R,
    {
        self.layer_manager
            .with_layer_mut(layer_id, |layer| layer.as_any_mut().downcast_mut::<T>().map(f))
            .flatten()
    }

    /// Layer ids in draw order
    pub fn list_layers(&self) -> Vec<String> {
        self.layer_manager.list_layers()
    }

    /// Attribution strings of the attached tile layers
    pub fn attributions(&self) -> Vec<String> {
        if !self.options.attribution_control {
            return Vec::new();
        }
        self.layer_manager
            .layers()
            .into_iter()
            .filter_map(|layer| layer.as_any().downcast_ref::<TileLayer>())
            .map(|tile| tile.attribution().to_string())
            .collect()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}
