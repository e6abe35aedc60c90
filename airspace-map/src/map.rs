//! The airspace map facade.
//!
//! [`AirspaceMap`] composes the layer reconciler, tile loader, temporal
//! filter updater, markers, and click events over an injected
//! [`MapRenderer`]. Camera and control operations pass straight through to
//! the renderer.
//!
//! # Lifecycle
//!
//! 1. [`AirspaceMap::new`] validates credentials, theme, and environment
//!    support; nothing renders yet.
//! 2. [`AirspaceMap::init`] fetches the first themed style, applies camera,
//!    controls, and the requested layers, and starts the filter updater.
//! 3. [`AirspaceMap::remove`] cancels the updater, tears down the renderer,
//!    and poisons the facade: every further mutating call fails with
//!    [`MapError::TornDown`].

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::error::{MapError, TileError};
use crate::events::{
    is_airspace_feature, AirspaceClickEvent, AirspaceClickListener, ClickListeners,
};
use crate::filters::{FilterUpdater, DEFAULT_UPDATE_INTERVAL};
use crate::layers::{self, ACTIVE_TFRS, FUTURE_TFRS, TFRS};
use crate::markers::{feature_collection, Marker, MARKER_ICON, MARKER_LAYER, MARKER_SOURCE};
use crate::options::{MapConfig, MapOptions, MAX_ZOOM, MIN_ZOOM};
use crate::popup::{self, PopupContent};
use crate::renderer::{
    CameraOptions, ControlKind, ControlPosition, EventListener, ListenerId, LngLat, LngLatBounds,
    MapRenderer, ScreenPoint,
};
use crate::tiles::{HttpTileClient, Theme, TileClient};

fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Facade over an injected map renderer, working with airspace layers.
pub struct AirspaceMap {
    options: MapOptions,
    api_key: String,
    access_token: String,
    renderer: Option<Arc<dyn MapRenderer>>,
    tiles: Arc<dyn TileClient>,
    /// Active layer sequence; marker companions included, duplicates
    /// tolerated.
    layers: Vec<String>,
    markers: Vec<Marker>,
    marker_layer_added: bool,
    search_marker_id: Option<String>,
    active_theme: Theme,
    /// Monotonic guard against out-of-order style fetch completion.
    style_generation: u64,
    filter_interval: Duration,
    filter_updater: Option<FilterUpdater>,
    click_listeners: ClickListeners,
    raw_access_warned: bool,
}

impl AirspaceMap {
    /// Validates configuration and binds the facade to a renderer and tile
    /// client.
    ///
    /// Fails when either credential is missing, or the renderer reports the
    /// environment cannot display a map. Rendering starts with
    /// [`init`](Self::init).
    pub fn new(
        config: MapConfig,
        options: MapOptions,
        renderer: Arc<dyn MapRenderer>,
        tiles: Arc<dyn TileClient>,
    ) -> Result<Self, MapError> {
        let (api_key, access_token) = config.validate()?;
        if !renderer.supported() {
            return Err(MapError::UnsupportedEnvironment);
        }

        let active_theme = options.theme;
        Ok(Self {
            options,
            api_key,
            access_token,
            renderer: Some(renderer),
            tiles,
            layers: Vec::new(),
            markers: Vec::new(),
            marker_layer_added: false,
            search_marker_id: None,
            active_theme,
            style_generation: 0,
            filter_interval: DEFAULT_UPDATE_INTERVAL,
            filter_updater: None,
            click_listeners: ClickListeners::default(),
            raw_access_warned: false,
        })
    }

    /// Builds the facade with an [`HttpTileClient`] pointed at the
    /// configured tile service endpoint.
    pub fn with_http_tiles(
        config: MapConfig,
        options: MapOptions,
        renderer: Arc<dyn MapRenderer>,
    ) -> Result<Self, MapError> {
        let (api_key, _) = config.validate()?;
        let tiles = HttpTileClient::new(options.tile_service_url.clone(), api_key)?;
        Self::new(config, options, renderer, Arc::new(tiles))
    }

    /// Overrides the temporal filter recompute period (default five
    /// minutes).
    pub fn with_filter_interval(mut self, interval: Duration) -> Self {
        self.filter_interval = interval;
        self
    }

    /// Fetches and applies the initial style, camera, controls, and
    /// requested layers, then starts the temporal filter updater.
    pub async fn init(&mut self) -> Result<(), MapError> {
        self.renderer()?;
        self.style_generation += 1;
        let style = self.tiles.fetch_style(self.active_theme).await?;

        let renderer = Arc::clone(self.renderer()?);
        renderer.set_style(style);
        renderer.jump_to(CameraOptions {
            center: LngLat::new(self.options.center[1], self.options.center[0]),
            zoom: clamp_zoom(self.options.zoom),
            pitch: self.options.pitch,
            bearing: self.options.bearing,
        });

        if self.options.show_controls {
            renderer.add_control(ControlKind::Navigation, ControlPosition::TopRight);
            renderer.add_control(ControlKind::Geolocate, ControlPosition::TopRight);
        }
        if self.options.show_search {
            renderer.add_control(ControlKind::Search, ControlPosition::TopLeft);
        }

        let requested = self.options.layers.clone();
        self.set_layers(&requested)?;
        if !self.markers.is_empty() {
            self.render_markers()?;
        }
        self.restart_filter_updater()?;

        info!(theme = %self.active_theme, layers = requested.len(), "airspace map initialized");
        Ok(())
    }

    fn renderer(&self) -> Result<&Arc<dyn MapRenderer>, MapError> {
        self.renderer.as_ref().ok_or(MapError::TornDown)
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    /// The map-provider access token, for hosts constructing their renderer
    /// adapter.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    // ────────────────────────────────────────────────────────────────────
    // Layer visibility reconciliation
    // ────────────────────────────────────────────────────────────────────

    /// Makes exactly the given layers (plus their implied companions)
    /// visible, hiding every other known layer.
    pub fn set_layers<S: AsRef<str>>(&mut self, target: &[S]) -> Result<(), MapError> {
        self.renderer()?;
        // Companions are derived, never specified by the caller (though
        // harmless if they are). Removal is judged against the expanded
        // target so a just-derived companion is never hidden again.
        let expanded = layers::with_marker_companions(target);
        for id in &expanded {
            if !self.layers.iter().any(|l| l == id) {
                self.add_layer(id)?;
            }
        }
        // Every universe id absent from the target is hidden, whether or not
        // the bookkeeping says it was ever shown; a style swap resets
        // visibility behind the facade's back.
        for id in layers::STATIC_LAYERS.iter().copied() {
            if !expanded.iter().any(|e| e.as_str() == id) {
                self.remove_layer(id)?;
            }
        }
        Ok(())
    }

    /// Shows an airspace layer and its companions.
    ///
    /// Returns `Ok(false)` without mutating state when the id is not in the
    /// known universe. Re-adding an active layer re-issues the same
    /// visibility commands and is not an error.
    pub fn add_layer(&mut self, id: &str) -> Result<bool, MapError> {
        let renderer = Arc::clone(self.renderer()?);
        if !layers::is_known(id) {
            return Ok(false);
        }

        if id == TFRS {
            renderer.set_layer_visibility(ACTIVE_TFRS, true);
            renderer.set_layer_visibility(FUTURE_TFRS, true);
        } else {
            renderer.set_layer_visibility(id, true);
        }
        if let Some(dnas) = layers::dnas_companion(id) {
            renderer.set_layer_visibility(&dnas, true);
        }
        if let Some(marker) = layers::marker_companion(id) {
            renderer.set_layer_visibility(&marker, true);
            self.layers.push(marker);
        }
        self.layers.push(id.to_string());
        Ok(true)
    }

    /// Hides an airspace layer and its companions; the symmetric inverse of
    /// [`add_layer`](Self::add_layer).
    pub fn remove_layer(&mut self, id: &str) -> Result<bool, MapError> {
        let renderer = Arc::clone(self.renderer()?);
        if !layers::is_known(id) {
            return Ok(false);
        }

        if id == TFRS {
            renderer.set_layer_visibility(ACTIVE_TFRS, false);
            renderer.set_layer_visibility(FUTURE_TFRS, false);
        } else {
            renderer.set_layer_visibility(id, false);
        }
        if let Some(dnas) = layers::dnas_companion(id) {
            renderer.set_layer_visibility(&dnas, false);
        }
        let marker = layers::marker_companion(id);
        if let Some(m) = &marker {
            renderer.set_layer_visibility(m, false);
        }
        // Duplicates are tolerated on add, so removal strips every matching
        // entry to keep membership and visibility consistent.
        self.layers
            .retain(|l| l != id && Some(l) != marker.as_ref());
        Ok(true)
    }

    /// Whether the given layer is currently active.
    pub fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l == id)
    }

    /// Currently active layers, marker companions excluded.
    pub fn get_layers(&self) -> Vec<String> {
        layers::without_marker_companions(&self.layers)
    }

    // ────────────────────────────────────────────────────────────────────
    // Theme
    // ────────────────────────────────────────────────────────────────────

    pub fn theme(&self) -> Theme {
        self.active_theme
    }

    /// Switches the theme by fetching and applying new style data.
    ///
    /// On fetch failure the theme rolls back to its previous value and the
    /// map keeps showing the prior style; the facade stays usable. A stale
    /// response (superseded by a newer call) is discarded.
    pub async fn set_theme(&mut self, theme: Theme) -> Result<(), MapError> {
        self.renderer()?;
        if self.active_theme == theme {
            return Ok(());
        }

        let previous = self.active_theme;
        self.active_theme = theme;
        self.style_generation += 1;
        let generation = self.style_generation;

        let result = self.tiles.fetch_style(theme).await;
        self.finish_style_fetch(generation, previous, result)
    }

    /// Completes a style fetch begun at `generation`.
    fn finish_style_fetch(
        &mut self,
        generation: u64,
        previous: Theme,
        result: Result<Value, TileError>,
    ) -> Result<(), MapError> {
        if generation != self.style_generation {
            debug!(generation, current = self.style_generation, "stale style response discarded");
            return Ok(());
        }

        match result {
            Ok(style) => {
                self.apply_style(style)?;
                info!(theme = %self.active_theme, "map theme applied");
                Ok(())
            }
            Err(e) => {
                self.active_theme = previous;
                error!(error = %e, theme = %previous, "tile style fetch failed; theme rolled back");
                Err(MapError::Network(e))
            }
        }
    }

    /// Applies a fetched style and re-derives everything the swap reset:
    /// layer visibility and the marker source/layer.
    fn apply_style(&mut self, style: Value) -> Result<(), MapError> {
        let renderer = Arc::clone(self.renderer()?);
        renderer.set_style(style);

        // The new style starts at its own default visibility, so the
        // bookkeeping is stale; forget it and re-issue every visibility
        // command from scratch.
        let active = self.get_layers();
        self.layers.clear();
        self.set_layers(&active)?;

        self.marker_layer_added = false;
        if !self.markers.is_empty() {
            self.render_markers()?;
        }
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────
    // Temporal filters
    // ────────────────────────────────────────────────────────────────────

    /// Starts (or restarts) the periodic temporal filter task. At most one
    /// task is active per facade.
    fn restart_filter_updater(&mut self) -> Result<(), MapError> {
        let renderer = Arc::clone(self.renderer()?);
        if let Some(previous) = self.filter_updater.take() {
            previous.cancel();
        }
        self.filter_updater = Some(FilterUpdater::spawn(renderer, self.filter_interval));
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────
    // Markers
    // ────────────────────────────────────────────────────────────────────

    /// Drops a marker, returning its generated id.
    pub fn add_marker(
        &mut self,
        latitude: f64,
        longitude: f64,
        properties: Map<String, Value>,
    ) -> Result<String, MapError> {
        self.renderer()?;
        let marker = Marker::new(latitude, longitude, properties);
        let id = marker.id().to_string();
        self.markers.push(marker);
        self.render_markers()?;
        Ok(id)
    }

    /// Removes a marker by id. Unknown ids are a no-op re-render.
    pub fn remove_marker(&mut self, id: &str) -> Result<(), MapError> {
        self.renderer()?;
        self.markers.retain(|m| m.id() != id);
        self.render_markers()
    }

    /// Drops a marker for a search result, replacing the previous one.
    pub fn place_search_marker(&mut self, latitude: f64, longitude: f64) -> Result<String, MapError> {
        if let Some(previous) = self.search_marker_id.take() {
            self.remove_marker(&previous)?;
        }
        let id = self.add_marker(latitude, longitude, Map::new())?;
        self.search_marker_id = Some(id.clone());
        Ok(id)
    }

    fn render_markers(&mut self) -> Result<(), MapError> {
        let renderer = Arc::clone(self.renderer()?);
        renderer.set_geojson_source(MARKER_SOURCE, feature_collection(&self.markers));
        if !self.marker_layer_added {
            renderer.add_symbol_layer(MARKER_LAYER, MARKER_SOURCE, MARKER_ICON);
            self.marker_layer_added = true;
        }
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────
    // Camera and controls (pass-throughs)
    // ────────────────────────────────────────────────────────────────────

    /// Moves the map to a new location, keeping the current zoom unless one
    /// is given.
    pub fn move_to(
        &self,
        latitude: f64,
        longitude: f64,
        zoom: Option<f64>,
    ) -> Result<(), MapError> {
        let renderer = self.renderer()?;
        let zoom = zoom.map_or_else(|| renderer.zoom(), clamp_zoom);
        renderer.fly_to(LngLat::new(longitude, latitude), Some(zoom));
        Ok(())
    }

    pub fn fly_to(&self, center: LngLat, zoom: Option<f64>) -> Result<(), MapError> {
        self.renderer()?.fly_to(center, zoom.map(clamp_zoom));
        Ok(())
    }

    pub fn zoom_to(&self, zoom: f64) -> Result<(), MapError> {
        self.renderer()?.zoom_to(clamp_zoom(zoom));
        Ok(())
    }

    pub fn zoom_in(&self, delta: f64) -> Result<(), MapError> {
        let renderer = self.renderer()?;
        renderer.zoom_to(clamp_zoom(renderer.zoom() + delta));
        Ok(())
    }

    pub fn zoom_out(&self, delta: f64) -> Result<(), MapError> {
        let renderer = self.renderer()?;
        renderer.zoom_to(clamp_zoom(renderer.zoom() - delta));
        Ok(())
    }

    pub fn fit_bounds(&self, bounds: LngLatBounds) -> Result<(), MapError> {
        self.renderer()?.fit_bounds(bounds);
        Ok(())
    }

    pub fn get_center(&self) -> Result<LngLat, MapError> {
        Ok(self.renderer()?.center())
    }

    pub fn get_zoom(&self) -> Result<f64, MapError> {
        Ok(self.renderer()?.zoom())
    }

    pub fn resize(&self) -> Result<(), MapError> {
        self.renderer()?.resize();
        Ok(())
    }

    pub fn add_control(
        &self,
        control: ControlKind,
        position: ControlPosition,
    ) -> Result<(), MapError> {
        self.renderer()?.add_control(control, position);
        Ok(())
    }

    pub fn remove_control(&self, control: ControlKind) -> Result<(), MapError> {
        self.renderer()?.remove_control(control);
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────
    // Events and clicks
    // ────────────────────────────────────────────────────────────────────

    /// Subscribes to the domain `airspace.click` event.
    pub fn on_airspace_click(&mut self, listener: AirspaceClickListener) -> ListenerId {
        self.click_listeners.subscribe(listener)
    }

    pub fn off_airspace_click(&mut self, id: ListenerId) {
        self.click_listeners.unsubscribe(id);
    }

    /// Subscribes to a renderer-native event (passthrough).
    pub fn on(&self, event: &str, listener: EventListener) -> Result<ListenerId, MapError> {
        Ok(self.renderer()?.subscribe(event, listener))
    }

    /// Removes a renderer-native listener (passthrough).
    pub fn off(&self, event: &str, id: ListenerId) -> Result<(), MapError> {
        self.renderer()?.unsubscribe(event, id);
        Ok(())
    }

    /// Handles a click: fires `airspace.click` when airspace features were
    /// hit and returns popup content when popups are enabled.
    pub fn handle_click(
        &self,
        point: ScreenPoint,
        lng_lat: LngLat,
    ) -> Result<Option<PopupContent>, MapError> {
        let renderer = self.renderer()?;
        let airspace: Vec<_> = renderer
            .query_rendered_features(point)
            .into_iter()
            .filter(is_airspace_feature)
            .collect();

        if !airspace.is_empty() {
            self.click_listeners.fire(&AirspaceClickEvent {
                point,
                lng_lat,
                airspace: airspace.clone(),
            });
        }

        if self.options.show_popups && (!airspace.is_empty() || self.options.create_flights) {
            let create_flight_url = self.options.create_flights.then(|| {
                popup::basic_integration_url(&self.options.web_app_url, lng_lat, &self.api_key, None)
            });
            Ok(Some(PopupContent {
                groups: popup::format_features(&airspace),
                create_flight_url: create_flight_url.flatten(),
            }))
        } else {
            Ok(None)
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // Raw renderer access and teardown
    // ────────────────────────────────────────────────────────────────────

    /// Direct access to the underlying renderer for operations this facade
    /// does not wrap.
    pub fn renderer_handle(&mut self) -> Result<Arc<dyn MapRenderer>, MapError> {
        if !self.options.suppress_warnings && !self.raw_access_warned {
            warn!(
                "methods called on the raw renderer are subject to change across renderer \
                 versions; lock your renderer dependency if you rely on this"
            );
            self.raw_access_warned = true;
        }
        Ok(Arc::clone(self.renderer()?))
    }

    /// Destroys the map: cancels the temporal filter task, tears down the
    /// renderer, and releases marker and layer state. Every subsequent
    /// mutating call fails with [`MapError::TornDown`].
    pub fn remove(&mut self) -> Result<(), MapError> {
        let renderer = self.renderer.take().ok_or(MapError::TornDown)?;
        if let Some(updater) = self.filter_updater.take() {
            updater.cancel();
        }
        renderer.remove();

        self.layers.clear();
        self.markers.clear();
        self.search_marker_id = None;
        self.marker_layer_added = false;
        info!("airspace map removed");
        Ok(())
    }
}
