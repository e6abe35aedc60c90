//! Injected map renderer capability.
//!
//! The facade never talks to a concrete rendering engine. It is polymorphic
//! over [`MapRenderer`], a minimal capability set covering style replacement,
//! layer/source control, camera control, feature queries, and event
//! passthrough. Production hosts adapt their map library behind this trait;
//! tests inject a recording fake.

use serde_json::Value;

/// A geographic coordinate, longitude first (renderer convention).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// A point in container pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A geographic bounding box (south-west / north-east corners).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LngLatBounds {
    pub sw: LngLat,
    pub ne: LngLat,
}

/// Built-in controls the facade can ask the renderer to mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKind {
    /// Zoom and bearing buttons.
    Navigation,
    /// Center-on-user-location button.
    Geolocate,
    /// Location search box.
    Search,
}

/// Screen corner a control is anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Initial camera state applied once the first style loads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraOptions {
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

/// Handle to a registered event listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback invoked with the renderer's raw event payload.
pub type EventListener = Box<dyn Fn(&Value) + Send + Sync>;

/// Minimal rendering capability the facade depends on.
///
/// All methods take `&self`; implementations are expected to use interior
/// mutability, matching the single-execution-context model of the hosts this
/// wraps. Implementations must be `Send + Sync` so the periodic filter task
/// can share the renderer with the facade.
pub trait MapRenderer: Send + Sync {
    /// Whether this environment can display a map at all.
    ///
    /// Construction aborts with an unsupported-environment error when this
    /// returns `false`.
    fn supported(&self) -> bool;

    /// Replaces the entire style document.
    ///
    /// This resets layer visibility to the style's defaults; the facade
    /// re-applies its active layer set after every swap.
    fn set_style(&self, style: Value);

    /// Shows or hides a named layer.
    fn set_layer_visibility(&self, layer: &str, visible: bool);

    /// Replaces the feature filter of a named layer.
    fn set_filter(&self, layer: &str, filter: Value);

    /// Creates or updates a GeoJSON source with the given data.
    fn set_geojson_source(&self, source: &str, data: Value);

    /// Adds a symbol layer drawing the given source with an icon image.
    fn add_symbol_layer(&self, layer: &str, source: &str, icon: &str);

    /// Jumps the camera without animation.
    fn jump_to(&self, camera: CameraOptions);

    /// Animates the camera to a new center and optional zoom.
    fn fly_to(&self, center: LngLat, zoom: Option<f64>);

    /// Transitions to a new zoom level.
    fn zoom_to(&self, zoom: f64);

    /// Pans and zooms so the given bounds fill the visible area.
    fn fit_bounds(&self, bounds: LngLatBounds);

    /// Current geographic center.
    fn center(&self) -> LngLat;

    /// Current zoom level.
    fn zoom(&self) -> f64;

    /// Mounts a built-in control at the given position.
    fn add_control(&self, control: ControlKind, position: ControlPosition);

    /// Removes a previously mounted control.
    fn remove_control(&self, control: ControlKind);

    /// Resizes the map to its container dimensions.
    fn resize(&self);

    /// Properties of the rendered features under a screen point, topmost
    /// first.
    fn query_rendered_features(&self, point: ScreenPoint) -> Vec<serde_json::Map<String, Value>>;

    /// Registers a listener for a renderer-native event.
    fn subscribe(&self, event: &str, listener: EventListener) -> ListenerId;

    /// Removes a previously registered renderer-native listener.
    fn unsubscribe(&self, event: &str, listener: ListenerId);

    /// Destroys the map and releases its resources.
    fn remove(&self);
}
