//! AirspaceMap - airspace layer maps over a pluggable renderer
//!
//! This library wraps a host map renderer with airspace semantics: a fixed
//! universe of airspace tile layers with companion-layer derivation, themed
//! style loading from a tile service, periodic temporal filtering of flight
//! restrictions, point markers, and airspace click events with popup
//! content.
//!
//! The rendering engine itself is injected behind the [`MapRenderer`] trait;
//! the tile service behind [`TileClient`]. [`AirspaceMap`] ties them
//! together.

pub mod error;
pub mod events;
pub mod filters;
pub mod layers;
pub mod map;
pub mod markers;
pub mod options;
pub mod popup;
pub mod renderer;
pub mod tiles;

pub use error::{MapError, TileError};
pub use events::{AirspaceClickEvent, AirspaceClickListener, AIRSPACE_CLICK};
pub use map::AirspaceMap;
pub use markers::Marker;
pub use options::{MapConfig, MapOptions};
pub use popup::{PopupContent, PopupGroup, PopupItem};
pub use renderer::{
    CameraOptions, ControlKind, ControlPosition, EventListener, ListenerId, LngLat, LngLatBounds,
    MapRenderer, ScreenPoint,
};
pub use tiles::{HttpTileClient, Theme, TileClient};
