//! Construction configuration for the facade.

use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::tiles::Theme;

/// Default tile service endpoint.
pub const DEFAULT_TILE_SERVICE_URL: &str = "https://api.airmap.com/maps/v4/tilejson";

/// Default web application endpoint for create-flight links.
pub const DEFAULT_WEB_APP_URL: &str = "https://app.airmap.io";

/// Lowest zoom level the map may reach.
pub const MIN_ZOOM: f64 = 0.0;

/// Highest zoom level the map may reach.
pub const MAX_ZOOM: f64 = 18.0;

/// Required credentials: an API key for the tile service and an access token
/// for the map provider. Both must be present before any rendering occurs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl MapConfig {
    pub fn new(api_key: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            access_token: Some(access_token.into()),
        }
    }

    /// Checks both credentials are present.
    pub(crate) fn validate(&self) -> Result<(String, String), MapError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or(MapError::MissingConfig("api_key"))?;
        let access_token = self
            .access_token
            .clone()
            .ok_or(MapError::MissingConfig("access_token"))?;
        Ok((api_key, access_token))
    }
}

/// Map options with their documented defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Id of the host element the renderer was mounted in.
    pub container: Option<String>,
    /// Initial center as `[latitude, longitude]`.
    pub center: [f64; 2],
    /// Airspace layers visible on load.
    pub layers: Vec<String>,
    pub theme: Theme,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    /// Whether users can manipulate the map.
    pub interactive: bool,
    /// Mount zoom/bearing and geolocate controls.
    pub show_controls: bool,
    /// Produce popup content on airspace clicks.
    pub show_popups: bool,
    /// Mount a location search control.
    pub show_search: bool,
    /// Center on the user's location once known.
    pub use_location: bool,
    /// Attach a create-flight link to popup content.
    pub create_flights: bool,
    pub tile_service_url: String,
    pub web_app_url: String,
    /// Silence the raw-renderer compatibility warning.
    pub suppress_warnings: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            container: None,
            center: [0.0, 0.0],
            layers: Vec::new(),
            theme: Theme::Standard,
            zoom: 7.0,
            pitch: 0.0,
            bearing: 0.0,
            interactive: true,
            show_controls: true,
            show_popups: true,
            show_search: false,
            use_location: false,
            create_flights: false,
            tile_service_url: DEFAULT_TILE_SERVICE_URL.to_string(),
            web_app_url: DEFAULT_WEB_APP_URL.to_string(),
            suppress_warnings: false,
        }
    }
}

impl MapOptions {
    /// Set the initial center (`[latitude, longitude]`).
    pub fn with_center(mut self, latitude: f64, longitude: f64) -> Self {
        self.center = [latitude, longitude];
        self
    }

    /// Set the layers visible on load.
    pub fn with_layers<S: Into<String>>(mut self, layers: impl IntoIterator<Item = S>) -> Self {
        self.layers = layers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_tile_service_url(mut self, url: impl Into<String>) -> Self {
        self.tile_service_url = url.into();
        self
    }

    pub fn with_web_app_url(mut self, url: impl Into<String>) -> Self {
        self.web_app_url = url.into();
        self
    }

    pub fn with_show_popups(mut self, show: bool) -> Self {
        self.show_popups = show;
        self
    }

    pub fn with_create_flights(mut self, create: bool) -> Self {
        self.create_flights = create;
        self
    }

    pub fn with_suppress_warnings(mut self, suppress: bool) -> Self {
        self.suppress_warnings = suppress;
        self
    }
}
