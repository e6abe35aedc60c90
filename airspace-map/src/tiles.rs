//! Themed tile-style fetching.
//!
//! The tile service returns a complete style document for a theme, scoped to
//! the full layer universe. The response is consumed opaquely and handed to
//! the renderer. [`TileClient`] abstracts the transport so tests inject a
//! stub; [`HttpTileClient`] is the reqwest implementation.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{MapError, TileError};
use crate::layers::STATIC_LAYERS;

/// Default timeout for style requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Visual style variants the tile service can render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Standard,
    Dark,
    Light,
    Satellite,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Standard => "standard",
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Satellite => "satellite",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Theme::Standard),
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            "satellite" => Ok(Theme::Satellite),
            other => Err(MapError::UnsupportedTheme(other.to_string())),
        }
    }
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Transport abstraction for themed style fetches.
pub trait TileClient: Send + Sync {
    /// Fetches the style document for a theme.
    fn fetch_style(&self, theme: Theme) -> BoxFuture<'_, Result<Value, TileError>>;
}

/// Tile client backed by reqwest.
///
/// Issues `GET <base>/<comma-joined layer universe>` with the API key in the
/// `X-API-Key` header and as the `token` query parameter, plus the requested
/// `theme`.
pub struct HttpTileClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTileClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, TileError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TileError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn style_url(&self, theme: Theme) -> Result<Url, TileError> {
        let joined = STATIC_LAYERS.join(",");
        let mut url = Url::parse(&format!("{}/{joined}", self.base_url))
            .map_err(|e| TileError::Request(format!("invalid tile service URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("token", &self.api_key)
            .append_pair("theme", theme.as_str());
        Ok(url)
    }
}

impl TileClient for HttpTileClient {
    fn fetch_style(&self, theme: Theme) -> BoxFuture<'_, Result<Value, TileError>> {
        Box::pin(async move {
            let url = self.style_url(theme)?;
            let response = self
                .client
                .get(url.clone())
                .header("X-API-Key", &self.api_key)
                .send()
                .await
                .map_err(|e| TileError::Request(e.to_string()))?;

            if !response.status().is_success() {
                return Err(TileError::Status {
                    status: response.status().as_u16(),
                    url: url.to_string(),
                });
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| TileError::InvalidBody(e.to_string()))
        })
    }
}
