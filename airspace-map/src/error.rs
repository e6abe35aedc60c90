//! Error types for the airspace map facade.

use thiserror::Error;

/// Errors surfaced by [`AirspaceMap`](crate::AirspaceMap) operations.
///
/// Construction errors (`MissingConfig`, `UnsupportedTheme`,
/// `UnsupportedEnvironment`) are fatal: the facade is never created. The
/// remaining variants are recoverable; the facade stays usable after a failed
/// tile fetch. Unknown layer ids are deliberately *not* an error — the layer
/// operations log and return `Ok(false)` instead.
#[derive(Debug, Error)]
pub enum MapError {
    /// A required credential was absent at construction.
    #[error("missing required config value: {0}")]
    MissingConfig(&'static str),

    /// A theme name outside the supported set was provided.
    #[error("unsupported theme: {0}")]
    UnsupportedTheme(String),

    /// The host renderer reported that it cannot display a map.
    #[error("map rendering is not supported in this environment")]
    UnsupportedEnvironment,

    /// The tile/style fetch failed. The previous theme remains applied.
    #[error("tile service request failed: {0}")]
    Network(#[from] TileError),

    /// The facade was torn down; no further mutation is possible.
    #[error("map has been torn down")]
    TornDown,
}

/// Errors produced by the tile/style fetch.
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// The request could not be built or sent.
    #[error("request failed: {0}")]
    Request(String),

    /// The tile service answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body was not a valid style document.
    #[error("invalid style document: {0}")]
    InvalidBody(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_error_display() {
        let err = MapError::MissingConfig("api_key");
        assert!(err.to_string().contains("api_key"));

        let err = MapError::UnsupportedTheme("sepia".to_string());
        assert!(err.to_string().contains("sepia"));
    }

    #[test]
    fn test_map_error_from_tile_error() {
        let tile_err = TileError::Status {
            status: 503,
            url: "https://tiles.example.com".to_string(),
        };
        let map_err: MapError = tile_err.into();
        assert!(matches!(map_err, MapError::Network(_)));
        assert!(map_err.to_string().contains("503"));
    }
}
