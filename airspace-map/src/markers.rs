//! Point markers rendered as a single GeoJSON feature collection.

use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Source id the marker collection is written to.
pub const MARKER_SOURCE: &str = "markers";

/// Symbol layer drawing the marker source.
pub const MARKER_LAYER: &str = "markers-symbols";

/// Icon image name used by the marker layer.
pub const MARKER_ICON: &str = "marker";

/// A point feature owned by the facade for its lifetime.
#[derive(Clone, Debug)]
pub struct Marker {
    id: String,
    latitude: f64,
    longitude: f64,
    properties: Map<String, Value>,
}

impl Marker {
    /// Creates a marker with a generated unique id.
    pub fn new(latitude: f64, longitude: f64, properties: Map<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            latitude,
            longitude,
            properties,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// GeoJSON feature representation; the generated id is merged into the
    /// property bag.
    pub fn to_feature(&self) -> Value {
        let mut properties = self.properties.clone();
        properties.insert("id".to_string(), Value::String(self.id.clone()));
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [self.longitude, self.latitude]
            },
            "properties": properties
        })
    }
}

/// Assembles the collective feature collection for all live markers.
pub fn feature_collection(markers: &[Marker]) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": markers.iter().map(Marker::to_feature).collect::<Vec<_>>()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_ids_are_unique() {
        let a = Marker::new(34.0, -118.0, Map::new());
        let b = Marker::new(34.0, -118.0, Map::new());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_feature_coordinates_are_lng_lat_ordered() {
        let marker = Marker::new(34.0, -118.0, Map::new());
        let feature = marker.to_feature();
        assert_eq!(feature["geometry"]["coordinates"], json!([-118.0, 34.0]));
    }

    #[test]
    fn test_feature_merges_id_into_properties() {
        let mut properties = Map::new();
        properties.insert("label".to_string(), json!("home"));
        let marker = Marker::new(1.0, 2.0, properties);

        let feature = marker.to_feature();
        assert_eq!(feature["properties"]["label"], json!("home"));
        assert_eq!(feature["properties"]["id"], json!(marker.id()));
    }

    #[test]
    fn test_feature_collection_holds_all_markers() {
        let markers = vec![
            Marker::new(1.0, 2.0, Map::new()),
            Marker::new(3.0, 4.0, Map::new()),
        ];
        let collection = feature_collection(&markers);
        assert_eq!(collection["type"], "FeatureCollection");
        assert_eq!(collection["features"].as_array().unwrap().len(), 2);
    }
}
