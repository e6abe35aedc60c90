//! Domain events.
//!
//! The facade raises exactly one event of its own, `airspace.click`, carrying
//! the clicked point and the airspace feature properties found under it.
//! Everything else passes through to the renderer's native event system via
//! two distinct subscription surfaces on the facade, so domain and passthrough
//! events never share a duck-typed dispatch path.

use serde_json::{Map, Value};

use crate::layers::{STATIC_LAYERS, TFRS};
use crate::renderer::{LngLat, ListenerId, ScreenPoint};

/// Name of the domain click event.
pub const AIRSPACE_CLICK: &str = "airspace.click";

/// Payload of an `airspace.click` event.
#[derive(Clone, Debug)]
pub struct AirspaceClickEvent {
    /// Clicked point in container pixel space.
    pub point: ScreenPoint,
    /// Clicked geographic coordinate.
    pub lng_lat: LngLat,
    /// Properties of the matched airspace features, topmost first.
    pub airspace: Vec<Map<String, Value>>,
}

/// Callback invoked with an airspace click.
pub type AirspaceClickListener = Box<dyn Fn(&AirspaceClickEvent) + Send + Sync>;

/// Whether rendered-feature properties describe an airspace feature.
///
/// Features advertise their category in the `type` property, sometimes
/// prefixed with `layer_`. A feature participates when the stripped category
/// is in the known universe, or is the composite `tfrs`.
pub fn is_airspace_feature(properties: &Map<String, Value>) -> bool {
    let Some(kind) = properties.get("type").and_then(Value::as_str) else {
        return false;
    };
    let stripped = kind.strip_prefix("layer_").unwrap_or(kind);
    STATIC_LAYERS.contains(&stripped) || kind == TFRS
}

/// Registry of `airspace.click` listeners, owned by the facade.
#[derive(Default)]
pub struct ClickListeners {
    listeners: Vec<(ListenerId, AirspaceClickListener)>,
    next_id: u64,
}

impl ClickListeners {
    pub fn subscribe(&mut self, listener: AirspaceClickListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|(l, _)| *l != id);
    }

    pub fn fire(&self, event: &AirspaceClickEvent) {
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn props(kind: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("type".to_string(), json!(kind));
        map
    }

    #[test]
    fn test_airspace_feature_classification() {
        assert!(is_airspace_feature(&props("schools")));
        assert!(is_airspace_feature(&props("layer_class_b")));
        assert!(is_airspace_feature(&props("tfrs")));
        assert!(!is_airspace_feature(&props("water")));
        assert!(!is_airspace_feature(&Map::new()));
    }

    #[test]
    fn test_non_string_type_is_not_airspace() {
        let mut map = Map::new();
        map.insert("type".to_string(), json!(42));
        assert!(!is_airspace_feature(&map));
    }

    #[test]
    fn test_listeners_fire_and_unsubscribe() {
        let mut registry = ClickListeners::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let id = registry.subscribe(Box::new(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));

        let event = AirspaceClickEvent {
            point: ScreenPoint::new(10.0, 20.0),
            lng_lat: LngLat::new(-118.0, 34.0),
            airspace: vec![props("schools")],
        };

        registry.fire(&event);
        assert_eq!(calls.load(Ordering::Relaxed), 1);

        registry.unsubscribe(id);
        registry.fire(&event);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert!(registry.is_empty());
    }
}
