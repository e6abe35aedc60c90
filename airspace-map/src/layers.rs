//! The airspace layer universe and companion-layer derivation.
//!
//! Layer ids form a fixed, closed set loaded once at process start. Some
//! layers carry companions that must be shown and hidden in lockstep:
//!
//! - a marker companion (`<id>-marker`) when that id is itself part of the
//!   universe;
//! - a DNAS sublayer (`<id>_dnas`) for the airports family;
//! - the composite `tfrs` id, which stands for the temporal pair
//!   `active-tfrs` / `future-tfrs`.
//!
//! The facade owns the active layer sequence; the helpers here are pure.

use tracing::warn;

/// The fixed universe of known airspace layer ids, in tile-request order.
pub const STATIC_LAYERS: &[&str] = &[
    "aerial_recreational_areas",
    "airports_recreational",
    "airports_commercial",
    "airports_recreational_private",
    "airports_commercial_private",
    "cities",
    "class_b",
    "class_c",
    "class_d",
    "class_e0",
    "custom",
    "emergencies",
    "fires",
    "hazard_areas",
    "heliports",
    "heliports-marker",
    "hospitals",
    "national_parks",
    "noaa",
    "power_plants",
    "prisons",
    "schools",
    "sua_prohibited",
    "sua_restricted",
    "tfrs",
    "universities",
    "wildfires",
];

/// The composite id that expands to the two temporal sublayers.
pub const TFRS: &str = "tfrs";

/// Temporal sublayer holding currently effective flight restrictions.
pub const ACTIVE_TFRS: &str = "active-tfrs";

/// Temporal sublayer holding upcoming flight restrictions.
pub const FUTURE_TFRS: &str = "future-tfrs";

const MARKER_SUFFIX: &str = "-marker";
const DNAS_SUFFIX: &str = "_dnas";

/// Whether `id` belongs to the known layer universe.
///
/// Unknown ids are logged, mirroring the falsy no-op contract of the layer
/// operations.
pub fn is_known(id: &str) -> bool {
    let known = STATIC_LAYERS.contains(&id);
    if !known {
        warn!(layer = id, "airspace layer does not exist");
    }
    known
}

/// The marker companion of `id`, if the universe declares one.
pub fn marker_companion(id: &str) -> Option<String> {
    let marker = format!("{id}{MARKER_SUFFIX}");
    STATIC_LAYERS.contains(&marker.as_str()).then_some(marker)
}

/// The DNAS sublayer of `id`, present for the airports family.
pub fn dnas_companion(id: &str) -> Option<String> {
    id.contains("airports")
        .then(|| format!("{id}{DNAS_SUFFIX}"))
}

/// Expands a target layer list with the marker companions it implies.
///
/// Order is preserved: each companion is appended after the whole original
/// sequence, matching the order the reconciler would add them in.
pub fn with_marker_companions<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    let mut expanded: Vec<String> = ids.iter().map(|s| s.as_ref().to_string()).collect();
    for id in ids {
        if let Some(marker) = marker_companion(id.as_ref()) {
            expanded.push(marker);
        }
    }
    expanded
}

/// Filters marker companions out of an active layer sequence.
///
/// Callers only ever see layers they could have requested themselves.
pub fn without_marker_companions(ids: &[String]) -> Vec<String> {
    ids.iter()
        .filter(|id| !id.contains(MARKER_SUFFIX))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_contains_expected_layers() {
        assert!(STATIC_LAYERS.contains(&"schools"));
        assert!(STATIC_LAYERS.contains(&"class_b"));
        assert!(STATIC_LAYERS.contains(&"tfrs"));
        assert!(STATIC_LAYERS.contains(&"heliports-marker"));
    }

    #[test]
    fn test_is_known_rejects_unknown_ids() {
        assert!(is_known("heliports"));
        assert!(!is_known("volcanoes"));
        assert!(!is_known(""));
        // The temporal sublayers are internal, not part of the universe.
        assert!(!is_known(ACTIVE_TFRS));
    }

    #[test]
    fn test_marker_companion_only_for_declared_markers() {
        assert_eq!(
            marker_companion("heliports"),
            Some("heliports-marker".to_string())
        );
        assert_eq!(marker_companion("schools"), None);
        assert_eq!(marker_companion("heliports-marker"), None);
    }

    #[test]
    fn test_dnas_companion_for_airports_family() {
        assert_eq!(
            dnas_companion("airports_recreational"),
            Some("airports_recreational_dnas".to_string())
        );
        assert_eq!(
            dnas_companion("airports_commercial_private"),
            Some("airports_commercial_private_dnas".to_string())
        );
        assert_eq!(dnas_companion("heliports"), None);
    }

    #[test]
    fn test_with_marker_companions_appends_markers() {
        let expanded = with_marker_companions(&["heliports", "schools"]);
        assert_eq!(expanded, vec!["heliports", "schools", "heliports-marker"]);
    }

    #[test]
    fn test_without_marker_companions_hides_markers() {
        let active = vec![
            "heliports-marker".to_string(),
            "heliports".to_string(),
            "schools".to_string(),
        ];
        assert_eq!(without_marker_companions(&active), vec!["heliports", "schools"]);
    }
}
