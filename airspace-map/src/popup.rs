//! Display formatting for clicked airspace features.
//!
//! Produces structured popup content from rendered-feature properties; the
//! host owns any actual markup. Sizes are rounded to a tenth of an acre,
//! timestamps are rendered human-readably, and an expiry in year 9999 stands
//! for a permanent restriction.

use chrono::{Datelike, TimeZone, Timelike, Utc};
use serde_json::{Map, Value};
use tracing::warn;
use url::Url;

use crate::renderer::LngLat;

/// Feature categories whose events are transient: they show no name and
/// never a "Permanent" expiry.
const TRANSIENT_CATEGORIES: &[&str] = &["wildfires", "fires", "emergencies"];

/// Expiry year used by the data to mean "no real expiry".
const PERMANENT_YEAR: i32 = 9999;

/// Human-readable titles for displayable feature categories.
///
/// Categories missing from this table are dropped from popup content.
pub fn display_name(category: &str) -> Option<&'static str> {
    match category {
        "aerial_recreational_areas" => Some("Aerial Recreational Areas"),
        "airports_recreational" => Some("Airports (Recreational Rules)"),
        "airports_recreational_private" => Some("Private Airports (Recreational Rules)"),
        "airports_commercial" => Some("Airports (Commercial Rules)"),
        "airports_commercial_private" => Some("Private Airports (Commercial Rules)"),
        "cities" => Some("Cities"),
        "class_b" => Some("Controlled Airspace (Class B)"),
        "class_c" => Some("Controlled Airspace (Class C)"),
        "class_d" => Some("Controlled Airspace (Class D)"),
        "class_e0" => Some("Controlled Airspace (Class E to Ground)"),
        "custom" => Some("Custom"),
        "emergencies" => Some("Emergencies"),
        "fires" => Some("Fires"),
        "hazard_areas" => Some("Hazard Areas"),
        "heliports" => Some("Heliports"),
        "hospitals" => Some("Hospitals"),
        "national_parks" => Some("National Parks"),
        "noaa" => Some("NOAA Marine Protection Areas"),
        "power_plants" => Some("Power Plants"),
        "prisons" => Some("Prisons"),
        "sua_prohibited" => Some("Prohibited Special Use Airspace"),
        "sua_restricted" => Some("Restricted Special Use Airspace"),
        "schools" => Some("Schools"),
        "stadiums" => Some("Stadiums"),
        "tfrs" => Some("Temporary Flight Restrictions"),
        "universities" => Some("Universities & Colleges"),
        "wildfires" => Some("Wildfires"),
        _ => None,
    }
}

/// One formatted feature within a popup group.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PopupItem {
    pub name: Option<String>,
    pub url: Option<String>,
    pub icao: Option<String>,
    pub phone: Option<String>,
    pub size: Option<String>,
    pub date_effective: Option<String>,
    pub date_expire: Option<String>,
}

/// Formatted features sharing a category, in first-seen order.
#[derive(Clone, Debug, PartialEq)]
pub struct PopupGroup {
    /// Raw category id (the feature `type` property).
    pub category: String,
    /// Display title from [`display_name`].
    pub title: String,
    pub items: Vec<PopupItem>,
}

/// Content the facade hands back for a click when popups are enabled.
#[derive(Clone, Debug, Default)]
pub struct PopupContent {
    pub groups: Vec<PopupGroup>,
    /// Create-flight link, present when the facade was built with
    /// `create_flights`.
    pub create_flight_url: Option<String>,
}

/// Groups and formats feature properties for popup display.
///
/// Categories without a display title are dropped; group order follows the
/// first feature seen per category.
pub fn format_features(features: &[Map<String, Value>]) -> Vec<PopupGroup> {
    let mut groups: Vec<PopupGroup> = Vec::new();

    for properties in features {
        let Some(category) = properties.get("type").and_then(Value::as_str) else {
            continue;
        };
        let Some(title) = display_name(category) else {
            continue;
        };

        let item = format_item(properties, category);
        match groups.iter_mut().find(|g| g.category == category) {
            Some(group) => group.items.push(item),
            None => groups.push(PopupGroup {
                category: category.to_string(),
                title: title.to_string(),
                items: vec![item],
            }),
        }
    }

    groups
}

fn format_item(properties: &Map<String, Value>, category: &str) -> PopupItem {
    let transient = TRANSIENT_CATEGORIES.contains(&category);
    let string_of = |key: &str| {
        properties
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let mut item = PopupItem {
        name: if transient { None } else { string_of("name") },
        url: string_of("url"),
        icao: string_of("icao"),
        phone: string_of("phone"),
        ..PopupItem::default()
    };

    if properties.contains_key("size") {
        item.size = Some(format_size(&properties["size"]));
    }

    if let Some(effective) = properties.get("date_effective").and_then(Value::as_i64) {
        item.date_effective = format_timestamp(effective);
        item.date_expire = match properties.get("date_expire").and_then(Value::as_i64) {
            Some(expire) if expiry_year(expire) != Some(PERMANENT_YEAR) => {
                format_timestamp(expire)
            }
            _ if !transient => Some("Permanent".to_string()),
            _ => None,
        };
    }

    item
}

/// Size in acres rounded to a tenth, or "Unavailable" when absent.
fn format_size(value: &Value) -> String {
    match value.as_f64() {
        Some(acres) => {
            let rounded = (acres * 10.0).round() / 10.0;
            if rounded.fract() == 0.0 {
                format!("{} Acres", rounded as i64)
            } else {
                format!("{rounded:.1} Acres")
            }
        }
        None => "Unavailable".to_string(),
    }
}

fn expiry_year(ms: i64) -> Option<i32> {
    Utc.timestamp_millis_opt(ms).single().map(|dt| dt.year())
}

/// Renders an epoch-millisecond timestamp as e.g. "September 3rd 2026, 4:05 pm".
pub fn format_timestamp(ms: i64) -> Option<String> {
    let dt = Utc.timestamp_millis_opt(ms).single()?;
    let day = dt.day();
    let (is_pm, hour) = dt.hour12();
    Some(format!(
        "{} {}{} {}, {}:{:02} {}",
        dt.format("%B"),
        day,
        ordinal_suffix(day),
        dt.year(),
        hour,
        dt.minute(),
        if is_pm { "pm" } else { "am" }
    ))
}

fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

/// Link for creating a flight at the clicked location via the web app.
///
/// `callback` is the URL the web app returns to afterwards, already owned by
/// the host. Returns `None` (logged) when the configured web app URL does not
/// parse.
pub fn basic_integration_url(
    web_app_url: &str,
    lng_lat: LngLat,
    api_key: &str,
    callback: Option<&str>,
) -> Option<String> {
    let mut url = match Url::parse(&format!("{web_app_url}/create-flight/index.html")) {
        Ok(url) => url,
        Err(e) => {
            warn!(web_app_url, error = %e, "invalid web app URL; create-flight link skipped");
            return None;
        }
    };
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("key", api_key)
            .append_pair("lat", &lng_lat.lat.to_string())
            .append_pair("lng", &lng_lat.lng.to_string());
        if let Some(cb) = callback {
            query.append_pair("cb", cb);
        }
    }
    Some(url.to_string())
}
