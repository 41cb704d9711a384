//! Field alias tables for upstream payloads.
//!
//! The webhook has renamed and re-nested fields several times. Each canonical
//! field maps to an ordered list of candidate key paths; [`lookup`] returns
//! the first candidate that is present and coercible. Supporting a new
//! upstream spelling means adding a path here.

use serde_json::{Map, Value};

/// Path of object keys from a record to a value, e.g. `["location", "lat"]`.
pub type KeyPath = &'static [&'static str];

/// A latitude path paired with its longitude path.
pub type CoordinatePaths = (KeyPath, KeyPath);

// ========== STATION RECORDS ==========

pub const STATION_NAME: &[KeyPath] = &[&["station_name"], &["name"]];
pub const ADDRESS: &[KeyPath] = &[&["address"]];

/// Tried in order; both halves of a pair must resolve.
pub const COORDINATES: &[CoordinatePaths] = &[
    (&["latitude"], &["longitude"]),
    (&["location", "latitude"], &["location", "longitude"]),
    (&["location", "lat"], &["location", "lng"]),
    (&["lat"], &["lng"]),
];

pub const CHARGING_SPEED_KW: &[KeyPath] = &[&["charging_speed_kw"]];
pub const DETOUR_KM: &[KeyPath] = &[&["detour_km"]];
pub const ARRIVAL_SOC: &[KeyPath] = &[&["arrival_SOC"], &["arrival_soc"]];
pub const DEPARTURE_SOC: &[KeyPath] = &[&["departure_SOC"], &["departure_soc"]];
pub const CHARGING_TIME_MINUTES: &[KeyPath] =
    &[&["charging_time_minutes"], &["charging_duration_minutes"]];
pub const ENERGY_ADDED_KWH: &[KeyPath] = &[&["energy_added_kwh"]];
pub const DISTANCE_FROM_ORIGIN_KM: &[KeyPath] = &[&["distance_from_origin_km"]];
pub const IS_CRITICAL: &[KeyPath] = &[&["is_critical"]];
pub const REASON: &[KeyPath] = &[&["reason"]];

/// Explicit per-record selection flag of the route plan shapes.
pub const IS_SELECTED: &[KeyPath] = &[&["is_selected"]];
/// Nearby-stations selection flags; any truthy alias selects the station.
pub const SELECTION_FLAGS: &[KeyPath] = &[&["is_selected"], &["selected"], &["best"], &["is_best"]];

pub const RATING: &[KeyPath] = &[&["rating"]];
pub const REVIEW_COUNT: &[KeyPath] = &[&["user_rating_count"], &["review_count"]];
pub const CONNECTOR_TYPES: &[KeyPath] = &[&["connector_types"]];
pub const WEBSITE: &[KeyPath] = &[&["website_uri"], &["website"]];
pub const PHONE: &[KeyPath] = &[&["phone_number"], &["phone"]];
pub const BUSINESS_STATUS: &[KeyPath] = &[&["business_status"]];
pub const ON_ROUTE: &[KeyPath] = &[&["on_route"]];
pub const TIME_IMPACT_MINUTES: &[KeyPath] = &[&["time_impact_minutes"]];

// ========== ROUTE CONTAINERS ==========

pub const ROUTE: &[KeyPath] = &[&["route"]];
pub const CHARGING_PLAN: &[KeyPath] = &[&["charging_plan"], &["chargingPlan"]];
pub const SUMMARY: &[KeyPath] = &[&["summary"]];
pub const STATISTICS: &[KeyPath] = &[&["statistics"]];
/// Wrappers that nest the whole response one level down.
pub const RESPONSE_WRAPPERS: &[KeyPath] = &[&["response"], &["json"]];

pub const SELECTED_STATIONS: &[KeyPath] = &[&["selected_stations"], &["selectedStations"]];
pub const ALL_STATIONS: &[KeyPath] = &[&["all_stations"], &["allStations"]];
pub const NEARBY_STATIONS: &[KeyPath] = &[&["stations"]];

// ========== ROUTE INFO ==========

pub const POLYLINE: &[KeyPath] = &[&["polyline"]];
pub const DISTANCE_KM: &[KeyPath] = &[&["distance_km"]];
pub const DURATION_MINUTES: &[KeyPath] = &[&["duration_minutes"]];
pub const ORIGIN: &[KeyPath] = &[&["origin"]];
pub const DESTINATION: &[KeyPath] = &[&["destination"]];

// ========== PLAN-LEVEL AGGREGATES ==========

pub const NEEDED: &[KeyPath] = &[&["needed"]];
pub const TOTAL_CHARGING_TIME: &[KeyPath] =
    &[&["total_charging_time"], &["total_charging_time_minutes"]];
pub const TOTAL_DETOUR_KM: &[KeyPath] = &[&["total_detour_km"]];
pub const TOTAL_ENERGY_ADDED_KWH: &[KeyPath] = &[&["total_energy_added_kwh"]];
pub const CAN_COMPLETE_WITHOUT_CHARGING: &[KeyPath] = &[&["can_complete_without_charging"]];

pub const BASE_DURATION_MINUTES: &[KeyPath] = &[&["base_duration_minutes"]];
pub const SUMMARY_CHARGING_TIME: &[KeyPath] = &[&["charging_time_minutes"]];
pub const DETOUR_TIME_MINUTES: &[KeyPath] = &[&["detour_time_minutes"]];
pub const ESTIMATED_TOTAL_DURATION: &[KeyPath] = &[&["estimated_total_duration"]];

pub const TOTAL_STATIONS_FOUND: &[KeyPath] = &[&["total_stations_found"]];
pub const ON_ROUTE_STATIONS: &[KeyPath] = &[&["on_route_stations"]];
pub const STATIONS_SELECTED: &[KeyPath] = &[&["stations_selected"]];
pub const AVG_CHARGING_SPEED: &[KeyPath] = &[&["avg_charging_speed_selected"]];
pub const TOTAL_ENERGY_REQUIRED: &[KeyPath] = &[&["total_energy_required"]];
pub const MIN_SOC_REACHED: &[KeyPath] = &[&["min_soc_reached"]];

/// Follow a key path through nested objects.
pub fn get_path<'a>(record: &'a Map<String, Value>, path: KeyPath) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = record.get(*first)?;
    for key in rest {
        current = current.as_object()?.get(*key)?;
    }
    Some(current)
}

/// First candidate path whose value is present and coercible wins.
pub fn lookup<'a, T>(
    record: &'a Map<String, Value>,
    paths: &[KeyPath],
    coerce: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    paths
        .iter()
        .filter_map(|path| get_path(record, *path))
        .find_map(coerce)
}

/// First candidate path holding a JSON object.
pub fn lookup_object<'a>(
    record: &'a Map<String, Value>,
    paths: &[KeyPath],
) -> Option<&'a Map<String, Value>> {
    lookup(record, paths, Value::as_object)
}

/// First candidate path holding a JSON array.
pub fn lookup_array<'a>(record: &'a Map<String, Value>, paths: &[KeyPath]) -> Option<&'a Vec<Value>> {
    lookup(record, paths, Value::as_array)
}
