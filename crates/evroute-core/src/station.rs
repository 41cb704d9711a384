//! Station record normalization.
//!
//! Converts one loosely-shaped station object into a canonical [`StationStop`].
//! A record whose coordinates cannot be resolved under any alias is dropped.

use serde_json::{Map, Value};

use crate::aliases::{self, lookup, KeyPath};
use crate::coerce::{as_bool, as_f64, as_i64, as_str, as_string_list, as_u32};
use crate::models::{GeoPoint, StationStop};

/// Normalize one raw station object; `None` when no coordinate resolves.
pub fn normalize_station(raw: &Map<String, Value>, selected: bool) -> Option<StationStop> {
    let location = resolve_location(raw)?;

    Some(StationStop {
        name: text(raw, aliases::STATION_NAME).unwrap_or_default(),
        location,
        address: text(raw, aliases::ADDRESS).unwrap_or_default(),
        charging_speed_kw: number(raw, aliases::CHARGING_SPEED_KW)
            .map(|kw| kw.max(0.0))
            .unwrap_or(0.0),
        detour_km: number(raw, aliases::DETOUR_KM).unwrap_or(0.0),
        arrival_soc: number(raw, aliases::ARRIVAL_SOC).unwrap_or(0.0),
        departure_soc: number(raw, aliases::DEPARTURE_SOC).unwrap_or(0.0),
        charging_time_minutes: lookup(raw, aliases::CHARGING_TIME_MINUTES, as_u32).unwrap_or(0),
        energy_added_kwh: number(raw, aliases::ENERGY_ADDED_KWH)
            .map(|kwh| kwh.max(0.0))
            .unwrap_or(0.0),
        distance_from_origin_km: number(raw, aliases::DISTANCE_FROM_ORIGIN_KM)
            .map(|km| km.max(0.0))
            .unwrap_or(0.0),
        is_critical: lookup(raw, aliases::IS_CRITICAL, as_bool).unwrap_or(false),
        reason: text(raw, aliases::REASON).unwrap_or_default(),
        is_selected: selected,
        rating: number(raw, aliases::RATING),
        review_count: lookup(raw, aliases::REVIEW_COUNT, as_u32),
        connector_types: lookup(raw, aliases::CONNECTOR_TYPES, as_string_list),
        website: text(raw, aliases::WEBSITE),
        phone: text(raw, aliases::PHONE),
        business_status: text(raw, aliases::BUSINESS_STATUS),
        on_route: lookup(raw, aliases::ON_ROUTE, as_bool),
        time_impact_minutes: lookup(raw, aliases::TIME_IMPACT_MINUTES, as_i64),
    })
}

/// Resolve a coordinate pair, trying each alias pair in order.
pub fn resolve_location(raw: &Map<String, Value>) -> Option<GeoPoint> {
    aliases::COORDINATES.iter().find_map(|(lat_path, lng_path)| {
        let latitude = aliases::get_path(raw, *lat_path).and_then(as_f64)?;
        let longitude = aliases::get_path(raw, *lng_path).and_then(as_f64)?;
        Some(GeoPoint::new(latitude, longitude))
    })
}

/// OR of every selection alias, for the nearby-stations variant.
pub fn selection_flag(raw: &Map<String, Value>) -> bool {
    flag_set(raw, aliases::SELECTION_FLAGS)
}

/// The route plan's own `is_selected` flag on a record.
pub fn explicit_selection(raw: &Map<String, Value>) -> bool {
    flag_set(raw, aliases::IS_SELECTED)
}

/// Normalize an array of raw records, skipping non-objects and coordinate-less records.
pub fn normalize_stations<'a>(
    records: impl IntoIterator<Item = &'a Value>,
    selected: impl Fn(&Map<String, Value>) -> bool,
) -> Vec<StationStop> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let Some(raw) = record.as_object() else {
                tracing::debug!(index, "skipping non-object station record");
                return None;
            };
            let stop = normalize_station(raw, selected(raw));
            if stop.is_none() {
                tracing::debug!(
                    index,
                    name = %text(raw, aliases::STATION_NAME).unwrap_or_default(),
                    "dropping station without resolvable coordinates"
                );
            }
            stop
        })
        .collect()
}

fn flag_set(raw: &Map<String, Value>, paths: &[KeyPath]) -> bool {
    paths.iter().any(|path| {
        aliases::get_path(raw, *path)
            .and_then(as_bool)
            .unwrap_or(false)
    })
}

fn number(raw: &Map<String, Value>, paths: &[KeyPath]) -> Option<f64> {
    lookup(raw, paths, as_f64)
}

fn text(raw: &Map<String, Value>, paths: &[KeyPath]) -> Option<String> {
    lookup(raw, paths, as_str).map(str::to_string)
}
