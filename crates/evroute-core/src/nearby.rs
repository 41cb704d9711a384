//! Nearby-stations response decoding.
//!
//! Unlike route plans, an empty nearby body is a valid "nothing found".

use serde_json::Value;

use crate::aliases::{self, lookup_array};
use crate::envelope::{is_blank, unwrap_candidates};
use crate::models::StationStop;
use crate::resolver::{DecodeDiagnostic, PlanDecodeError};
use crate::station::{normalize_station, normalize_stations, selection_flag};

/// Decode a nearby-stations body into normalized stops.
///
/// Accepted layouts, per envelope candidate: a bare station array, an item
/// array `[{"json": {...}}]`, an array whose first element holds `stations`,
/// an object holding `stations`, or one station object.
pub fn resolve_nearby_stations(raw: &[u8]) -> Result<Vec<StationStop>, PlanDecodeError> {
    if is_blank(raw) {
        tracing::debug!("blank nearby response, no stations");
        return Ok(Vec::new());
    }

    let mut attempts = Vec::new();
    for candidate in unwrap_candidates(raw) {
        let outcome = serde_json::from_str::<Value>(&candidate.text)
            .map_err(|err| format!("invalid JSON: {err}"))
            .and_then(|value| stations_from(&value));

        match outcome {
            Ok(stations) => {
                tracing::info!(
                    envelope = %candidate.envelope,
                    count = stations.len(),
                    "resolved nearby stations"
                );
                return Ok(stations);
            }
            Err(reason) => {
                tracing::debug!(envelope = %candidate.envelope, %reason, "nearby layout rejected");
                attempts.push(DecodeDiagnostic {
                    envelope: candidate.envelope,
                    shape: None,
                    reason,
                });
            }
        }
    }

    Err(PlanDecodeError { attempts })
}

fn stations_from(value: &Value) -> Result<Vec<StationStop>, String> {
    match value {
        Value::Array(items) => {
            let Some(first) = items.first() else {
                return Ok(Vec::new());
            };
            if first.get("json").is_some_and(Value::is_object) {
                let records = items.iter().filter_map(|item| item.get("json"));
                return Ok(normalize_stations(records, selection_flag));
            }
            if let Some(stations) = first
                .as_object()
                .and_then(|first| lookup_array(first, aliases::NEARBY_STATIONS))
            {
                return Ok(normalize_stations(stations, selection_flag));
            }
            Ok(normalize_stations(items, selection_flag))
        }
        Value::Object(record) => {
            if let Some(stations) = lookup_array(record, aliases::NEARBY_STATIONS) {
                return Ok(normalize_stations(stations, selection_flag));
            }
            normalize_station(record, selection_flag(record))
                .map(|station| vec![station])
                .ok_or_else(|| "object is neither a station list nor a station".to_string())
        }
        _ => Err("not an array or object".to_string()),
    }
}
