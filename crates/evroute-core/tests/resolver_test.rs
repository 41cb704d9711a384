//! End-to-end route plan resolution over every known response shape.

use evroute_core::{
    resolve_route_plan, Envelope, ResponseShape, RoutePlanResolver, SHAPE_ORDER,
};
use serde_json::{json, Value};

fn gilroy() -> Value {
    json!({
        "station_name": "Gilroy SC",
        "location": {"latitude": 37.0058, "longitude": -121.5683},
        "address": "681 Leavesley Rd",
        "charging_speed_kw": 250,
        "detour_km": 2.3,
        "arrival_SOC": 25,
        "departure_SOC": 80,
        "charging_time_minutes": 22,
        "energy_added_kwh": 41.25,
        "distance_from_origin_km": 120,
        "is_critical": true,
        "reason": "Required"
    })
}

fn v2_payload() -> Value {
    json!([{
        "route": {
            "polyline": "u{~vFvyys@fS]",
            "distance_km": "285.5",
            "duration_minutes": 180,
            "origin": "SF",
            "destination": "LA"
        },
        "charging_plan": {
            "needed": true,
            "selected_stations": [gilroy()],
            "all_stations": []
        }
    }])
}

fn direct_payload() -> Value {
    json!({
        "route": {
            "polyline": "u{~vFvyys@fS]",
            "distance_km": 285.5,
            "duration_minutes": 180,
            "origin": "SF",
            "destination": "LA"
        },
        "charging_plan": {
            "needed": true,
            "selected_stations": [gilroy()],
            "all_stations": [gilroy()],
            "total_charging_time": 22,
            "total_detour_km": 4.6,
            "total_energy_added_kwh": 41.25,
            "can_complete_without_charging": false
        },
        "summary": {
            "origin": "SF",
            "destination": "LA",
            "base_duration_minutes": 180,
            "charging_time_minutes": 22,
            "detour_time_minutes": 0,
            "estimated_total_duration": 202
        },
        "statistics": {
            "total_stations_found": 1,
            "on_route_stations": 0,
            "stations_selected": 1,
            "avg_charging_speed_selected": 250.0,
            "total_energy_required": 41.25,
            "min_soc_reached": 25.0
        }
    })
}

fn bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}

#[test]
fn v2_array_scenario_derives_totals() {
    let resolved = RoutePlanResolver::new().resolve(&bytes(&v2_payload())).unwrap();
    let plan = resolved.plan;

    assert_eq!(resolved.shape, ResponseShape::V2Array);
    assert_eq!(resolved.envelope, Envelope::Raw);
    assert_eq!(plan.route.distance_km, 285.5);
    assert_eq!(plan.route.duration_minutes, 180);
    assert_eq!(plan.charging_plan.selected_stops.len(), 1);
    assert_eq!(plan.charging_plan.selected_stops[0].name, "Gilroy SC");
    assert!(plan.charging_plan.selected_stops[0].is_selected);
    assert_eq!(plan.charging_plan.total_charging_time_minutes, 22);
    assert_eq!(plan.charging_plan.total_energy_added_kwh, 41.25);
    assert!(!plan.charging_plan.can_complete_without_charging);
    assert_eq!(plan.geometry.len(), 2);
    assert_eq!(plan.summary.estimated_total_duration, 202);
    assert_eq!(plan.statistics.min_soc_reached, 25.0);
    assert_eq!(plan.statistics.avg_charging_speed_selected, 250.0);
}

#[test]
fn direct_wins_over_v2_when_both_match() {
    // An array-of-one direct payload also satisfies the v2 predicate.
    let payload = json!([direct_payload()]);
    assert!(ResponseShape::V2Array.decode(&payload).is_ok());

    let resolved = RoutePlanResolver::new().resolve(&bytes(&payload)).unwrap();
    assert_eq!(resolved.shape, ResponseShape::Direct);
    assert_eq!(resolved.plan.charging_plan.total_detour_km, 4.6);
    assert_eq!(resolved.plan.summary.estimated_total_duration, 202);
}

#[test]
fn direct_reads_first_element_of_longer_array() {
    let payload = json!([direct_payload(), {"note": "trailing workflow item"}]);

    let resolved = RoutePlanResolver::new().resolve(&bytes(&payload)).unwrap();
    assert_eq!(resolved.shape, ResponseShape::Direct);
    assert_eq!(resolved.plan.summary.estimated_total_duration, 202);
    assert_eq!(resolved.plan.statistics.total_energy_required, 41.25);
}

#[test]
fn huge_time_impacts_do_not_overflow() {
    let mut first = gilroy();
    first["time_impact_minutes"] = json!(i64::MAX);
    let mut second = gilroy();
    second["station_name"] = json!("Kettleman City SC");
    second["time_impact_minutes"] = json!(i64::MAX);

    let mut payload = v2_payload();
    payload[0]["charging_plan"]["selected_stations"] = json!([first, second]);

    let plan = resolve_route_plan(&bytes(&payload)).unwrap();
    assert_eq!(plan.summary.detour_time_minutes, u32::MAX);
    assert_eq!(plan.summary.estimated_total_duration, u32::MAX);
}

#[test]
fn overflowing_polyline_leaves_geometry_empty() {
    // Four latitude deltas of 2^61 overflow the running i64 total.
    let encoded = "____________C?".repeat(4);
    let mut payload = v2_payload();
    payload[0]["route"]["polyline"] = json!(encoded);

    let plan = resolve_route_plan(&bytes(&payload)).unwrap();
    assert!(plan.geometry.is_empty());
    assert_eq!(plan.route.distance_km, 285.5);
}

#[test]
fn direct_candidate_marked_selected_by_membership() {
    let resolved = RoutePlanResolver::new()
        .resolve(&bytes(&direct_payload()))
        .unwrap();
    let all = &resolved.plan.charging_plan.all_candidate_stops;
    assert_eq!(all.len(), 1);
    assert!(all[0].is_selected);
}

#[test]
fn legacy_array_uses_supplied_totals() {
    let mut response = direct_payload();
    response["charging_plan"]["total_charging_time"] = json!(99);
    let payload = json!([{"origin": "SF", "response": response}]);

    let resolved = RoutePlanResolver::new().resolve(&bytes(&payload)).unwrap();
    assert_eq!(resolved.shape, ResponseShape::LegacyArray);
    assert_eq!(resolved.plan.charging_plan.total_charging_time_minutes, 99);
}

#[test]
fn legacy_array_without_totals_falls_through_to_permissive() {
    let mut response = direct_payload();
    let plan = response["charging_plan"].as_object_mut().unwrap();
    plan.remove("total_detour_km");
    let payload = json!([{"response": response}]);

    let resolved = RoutePlanResolver::new().resolve(&bytes(&payload)).unwrap();
    assert_eq!(resolved.shape, ResponseShape::Permissive);
    // Derived: both lists hold Gilroy with 2.3 km each.
    assert!((resolved.plan.charging_plan.total_detour_km - 4.6).abs() < 1e-9);
}

#[test]
fn permissive_object_with_camel_case_plan() {
    let payload = json!({
        "route": {"distance_km": 12.5, "duration_minutes": "30", "origin": "A", "destination": "B"},
        "chargingPlan": {"needed": false, "selectedStations": [], "allStations": [gilroy()]}
    });

    let resolved = RoutePlanResolver::new().resolve(&bytes(&payload)).unwrap();
    let plan = resolved.plan;
    assert_eq!(resolved.shape, ResponseShape::Permissive);
    assert_eq!(plan.route.duration_minutes, 30);
    assert!(!plan.charging_plan.needed);
    assert!(plan.charging_plan.can_complete_without_charging);
    assert_eq!(plan.charging_plan.all_candidate_stops.len(), 1);
    assert!(!plan.charging_plan.all_candidate_stops[0].is_selected);
    assert_eq!(plan.statistics.total_stations_found, 1);
}

#[test]
fn string_literal_wrapped_body_resolves() {
    let inner = serde_json::to_string(&v2_payload()).unwrap();
    let body = serde_json::to_vec(&Value::String(inner)).unwrap();

    let resolved = RoutePlanResolver::new().resolve(&body).unwrap();
    assert_eq!(resolved.envelope, Envelope::StringLiteral);
    assert_eq!(resolved.shape, ResponseShape::V2Array);
}

#[test]
fn triple_quoted_body_resolves() {
    let body = format!("\"\"\"{}\"\"\"", v2_payload());
    let resolved = RoutePlanResolver::new().resolve(body.as_bytes()).unwrap();
    assert_eq!(resolved.envelope, Envelope::TripleQuoted);
    assert_eq!(resolved.plan.route.distance_km, 285.5);
}

#[test]
fn noisy_body_is_bracket_extracted() {
    let body = format!("Workflow output: {} -- end", v2_payload());
    let resolved = RoutePlanResolver::new().resolve(body.as_bytes()).unwrap();
    assert_eq!(resolved.envelope, Envelope::Bracketed);
}

#[test]
fn coordinate_less_station_is_dropped_everywhere() {
    let mut payload = v2_payload();
    let lost = json!({"station_name": "Lost", "location": {"address": "?"}});
    payload[0]["charging_plan"]["selected_stations"]
        .as_array_mut()
        .unwrap()
        .push(lost.clone());
    payload[0]["charging_plan"]["all_stations"] = json!([lost]);

    let plan = resolve_route_plan(&bytes(&payload)).unwrap();
    assert!(plan
        .charging_plan
        .selected_stops
        .iter()
        .chain(plan.charging_plan.all_candidate_stops.iter())
        .all(|stop| stop.name != "Lost"));
    assert_eq!(plan.charging_plan.selected_stops.len(), 1);
    assert!(plan.charging_plan.all_candidate_stops.is_empty());
}

#[test]
fn unrecognized_payload_reports_every_shape() {
    let err = resolve_route_plan(br#"{"status": "queued"}"#).unwrap_err();
    assert_eq!(err.shapes_tried(), SHAPE_ORDER.to_vec());
    assert!(err.to_string().starts_with("could not decode route response"));
}

#[test]
fn garbage_body_reports_invalid_json() {
    let err = resolve_route_plan(b"<html>502 Bad Gateway</html>").unwrap_err();
    assert!(err.attempts.iter().all(|a| a.shape.is_none()));
    assert!(err.attempts[0].reason.starts_with("invalid JSON"));
}

#[test]
fn serialized_plan_resolves_back_as_direct() {
    let plan = resolve_route_plan(&bytes(&v2_payload())).unwrap();
    let stored = serde_json::to_vec(&plan).unwrap();

    let resolved = RoutePlanResolver::new().resolve(&stored).unwrap();
    assert_eq!(resolved.shape, ResponseShape::Direct);
    assert_eq!(resolved.plan, plan);
}
