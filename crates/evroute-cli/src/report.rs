//! Plain-text rendering for terminal output.

use evroute_core::{RoutePlan, StationStop};
use std::fmt::Write;

/// `3h 22m`, or `45m` under an hour.
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours == 0 {
        format!("{}m", rest)
    } else {
        format!("{}h {}m", hours, rest)
    }
}

pub fn format_plan(plan: &RoutePlan) -> String {
    let mut out = String::new();
    let route = &plan.route;
    let charging = &plan.charging_plan;

    let _ = writeln!(out, "{} -> {}", route.origin, route.destination);
    let _ = writeln!(
        out,
        "Distance: {:.1} km   Driving: {}   Total: {}",
        route.distance_km,
        format_duration(plan.summary.base_duration_minutes),
        format_duration(plan.summary.estimated_total_duration)
    );

    if charging.selected_stops.is_empty() {
        let verdict = if charging.can_complete_without_charging {
            "not needed"
        } else {
            "needed, but no stops were selected"
        };
        let _ = writeln!(out, "Charging: {}", verdict);
    } else {
        let _ = writeln!(
            out,
            "Charging: {} stop(s), {} charging, {:.1} kWh added, {:.1} km detour",
            charging.selected_stops.len(),
            format_duration(charging.total_charging_time_minutes),
            charging.total_energy_added_kwh,
            charging.total_detour_km
        );
        for (index, stop) in charging.selected_stops.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} ({:.0} kW) {:.0}% -> {:.0}%, {}{}",
                index + 1,
                display_name(stop),
                stop.charging_speed_kw,
                stop.arrival_soc,
                stop.departure_soc,
                format_duration(stop.charging_time_minutes),
                if stop.is_critical { " [critical]" } else { "" }
            );
            if !stop.address.is_empty() {
                let _ = writeln!(out, "     {}", stop.address);
            }
        }
    }

    let stats = &plan.statistics;
    let _ = writeln!(
        out,
        "Stations found: {} ({} on route), lowest SOC {:.0}%",
        stats.total_stations_found, stats.on_route_stations, stats.min_soc_reached
    );
    if plan.geometry.is_empty() {
        let _ = writeln!(out, "Route line: unavailable");
    } else {
        let _ = writeln!(out, "Route line: {} points", plan.geometry.len());
    }
    out
}

pub fn format_stations(stations: &[StationStop]) -> String {
    if stations.is_empty() {
        return "No stations found\n".to_string();
    }

    let mut out = String::new();
    for stop in stations {
        let marker = if stop.is_selected { "*" } else { " " };
        let _ = write!(
            out,
            "{} {} ({:.5}, {:.5})",
            marker,
            display_name(stop),
            stop.location.latitude,
            stop.location.longitude
        );
        if stop.charging_speed_kw > 0.0 {
            let _ = write!(out, " {:.0} kW", stop.charging_speed_kw);
        }
        if let Some(rating) = stop.rating {
            let _ = write!(out, " {:.1}/5", rating);
        }
        out.push('\n');
    }
    out
}

fn display_name(stop: &StationStop) -> &str {
    if stop.name.is_empty() {
        "(unnamed station)"
    } else {
        &stop.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evroute_core::resolve_route_plan;
    use serde_json::json;

    #[test]
    fn durations() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(202), "3h 22m");
    }

    #[test]
    fn plan_report_lists_stops() {
        let payload = json!([{
            "route": {"polyline": "u{~vFvyys@fS]", "distance_km": "285.5", "duration_minutes": 180, "origin": "SF", "destination": "LA"},
            "charging_plan": {
                "needed": true,
                "selected_stations": [{
                    "station_name": "Gilroy SC",
                    "location": {"latitude": 37.0058, "longitude": -121.5683},
                    "address": "681 Leavesley Rd",
                    "charging_speed_kw": 250,
                    "arrival_SOC": 25,
                    "departure_SOC": 80,
                    "charging_time_minutes": 22,
                    "energy_added_kwh": 41.25,
                    "is_critical": true
                }],
                "all_stations": []
            }
        }]);
        let plan = resolve_route_plan(payload.to_string().as_bytes()).unwrap();
        let report = format_plan(&plan);

        assert!(report.starts_with("SF -> LA\n"));
        assert!(report.contains("Distance: 285.5 km   Driving: 3h 0m   Total: 3h 22m"));
        assert!(report.contains("1. Gilroy SC (250 kW) 25% -> 80%, 22m [critical]"));
        assert!(report.contains("681 Leavesley Rd"));
        assert!(report.contains("Route line: 2 points"));
    }

    #[test]
    fn empty_station_list() {
        assert_eq!(format_stations(&[]), "No stations found\n");
    }
}
