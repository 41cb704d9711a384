//! Derivation of plan-level totals and statistics.
//!
//! Values present in the payload are used as-is; anything missing is
//! computed from the normalized stops. Derivation never fails: with no
//! inputs every figure is zero.

use serde_json::{Map, Value};

use crate::aliases::{self, lookup};
use crate::coerce::{as_bool, as_f64, as_u32};
use crate::models::{ChargingPlan, RouteInfo, RouteStatistics, StationStop, TripSummary};

/// Optional plan-level values as found in the payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanLevelFields {
    pub needed: Option<bool>,
    pub total_charging_time: Option<u32>,
    pub total_detour_km: Option<f64>,
    pub total_energy_added_kwh: Option<f64>,
    pub can_complete_without_charging: Option<bool>,
    // Trip summary
    pub base_duration_minutes: Option<u32>,
    pub summary_charging_time: Option<u32>,
    pub detour_time_minutes: Option<u32>,
    pub estimated_total_duration: Option<u32>,
    // Route statistics
    pub total_stations_found: Option<usize>,
    pub on_route_stations: Option<usize>,
    pub stations_selected: Option<usize>,
    pub avg_charging_speed: Option<f64>,
    pub total_energy_required: Option<f64>,
    pub min_soc_reached: Option<f64>,
}

impl PlanLevelFields {
    /// Collect whatever plan-level fields the charging plan, summary and
    /// statistics objects carry.
    pub fn from_json(
        plan: Option<&Map<String, Value>>,
        summary: Option<&Map<String, Value>>,
        statistics: Option<&Map<String, Value>>,
    ) -> Self {
        let count = |value: &Value| as_u32(value).map(|v| v as usize);
        let mut fields = Self::default();

        if let Some(plan) = plan {
            fields.needed = lookup(plan, aliases::NEEDED, as_bool);
            fields.total_charging_time = lookup(plan, aliases::TOTAL_CHARGING_TIME, as_u32);
            fields.total_detour_km = lookup(plan, aliases::TOTAL_DETOUR_KM, as_f64);
            fields.total_energy_added_kwh = lookup(plan, aliases::TOTAL_ENERGY_ADDED_KWH, as_f64);
            fields.can_complete_without_charging =
                lookup(plan, aliases::CAN_COMPLETE_WITHOUT_CHARGING, as_bool);
        }

        if let Some(summary) = summary {
            fields.base_duration_minutes = lookup(summary, aliases::BASE_DURATION_MINUTES, as_u32);
            fields.summary_charging_time = lookup(summary, aliases::SUMMARY_CHARGING_TIME, as_u32);
            fields.detour_time_minutes = lookup(summary, aliases::DETOUR_TIME_MINUTES, as_u32);
            fields.estimated_total_duration =
                lookup(summary, aliases::ESTIMATED_TOTAL_DURATION, as_u32);
        }

        if let Some(statistics) = statistics {
            fields.total_stations_found = lookup(statistics, aliases::TOTAL_STATIONS_FOUND, count);
            fields.on_route_stations = lookup(statistics, aliases::ON_ROUTE_STATIONS, count);
            fields.stations_selected = lookup(statistics, aliases::STATIONS_SELECTED, count);
            fields.avg_charging_speed = lookup(statistics, aliases::AVG_CHARGING_SPEED, as_f64);
            fields.total_energy_required =
                lookup(statistics, aliases::TOTAL_ENERGY_REQUIRED, as_f64);
            fields.min_soc_reached = lookup(statistics, aliases::MIN_SOC_REACHED, as_f64);
        }

        fields
    }
}

/// Fully resolved plan-level figures.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub needed: bool,
    pub total_charging_time: u32,
    pub total_detour_km: f64,
    pub total_energy_added_kwh: f64,
    pub can_complete_without_charging: bool,
    pub base_duration_minutes: u32,
    pub summary_charging_time: u32,
    pub detour_time_minutes: u32,
    pub estimated_total_duration: u32,
    pub total_stations_found: usize,
    pub on_route_stations: usize,
    pub stations_selected: usize,
    pub avg_charging_speed: f64,
    pub total_energy_required: f64,
    pub min_soc_reached: f64,
}

/// Fill every missing plan-level figure from the stop lists.
///
/// `total_detour_km` sums over selected AND candidate stops, so a stop in
/// both lists is counted twice. This mirrors what the planner itself reports.
pub fn derive_aggregates(
    selected: &[StationStop],
    all: &[StationStop],
    fields: &PlanLevelFields,
    route_duration_minutes: u32,
) -> Aggregates {
    let needed = fields.needed.unwrap_or(true);

    let total_charging_time = fields.total_charging_time.unwrap_or_else(|| {
        selected
            .iter()
            .fold(0u32, |acc, stop| acc.saturating_add(stop.charging_time_minutes))
    });
    let total_detour_km = fields.total_detour_km.unwrap_or_else(|| {
        selected
            .iter()
            .chain(all.iter())
            .map(|stop| stop.detour_km)
            .sum()
    });
    let total_energy_added_kwh = fields
        .total_energy_added_kwh
        .unwrap_or_else(|| selected.iter().map(|stop| stop.energy_added_kwh).sum());

    let detour_time_minutes = fields.detour_time_minutes.unwrap_or_else(|| {
        let minutes = selected
            .iter()
            .filter_map(|stop| stop.time_impact_minutes)
            .filter(|minutes| *minutes > 0)
            .fold(0i64, i64::saturating_add);
        u32::try_from(minutes).unwrap_or(u32::MAX)
    });
    let base_duration_minutes = fields.base_duration_minutes.unwrap_or(route_duration_minutes);
    let estimated_total_duration = fields.estimated_total_duration.unwrap_or_else(|| {
        base_duration_minutes
            .saturating_add(total_charging_time)
            .saturating_add(detour_time_minutes)
    });

    let avg_charging_speed = fields.avg_charging_speed.unwrap_or_else(|| {
        if selected.is_empty() {
            0.0
        } else {
            selected.iter().map(|stop| stop.charging_speed_kw).sum::<f64>() / selected.len() as f64
        }
    });
    let min_soc_reached = fields.min_soc_reached.unwrap_or_else(|| {
        selected
            .iter()
            .map(|stop| stop.arrival_soc)
            .reduce(f64::min)
            .unwrap_or(0.0)
    });

    Aggregates {
        needed,
        total_charging_time,
        total_detour_km,
        total_energy_added_kwh,
        can_complete_without_charging: fields.can_complete_without_charging.unwrap_or(!needed),
        base_duration_minutes,
        summary_charging_time: fields.summary_charging_time.unwrap_or(total_charging_time),
        detour_time_minutes,
        estimated_total_duration,
        total_stations_found: fields.total_stations_found.unwrap_or(all.len()),
        on_route_stations: fields
            .on_route_stations
            .unwrap_or_else(|| all.iter().filter(|stop| stop.on_route == Some(true)).count()),
        stations_selected: fields.stations_selected.unwrap_or(selected.len()),
        avg_charging_speed,
        total_energy_required: fields.total_energy_required.unwrap_or(total_energy_added_kwh),
        min_soc_reached,
    }
}

impl Aggregates {
    pub fn charging_plan(
        &self,
        selected_stops: Vec<StationStop>,
        all_candidate_stops: Vec<StationStop>,
    ) -> ChargingPlan {
        ChargingPlan {
            needed: self.needed,
            selected_stops,
            all_candidate_stops,
            total_charging_time_minutes: self.total_charging_time,
            total_detour_km: self.total_detour_km,
            total_energy_added_kwh: self.total_energy_added_kwh,
            can_complete_without_charging: self.can_complete_without_charging,
        }
    }

    pub fn summary(&self, route: &RouteInfo) -> TripSummary {
        TripSummary {
            origin: route.origin.clone(),
            destination: route.destination.clone(),
            base_duration_minutes: self.base_duration_minutes,
            charging_time_minutes: self.summary_charging_time,
            detour_time_minutes: self.detour_time_minutes,
            estimated_total_duration: self.estimated_total_duration,
        }
    }

    pub fn statistics(&self) -> RouteStatistics {
        RouteStatistics {
            total_stations_found: self.total_stations_found,
            on_route_stations: self.on_route_stations,
            stations_selected: self.stations_selected,
            avg_charging_speed_selected: self.avg_charging_speed,
            total_energy_required: self.total_energy_required,
            min_soc_reached: self.min_soc_reached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use serde_json::json;

    fn stop(name: &str, minutes: u32, energy: f64, detour: f64, speed: f64, arrival: f64) -> StationStop {
        StationStop {
            name: name.to_string(),
            location: GeoPoint::new(37.0, -121.0),
            address: String::new(),
            charging_speed_kw: speed,
            detour_km: detour,
            arrival_soc: arrival,
            departure_soc: 80.0,
            charging_time_minutes: minutes,
            energy_added_kwh: energy,
            distance_from_origin_km: 0.0,
            is_critical: false,
            reason: String::new(),
            is_selected: true,
            rating: None,
            review_count: None,
            connector_types: None,
            website: None,
            phone: None,
            business_status: None,
            on_route: None,
            time_impact_minutes: None,
        }
    }

    #[test]
    fn empty_inputs_yield_zeros() {
        let aggregates = derive_aggregates(&[], &[], &PlanLevelFields::default(), 0);

        assert!(aggregates.needed);
        assert!(!aggregates.can_complete_without_charging);
        assert_eq!(aggregates.total_charging_time, 0);
        assert_eq!(aggregates.total_detour_km, 0.0);
        assert_eq!(aggregates.total_energy_added_kwh, 0.0);
        assert_eq!(aggregates.avg_charging_speed, 0.0);
        assert_eq!(aggregates.min_soc_reached, 0.0);
        assert_eq!(aggregates.detour_time_minutes, 0);
        assert_eq!(aggregates.estimated_total_duration, 0);
        assert_eq!(aggregates.total_stations_found, 0);
    }

    #[test]
    fn totals_are_derived_from_selected_stops() {
        let selected = vec![
            stop("A", 22, 41.25, 2.3, 250.0, 25.0),
            stop("B", 18, 30.0, 1.0, 150.0, 18.0),
        ];
        let aggregates = derive_aggregates(&selected, &[], &PlanLevelFields::default(), 180);

        assert_eq!(aggregates.total_charging_time, 40);
        assert!((aggregates.total_energy_added_kwh - 71.25).abs() < 1e-9);
        assert!((aggregates.avg_charging_speed - 200.0).abs() < 1e-9);
        assert_eq!(aggregates.min_soc_reached, 18.0);
        assert_eq!(aggregates.stations_selected, 2);
        assert_eq!(aggregates.estimated_total_duration, 220);
        assert_eq!(aggregates.summary_charging_time, 40);
    }

    #[test]
    fn detour_sums_selected_and_candidates() {
        let selected = vec![stop("A", 0, 0.0, 2.0, 0.0, 0.0)];
        let mut candidate = stop("A", 0, 0.0, 2.0, 0.0, 0.0);
        candidate.is_selected = false;
        let all = vec![candidate, stop("B", 0, 0.0, 0.5, 0.0, 0.0)];

        let aggregates = derive_aggregates(&selected, &all, &PlanLevelFields::default(), 0);
        assert!((aggregates.total_detour_km - 4.5).abs() < 1e-9);
    }

    #[test]
    fn detour_time_counts_only_positive_impacts() {
        let mut a = stop("A", 10, 0.0, 0.0, 0.0, 0.0);
        a.time_impact_minutes = Some(6);
        let mut b = stop("B", 5, 0.0, 0.0, 0.0, 0.0);
        b.time_impact_minutes = Some(-4);
        let mut c = stop("C", 0, 0.0, 0.0, 0.0, 0.0);
        c.time_impact_minutes = Some(3);

        let aggregates = derive_aggregates(&[a, b, c], &[], &PlanLevelFields::default(), 100);
        assert_eq!(aggregates.detour_time_minutes, 9);
        assert_eq!(aggregates.estimated_total_duration, 124);
    }

    #[test]
    fn huge_time_impacts_saturate() {
        let mut a = stop("A", 0, 0.0, 0.0, 0.0, 0.0);
        a.time_impact_minutes = Some(i64::MAX);
        let mut b = stop("B", 0, 0.0, 0.0, 0.0, 0.0);
        b.time_impact_minutes = Some(i64::MAX);

        let aggregates = derive_aggregates(&[a, b], &[], &PlanLevelFields::default(), 60);
        assert_eq!(aggregates.detour_time_minutes, u32::MAX);
        assert_eq!(aggregates.estimated_total_duration, u32::MAX);
    }

    #[test]
    fn on_route_counts_candidates() {
        let mut a = stop("A", 0, 0.0, 0.0, 0.0, 0.0);
        a.on_route = Some(true);
        let mut b = stop("B", 0, 0.0, 0.0, 0.0, 0.0);
        b.on_route = Some(false);
        let c = stop("C", 0, 0.0, 0.0, 0.0, 0.0);

        let aggregates = derive_aggregates(&[], &[a, b, c], &PlanLevelFields::default(), 0);
        assert_eq!(aggregates.on_route_stations, 1);
        assert_eq!(aggregates.total_stations_found, 3);
    }

    #[test]
    fn payload_values_take_precedence() {
        let plan = json!({
            "needed": false,
            "total_charging_time": "35",
            "total_detour_km": 1.5,
            "can_complete_without_charging": false
        });
        let statistics = json!({"avg_charging_speed_selected": 120});
        let fields = PlanLevelFields::from_json(plan.as_object(), None, statistics.as_object());

        let selected = vec![stop("A", 22, 41.25, 2.3, 250.0, 25.0)];
        let aggregates = derive_aggregates(&selected, &[], &fields, 60);

        assert!(!aggregates.needed);
        assert!(!aggregates.can_complete_without_charging);
        assert_eq!(aggregates.total_charging_time, 35);
        assert_eq!(aggregates.total_detour_km, 1.5);
        assert_eq!(aggregates.avg_charging_speed, 120.0);
        // Not supplied, so still derived.
        assert!((aggregates.total_energy_added_kwh - 41.25).abs() < 1e-9);
    }

    #[test]
    fn derivation_matches_consistent_payload_totals() {
        let selected = vec![
            stop("A", 22, 41.25, 2.3, 250.0, 25.0),
            stop("B", 12, 20.5, 0.7, 150.0, 30.0),
        ];
        let plan = json!({"total_charging_time": 34, "total_energy_added_kwh": 61.75});
        let supplied = PlanLevelFields::from_json(plan.as_object(), None, None);

        let with_fields = derive_aggregates(&selected, &[], &supplied, 90);
        let stripped = derive_aggregates(&selected, &[], &PlanLevelFields::default(), 90);

        assert_eq!(with_fields.total_charging_time, stripped.total_charging_time);
        assert!((with_fields.total_energy_added_kwh - stripped.total_energy_added_kwh).abs() < 1e-9);
        assert_eq!(stripped, derive_aggregates(&selected, &[], &PlanLevelFields::default(), 90));
    }

    #[test]
    fn summary_uses_route_endpoints() {
        let route = RouteInfo {
            polyline: String::new(),
            distance_km: 10.0,
            duration_minutes: 15,
            origin: "SF".to_string(),
            destination: "LA".to_string(),
        };
        let aggregates = derive_aggregates(&[], &[], &PlanLevelFields::default(), route.duration_minutes);
        let summary = aggregates.summary(&route);

        assert_eq!(summary.origin, "SF");
        assert_eq!(summary.destination, "LA");
        assert_eq!(summary.base_duration_minutes, 15);
        assert_eq!(summary.estimated_total_duration, 15);
    }
}
