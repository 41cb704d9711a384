//! Canonical route plan models.
//!
//! Every upstream response shape converges to these types. They serialize
//! using the upstream "direct" wire names, so a stored plan can be fed back
//! through the resolver unchanged.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both components are finite and inside the WGS84 range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Route metadata returned by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub polyline: String,
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub origin: String,
    pub destination: String,
}

/// A charging location on (or near) the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationStop {
    #[serde(rename = "station_name")]
    pub name: String,
    pub location: GeoPoint,
    pub address: String,
    pub charging_speed_kw: f64,
    pub detour_km: f64,
    #[serde(rename = "arrival_SOC")]
    pub arrival_soc: f64,
    #[serde(rename = "departure_SOC")]
    pub departure_soc: f64,
    pub charging_time_minutes: u32,
    pub energy_added_kwh: f64,
    pub distance_from_origin_km: f64,
    pub is_critical: bool,
    pub reason: String,
    /// Part of the chosen plan rather than a discarded candidate.
    pub is_selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(
        default,
        rename = "user_rating_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub review_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_types: Option<Vec<String>>,
    #[serde(default, rename = "website_uri", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(
        default,
        rename = "phone_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_route: Option<bool>,
    /// Extra driving minutes caused by visiting this stop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_impact_minutes: Option<i64>,
}

impl StationStop {
    /// Stable identity used for list diffing: `name_lat_lng`.
    pub fn id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.name, self.location.latitude, self.location.longitude
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingPlan {
    pub needed: bool,
    #[serde(rename = "selected_stations")]
    pub selected_stops: Vec<StationStop>,
    #[serde(rename = "all_stations")]
    pub all_candidate_stops: Vec<StationStop>,
    #[serde(rename = "total_charging_time")]
    pub total_charging_time_minutes: u32,
    pub total_detour_km: f64,
    #[serde(rename = "total_energy_added_kwh")]
    pub total_energy_added_kwh: f64,
    pub can_complete_without_charging: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub origin: String,
    pub destination: String,
    pub base_duration_minutes: u32,
    pub charging_time_minutes: u32,
    pub detour_time_minutes: u32,
    /// Base + charging + detour minutes when derived.
    pub estimated_total_duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStatistics {
    pub total_stations_found: usize,
    pub on_route_stations: usize,
    pub stations_selected: usize,
    pub avg_charging_speed_selected: f64,
    pub total_energy_required: f64,
    pub min_soc_reached: f64,
}

/// The canonical, fully reconstructed route plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    /// Decoded route line. Empty when the polyline could not be decoded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geometry: Vec<GeoPoint>,
    pub route: RouteInfo,
    pub charging_plan: ChargingPlan,
    pub summary: TripSummary,
    pub statistics: RouteStatistics,
}

impl RoutePlan {
    pub fn charging_stop_count(&self) -> usize {
        self.charging_plan.selected_stops.len()
    }
}
