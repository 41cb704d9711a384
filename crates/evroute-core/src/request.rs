//! Outbound planning requests and vehicle profiles.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::GeoPoint;

pub const DEFAULT_MIN_SOC: f64 = 20.0;
pub const DEFAULT_TARGET_SOC: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("{field} coordinate ({latitude}, {longitude}) is outside WGS84 range")]
    InvalidCoordinate {
        field: &'static str,
        latitude: f64,
        longitude: f64,
    },
    #[error("{field} must be within 0..=100, got {value}")]
    SocOutOfRange { field: &'static str, value: f64 },
    #[error("target SOC {target} must be above minimum SOC {min}")]
    TargetNotAboveMin { min: f64, target: f64 },
    #[error("battery capacity must be positive, got {0} kWh")]
    InvalidCapacity(f64),
    #[error("expected \"lat,lng\", got {0:?}")]
    InvalidLatLng(String),
    #[error("search radius must be positive, got {0} km")]
    InvalidRadius(f64),
}

/// Body POSTed to the route planning webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlanRequest {
    /// `"lat,lng"`
    pub origin: String,
    /// `"lat,lng"`
    pub destination: String,
    pub current_soc: f64,
    pub battery_capacity_kwh: f64,
    pub min_soc: f64,
    pub target_soc: f64,
    pub amenity_preferences: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

impl RoutePlanRequest {
    pub fn builder() -> RoutePlanRequestBuilder {
        RoutePlanRequestBuilder::default()
    }
}

#[derive(Debug, Clone)]
pub struct RoutePlanRequestBuilder {
    origin: Option<GeoPoint>,
    destination: Option<GeoPoint>,
    current_soc: Option<f64>,
    battery_capacity_kwh: Option<f64>,
    min_soc: f64,
    target_soc: f64,
    amenity_preferences: BTreeSet<String>,
    user_email: Option<String>,
}

impl Default for RoutePlanRequestBuilder {
    fn default() -> Self {
        Self {
            origin: None,
            destination: None,
            current_soc: None,
            battery_capacity_kwh: None,
            min_soc: DEFAULT_MIN_SOC,
            target_soc: DEFAULT_TARGET_SOC,
            amenity_preferences: BTreeSet::new(),
            user_email: None,
        }
    }
}

impl RoutePlanRequestBuilder {
    /// Start from a vehicle's battery capacity and preferred SOC window.
    pub fn for_vehicle(vehicle: &Vehicle) -> Self {
        Self {
            battery_capacity_kwh: Some(vehicle.battery_capacity_kwh),
            min_soc: vehicle.preferred_min_soc,
            target_soc: vehicle.preferred_target_soc,
            ..Self::default()
        }
    }

    pub fn origin(mut self, origin: GeoPoint) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn destination(mut self, destination: GeoPoint) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn current_soc(mut self, soc: f64) -> Self {
        self.current_soc = Some(soc);
        self
    }

    pub fn battery_capacity_kwh(mut self, kwh: f64) -> Self {
        self.battery_capacity_kwh = Some(kwh);
        self
    }

    pub fn min_soc(mut self, soc: f64) -> Self {
        self.min_soc = soc;
        self
    }

    pub fn target_soc(mut self, soc: f64) -> Self {
        self.target_soc = soc;
        self
    }

    pub fn amenity(mut self, amenity: impl Into<String>) -> Self {
        self.amenity_preferences.insert(amenity.into());
        self
    }

    pub fn amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.amenity_preferences
            .extend(amenities.into_iter().map(Into::into));
        self
    }

    pub fn user_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = Some(email.into());
        self
    }

    /// Validate and build. `current_soc >= min_soc` is left to the caller.
    pub fn build(self) -> Result<RoutePlanRequest, RequestError> {
        let origin = self.origin.ok_or(RequestError::MissingField("origin"))?;
        let destination = self
            .destination
            .ok_or(RequestError::MissingField("destination"))?;
        let current_soc = self
            .current_soc
            .ok_or(RequestError::MissingField("current_soc"))?;
        let battery_capacity_kwh = self
            .battery_capacity_kwh
            .ok_or(RequestError::MissingField("battery_capacity_kwh"))?;

        check_point("origin", origin)?;
        check_point("destination", destination)?;
        check_soc("current_soc", current_soc)?;
        check_soc("min_soc", self.min_soc)?;
        check_soc("target_soc", self.target_soc)?;
        if self.target_soc <= self.min_soc {
            return Err(RequestError::TargetNotAboveMin {
                min: self.min_soc,
                target: self.target_soc,
            });
        }
        if !(battery_capacity_kwh.is_finite() && battery_capacity_kwh > 0.0) {
            return Err(RequestError::InvalidCapacity(battery_capacity_kwh));
        }

        Ok(RoutePlanRequest {
            origin: format_lat_lng(origin),
            destination: format_lat_lng(destination),
            current_soc,
            battery_capacity_kwh,
            min_soc: self.min_soc,
            target_soc: self.target_soc,
            amenity_preferences: self.amenity_preferences,
            user_email: self.user_email.filter(|email| !email.trim().is_empty()),
        })
    }
}

fn check_point(field: &'static str, point: GeoPoint) -> Result<(), RequestError> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(RequestError::InvalidCoordinate {
            field,
            latitude: point.latitude,
            longitude: point.longitude,
        })
    }
}

fn check_soc(field: &'static str, value: f64) -> Result<(), RequestError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(RequestError::SocOutOfRange { field, value })
    }
}

/// Format a point as the webhook's `"lat,lng"` string.
pub fn format_lat_lng(point: GeoPoint) -> String {
    format!("{},{}", point.latitude, point.longitude)
}

/// Parse a `"lat,lng"` string, tolerating whitespace around each half.
pub fn parse_lat_lng(text: &str) -> Result<GeoPoint, RequestError> {
    let invalid = || RequestError::InvalidLatLng(text.to_string());
    let (lat, lng) = text.split_once(',').ok_or_else(invalid)?;
    let latitude = lat.trim().parse::<f64>().map_err(|_| invalid())?;
    let longitude = lng.trim().parse::<f64>().map_err(|_| invalid())?;

    let point = GeoPoint::new(latitude, longitude);
    if !point.is_valid() {
        return Err(invalid());
    }
    Ok(point)
}

// ========== VEHICLES ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorType {
    #[serde(rename = "CCS")]
    Ccs,
    #[serde(rename = "CHAdeMO")]
    Chademo,
    Type2,
    Tesla,
    J1772,
}

/// An EV profile used to seed planning requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    #[serde(rename = "battery_capacity")]
    pub battery_capacity_kwh: f64,
    #[serde(rename = "range")]
    pub range_km: f64,
    /// kWh per 100 km
    #[serde(rename = "efficiency")]
    pub efficiency_kwh_per_100km: f64,
    pub connector_types: Vec<ConnectorType>,
    #[serde(rename = "max_charging_speed")]
    pub max_charging_speed_kw: f64,
    #[serde(default = "default_min_soc")]
    pub preferred_min_soc: f64,
    #[serde(default = "default_target_soc")]
    pub preferred_target_soc: f64,
}

fn default_min_soc() -> f64 {
    DEFAULT_MIN_SOC
}

fn default_target_soc() -> f64 {
    DEFAULT_TARGET_SOC
}

impl Vehicle {
    pub fn display_name(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }

    /// Built-in profiles offered when the user has not configured a vehicle.
    pub fn popular_models() -> Vec<Vehicle> {
        use ConnectorType::*;

        vec![
            builtin("tesla-model-3", "Tesla", "Model 3", 75.0, 500.0, 15.0, vec![Tesla, Ccs], 250.0),
            builtin("tesla-model-y", "Tesla", "Model Y", 75.0, 480.0, 15.6, vec![Tesla, Ccs], 250.0),
            builtin("nissan-leaf", "Nissan", "Leaf", 62.0, 360.0, 17.2, vec![Chademo, Type2], 50.0),
            builtin("vw-id4", "Volkswagen", "ID.4", 82.0, 520.0, 15.8, vec![Ccs], 135.0),
        ]
    }

    pub fn find_popular(id: &str) -> Option<Vehicle> {
        Self::popular_models()
            .into_iter()
            .find(|vehicle| vehicle.id == id)
    }
}

#[allow(clippy::too_many_arguments)]
fn builtin(
    id: &str,
    make: &str,
    model: &str,
    battery_capacity_kwh: f64,
    range_km: f64,
    efficiency_kwh_per_100km: f64,
    connector_types: Vec<ConnectorType>,
    max_charging_speed_kw: f64,
) -> Vehicle {
    Vehicle {
        id: id.to_string(),
        make: make.to_string(),
        model: model.to_string(),
        year: 2024,
        battery_capacity_kwh,
        range_km,
        efficiency_kwh_per_100km,
        connector_types,
        max_charging_speed_kw,
        preferred_min_soc: DEFAULT_MIN_SOC,
        preferred_target_soc: DEFAULT_TARGET_SOC,
    }
}

/// Body POSTed to the nearby-stations webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    /// Same point as `"lat,lng"` for flows that expect a string.
    pub location: String,
}

impl NearbyRequest {
    pub fn new(center: GeoPoint, radius_km: f64) -> Result<Self, RequestError> {
        check_point("center", center)?;
        if !(radius_km.is_finite() && radius_km > 0.0) {
            return Err(RequestError::InvalidRadius(radius_km));
        }
        Ok(Self {
            latitude: center.latitude,
            longitude: center.longitude,
            radius_km,
            location: format_lat_lng(center),
        })
    }
}
