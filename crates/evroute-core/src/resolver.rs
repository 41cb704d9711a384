//! Route plan reconstruction from webhook responses.
//!
//! The planning webhook has shipped several incompatible response shapes.
//! Each known shape is one decoder; [`SHAPE_ORDER`] fixes the order they are
//! tried in. Every envelope candidate of the body (see [`crate::envelope`])
//! is run through the full shape order before the next candidate is tried.
//! The first decoder to succeed wins; when none does, every attempt is
//! reported back in [`PlanDecodeError`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::aggregates::{derive_aggregates, PlanLevelFields};
use crate::aliases::{self, lookup, lookup_array, lookup_object};
use crate::coerce::{as_f64, as_str, as_u32};
use crate::envelope::{is_blank, unwrap_candidates, Envelope};
use crate::models::{GeoPoint, RouteInfo, RoutePlan, RouteStatistics, StationStop, TripSummary};
use crate::polyline::decode_polyline;
use crate::station::{explicit_selection, normalize_stations};

/// Known upstream response shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// Canonical object with `route`, `charging_plan`, `summary` and `statistics`.
    Direct,
    /// `[{ "route": ..., "charging_plan": ... }]` with plan totals usually missing.
    V2Array,
    /// `[{ "response": { ... } }]` with every total present.
    LegacyArray,
    /// Anything that still has a `route` and a charging plan somewhere near the top.
    Permissive,
}

/// Priority order of the shape decoders.
pub const SHAPE_ORDER: [ResponseShape; 4] = [
    ResponseShape::Direct,
    ResponseShape::V2Array,
    ResponseShape::LegacyArray,
    ResponseShape::Permissive,
];

type ShapeDecoder = fn(&Value) -> Result<RoutePlan, String>;

impl ResponseShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseShape::Direct => "direct",
            ResponseShape::V2Array => "v2_array",
            ResponseShape::LegacyArray => "legacy_array",
            ResponseShape::Permissive => "permissive",
        }
    }

    fn decoder(self) -> ShapeDecoder {
        match self {
            ResponseShape::Direct => decode_direct,
            ResponseShape::V2Array => decode_v2_array,
            ResponseShape::LegacyArray => decode_legacy_array,
            ResponseShape::Permissive => decode_permissive,
        }
    }

    /// Decode a parsed payload as this shape.
    pub fn decode(self, value: &Value) -> Result<RoutePlan, String> {
        (self.decoder())(value)
    }
}

impl fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why one (envelope, shape) attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeDiagnostic {
    pub envelope: Envelope,
    /// `None` when the candidate text was not JSON at all.
    pub shape: Option<ResponseShape>,
    pub reason: String,
}

impl fmt::Display for DecodeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            Some(shape) => write!(f, "{}/{}: {}", self.envelope, shape, self.reason),
            None => write!(f, "{}: {}", self.envelope, self.reason),
        }
    }
}

/// No known response shape matched the body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not decode route response ({})", render_attempts(.attempts))]
pub struct PlanDecodeError {
    pub attempts: Vec<DecodeDiagnostic>,
}

impl PlanDecodeError {
    pub(crate) fn empty_body() -> Self {
        Self {
            attempts: vec![DecodeDiagnostic {
                envelope: Envelope::Raw,
                shape: None,
                reason: "empty body".to_string(),
            }],
        }
    }

    /// Shapes that were attempted at least once, in first-attempt order.
    pub fn shapes_tried(&self) -> Vec<ResponseShape> {
        let mut shapes = Vec::new();
        for shape in self.attempts.iter().filter_map(|a| a.shape) {
            if !shapes.contains(&shape) {
                shapes.push(shape);
            }
        }
        shapes
    }
}

fn render_attempts(attempts: &[DecodeDiagnostic]) -> String {
    if attempts.is_empty() {
        return "no attempts".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A decoded plan plus how it was recognized.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlan {
    pub plan: RoutePlan,
    pub shape: ResponseShape,
    pub envelope: Envelope,
}

/// Stateless resolver over an ordered list of shapes.
#[derive(Debug, Clone)]
pub struct RoutePlanResolver {
    shapes: Vec<ResponseShape>,
}

impl Default for RoutePlanResolver {
    fn default() -> Self {
        Self {
            shapes: SHAPE_ORDER.to_vec(),
        }
    }
}

impl RoutePlanResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict resolution to the given shapes, tried in the given order.
    pub fn with_shapes(shapes: impl IntoIterator<Item = ResponseShape>) -> Self {
        Self {
            shapes: shapes.into_iter().collect(),
        }
    }

    pub fn shapes(&self) -> &[ResponseShape] {
        &self.shapes
    }

    pub fn resolve(&self, raw: &[u8]) -> Result<ResolvedPlan, PlanDecodeError> {
        if is_blank(raw) {
            return Err(PlanDecodeError::empty_body());
        }

        let mut attempts = Vec::new();
        for candidate in unwrap_candidates(raw) {
            let value: Value = match serde_json::from_str(&candidate.text) {
                Ok(value) => value,
                Err(err) => {
                    attempts.push(DecodeDiagnostic {
                        envelope: candidate.envelope,
                        shape: None,
                        reason: format!("invalid JSON: {err}"),
                    });
                    continue;
                }
            };

            for &shape in &self.shapes {
                match shape.decode(&value) {
                    Ok(plan) => {
                        tracing::info!(
                            %shape,
                            envelope = %candidate.envelope,
                            stops = plan.charging_stop_count(),
                            "resolved route plan"
                        );
                        return Ok(ResolvedPlan {
                            plan,
                            shape,
                            envelope: candidate.envelope,
                        });
                    }
                    Err(reason) => {
                        tracing::debug!(%shape, envelope = %candidate.envelope, %reason, "shape rejected");
                        attempts.push(DecodeDiagnostic {
                            envelope: candidate.envelope,
                            shape: Some(shape),
                            reason,
                        });
                    }
                }
            }
        }

        Err(PlanDecodeError { attempts })
    }
}

/// Resolve a raw body with the default shape order.
pub fn resolve_route_plan(raw: &[u8]) -> Result<RoutePlan, PlanDecodeError> {
    RoutePlanResolver::default()
        .resolve(raw)
        .map(|resolved| resolved.plan)
}

// ========== SHAPE DECODERS ==========

fn decode_direct(value: &Value) -> Result<RoutePlan, String> {
    let root = match value {
        Value::Object(root) => root,
        Value::Array(_) => first_object(value)?,
        _ => return Err("not an object or array".to_string()),
    };

    let route = root.get("route").ok_or("missing `route`")?;
    let route = RouteInfo::deserialize(route).map_err(|err| format!("route: {err}"))?;
    let plan = lookup_object(root, aliases::CHARGING_PLAN).ok_or("missing `charging_plan`")?;
    let summary = root.get("summary").ok_or("missing `summary`")?;
    let summary = TripSummary::deserialize(summary).map_err(|err| format!("summary: {err}"))?;
    let statistics = root.get("statistics").ok_or("missing `statistics`")?;
    let statistics =
        RouteStatistics::deserialize(statistics).map_err(|err| format!("statistics: {err}"))?;

    let stops = collect_stops(plan, true);
    let fields = PlanLevelFields::from_json(Some(plan), None, None);
    Ok(assemble(route, stops, &fields, Some(summary), Some(statistics)))
}

fn decode_v2_array(value: &Value) -> Result<RoutePlan, String> {
    let root = first_object(value)?;

    let route = root
        .get("route")
        .and_then(Value::as_object)
        .ok_or("missing `route` object")?;
    let route = loose_route(route, true)?;
    let plan = root
        .get("charging_plan")
        .and_then(Value::as_object)
        .ok_or("missing `charging_plan` object")?;
    for key in ["selected_stations", "all_stations"] {
        if !plan.get(key).is_some_and(Value::is_array) {
            return Err(format!("charging_plan.{key} is not an array"));
        }
    }

    let stops = collect_stops(plan, false);
    let fields = PlanLevelFields::from_json(
        Some(plan),
        root.get("summary").and_then(Value::as_object),
        root.get("statistics").and_then(Value::as_object),
    );
    Ok(assemble(route, stops, &fields, None, None))
}

/// Plan totals the legacy shape always carries.
#[derive(Deserialize)]
struct LegacyTotals {
    needed: bool,
    total_charging_time: u32,
    total_detour_km: f64,
    total_energy_added_kwh: f64,
    can_complete_without_charging: bool,
}

fn decode_legacy_array(value: &Value) -> Result<RoutePlan, String> {
    let root = first_object(value)?;
    let response = root
        .get("response")
        .and_then(Value::as_object)
        .ok_or("missing `response` object")?;

    let route = response.get("route").ok_or("missing `response.route`")?;
    let route = RouteInfo::deserialize(route).map_err(|err| format!("route: {err}"))?;
    let plan = response
        .get("charging_plan")
        .ok_or("missing `response.charging_plan`")?;
    let totals = LegacyTotals::deserialize(plan).map_err(|err| format!("charging_plan: {err}"))?;
    let plan = plan
        .as_object()
        .ok_or("`response.charging_plan` is not an object")?;
    let summary = response.get("summary").ok_or("missing `response.summary`")?;
    let summary = TripSummary::deserialize(summary).map_err(|err| format!("summary: {err}"))?;
    let statistics = response
        .get("statistics")
        .ok_or("missing `response.statistics`")?;
    let statistics =
        RouteStatistics::deserialize(statistics).map_err(|err| format!("statistics: {err}"))?;

    let fields = PlanLevelFields {
        needed: Some(totals.needed),
        total_charging_time: Some(totals.total_charging_time),
        total_detour_km: Some(totals.total_detour_km),
        total_energy_added_kwh: Some(totals.total_energy_added_kwh),
        can_complete_without_charging: Some(totals.can_complete_without_charging),
        ..PlanLevelFields::default()
    };
    let stops = collect_stops(plan, true);
    Ok(assemble(route, stops, &fields, Some(summary), Some(statistics)))
}

fn decode_permissive(value: &Value) -> Result<RoutePlan, String> {
    let root = match value {
        Value::Object(root) => root,
        Value::Array(items) => items
            .iter()
            .find_map(Value::as_object)
            .ok_or("array holds no objects")?,
        _ => return Err("not an object or array".to_string()),
    };

    // The root itself first, then any response wrapper nested in it.
    let mut containers = vec![root];
    containers.extend(
        aliases::RESPONSE_WRAPPERS
            .iter()
            .filter_map(|path| aliases::get_path(root, *path))
            .filter_map(Value::as_object),
    );

    let route = containers
        .iter()
        .find_map(|container| lookup_object(*container, aliases::ROUTE))
        .ok_or("no `route` object found")?;
    let plan = containers
        .iter()
        .find_map(|container| lookup_object(*container, aliases::CHARGING_PLAN))
        .ok_or("no charging plan object found")?;
    let summary = containers
        .iter()
        .find_map(|container| lookup_object(*container, aliases::SUMMARY));
    let statistics = containers
        .iter()
        .find_map(|container| lookup_object(*container, aliases::STATISTICS));

    let route = loose_route(route, false)?;
    let stops = collect_stops(plan, false);
    let fields = PlanLevelFields::from_json(Some(plan), summary, statistics);
    Ok(assemble(route, stops, &fields, None, None))
}

// ========== HELPERS ==========

fn first_object(value: &Value) -> Result<&Map<String, Value>, String> {
    let items = value.as_array().ok_or("not an array")?;
    let first = items.first().ok_or("empty array")?;
    first
        .as_object()
        .ok_or_else(|| "first array element is not an object".to_string())
}

/// Route info with coerced fields; `require_distance` rejects a route without a usable distance.
fn loose_route(route: &Map<String, Value>, require_distance: bool) -> Result<RouteInfo, String> {
    let distance_km = lookup(route, aliases::DISTANCE_KM, as_f64);
    if require_distance && distance_km.is_none() {
        return Err("route.distance_km is not numeric".to_string());
    }
    let text = |paths: &[aliases::KeyPath]| {
        lookup(route, paths, as_str)
            .map(str::to_string)
            .unwrap_or_default()
    };

    Ok(RouteInfo {
        polyline: text(aliases::POLYLINE),
        distance_km: distance_km.unwrap_or(0.0),
        duration_minutes: lookup(route, aliases::DURATION_MINUTES, as_u32).unwrap_or(0),
        origin: text(aliases::ORIGIN),
        destination: text(aliases::DESTINATION),
    })
}

struct StopLists {
    selected: Vec<StationStop>,
    all: Vec<StationStop>,
}

/// Normalize both station lists of a charging plan.
///
/// A candidate also listed among the selected stops is marked selected. With
/// `honor_explicit_flag`, a candidate's own `is_selected` flag selects it too.
fn collect_stops(plan: &Map<String, Value>, honor_explicit_flag: bool) -> StopLists {
    let empty = Vec::new();
    let selected_raw = lookup_array(plan, aliases::SELECTED_STATIONS).unwrap_or(&empty);
    let all_raw = lookup_array(plan, aliases::ALL_STATIONS).unwrap_or(&empty);

    let selected = normalize_stations(selected_raw, |_| true);
    let selected_ids: HashSet<String> = selected.iter().map(StationStop::id).collect();

    let mut all = normalize_stations(all_raw, |raw| {
        honor_explicit_flag && explicit_selection(raw)
    });
    for stop in &mut all {
        stop.is_selected |= selected_ids.contains(&stop.id());
    }

    StopLists { selected, all }
}

fn assemble(
    route: RouteInfo,
    stops: StopLists,
    fields: &PlanLevelFields,
    summary: Option<TripSummary>,
    statistics: Option<RouteStatistics>,
) -> RoutePlan {
    let aggregates = derive_aggregates(&stops.selected, &stops.all, fields, route.duration_minutes);
    let summary = summary.unwrap_or_else(|| aggregates.summary(&route));
    let statistics = statistics.unwrap_or_else(|| aggregates.statistics());

    RoutePlan {
        geometry: decode_geometry(&route.polyline),
        charging_plan: aggregates.charging_plan(stops.selected, stops.all),
        route,
        summary,
        statistics,
    }
}

/// Decode the route line; a malformed polyline means no line, not a failure.
fn decode_geometry(polyline: &str) -> Vec<GeoPoint> {
    decode_polyline(polyline).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "route polyline could not be decoded");
        Vec::new()
    })
}
