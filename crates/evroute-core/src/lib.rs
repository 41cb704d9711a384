pub mod aggregates;
pub mod aliases;
pub mod coerce;
pub mod envelope;
pub mod history;
pub mod models;
pub mod nearby;
pub mod polyline;
pub mod request;
pub mod resolver;
pub mod station;

pub use aggregates::{derive_aggregates, Aggregates, PlanLevelFields};
pub use envelope::{unwrap_candidates, Candidate, Envelope, MAX_UNWRAP_DEPTH};
pub use history::{RouteHistory, SavedRoute, HISTORY_CAPACITY};
pub use models::{
    ChargingPlan, GeoPoint, RouteInfo, RoutePlan, RouteStatistics, StationStop, TripSummary,
};
pub use nearby::resolve_nearby_stations;
pub use polyline::{decode_polyline, GeometryDecodeError};
pub use request::{
    format_lat_lng, parse_lat_lng, ConnectorType, NearbyRequest, RequestError, RoutePlanRequest,
    RoutePlanRequestBuilder, Vehicle,
};
pub use resolver::{
    resolve_route_plan, DecodeDiagnostic, PlanDecodeError, ResolvedPlan, ResponseShape,
    RoutePlanResolver, SHAPE_ORDER,
};
pub use station::{normalize_station, normalize_stations, selection_flag};
