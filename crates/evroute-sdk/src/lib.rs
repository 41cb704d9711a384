//! EVRoute SDK - webhook client
//!
//! Sends planning requests to the route planning webhook and hands the raw
//! responses to `evroute-core` for reconstruction.

pub mod client;
pub mod config;

pub use client::{ClientError, PlannerClient};
pub use config::ClientConfig;
pub use evroute_core::{RoutePlan, RoutePlanRequest, StationStop};
