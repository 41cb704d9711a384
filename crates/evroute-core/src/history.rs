//! Saved route history.
//!
//! Entries are keyed by save time, most recent first. The list is bounded;
//! recording past capacity evicts the oldest entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::RoutePlan;

pub const HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRoute {
    pub id: Uuid,
    pub saved_at: DateTime<Utc>,
    pub origin: String,
    pub destination: String,
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub charging_stops: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<RoutePlan>,
}

impl SavedRoute {
    pub fn from_plan(plan: RoutePlan, vehicle: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            saved_at: now,
            origin: plan.route.origin.clone(),
            destination: plan.route.destination.clone(),
            distance_km: plan.route.distance_km,
            duration_minutes: plan.summary.estimated_total_duration,
            charging_stops: plan.charging_stop_count(),
            vehicle,
            plan: Some(plan),
        }
    }
}

/// Bounded, most-recent-first list of saved routes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteHistory {
    entries: Vec<SavedRoute>,
}

impl RouteHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `route` at the front, evicting the oldest entries past capacity.
    pub fn record(&mut self, route: SavedRoute) {
        self.entries.insert(0, route);
        if self.entries.len() > HISTORY_CAPACITY {
            let evicted = self.entries.len() - HISTORY_CAPACITY;
            self.entries.truncate(HISTORY_CAPACITY);
            tracing::debug!(evicted, "route history trimmed");
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<SavedRoute> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &SavedRoute> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&SavedRoute> {
        self.entries.first()
    }
}
