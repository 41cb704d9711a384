//! HTTP client for the planning and nearby-stations webhooks.

use evroute_core::{
    resolve_nearby_stations, GeoPoint, NearbyRequest, PlanDecodeError, RequestError,
    ResolvedPlan, RoutePlan, RoutePlanRequest, RoutePlanResolver, StationStop,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::config::ClientConfig;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error(transparent)]
    Decode(#[from] PlanDecodeError),
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),
}

impl ClientError {
    /// Text suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(err) if err.is_timeout() => {
                "The route planner took too long to respond".to_string()
            }
            ClientError::Transport(_) => "Couldn't reach the route planner".to_string(),
            ClientError::Status { status, .. } => {
                format!("The route planner returned an error (HTTP {status})")
            }
            ClientError::Decode(_) => "Couldn't understand the route response".to_string(),
            ClientError::InvalidRequest(err) => format!("Invalid trip details: {err}"),
        }
    }
}

/// Client for the route planning webhooks.
pub struct PlannerClient {
    pub(crate) config: ClientConfig,
    pub(crate) resolver: RoutePlanResolver,
    pub(crate) client: Client,
}

impl PlannerClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_resolver(config, RoutePlanResolver::default())
    }

    pub fn with_resolver(
        config: ClientConfig,
        resolver: RoutePlanResolver,
    ) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            resolver,
            client,
        })
    }

    /// Request a route plan.
    pub async fn plan_route(&self, request: &RoutePlanRequest) -> Result<RoutePlan, ClientError> {
        self.plan_route_resolved(request)
            .await
            .map(|resolved| resolved.plan)
    }

    /// Request a route plan, keeping which shape and envelope matched.
    pub async fn plan_route_resolved(
        &self,
        request: &RoutePlanRequest,
    ) -> Result<ResolvedPlan, ClientError> {
        tracing::debug!(
            origin = %request.origin,
            destination = %request.destination,
            "requesting route plan"
        );
        let body = self.post(&self.config.plan_url, request).await?;

        self.resolver.resolve(&body).map_err(|err| {
            tracing::warn!(
                error = %err,
                body = %String::from_utf8_lossy(&body),
                "route response could not be decoded"
            );
            ClientError::Decode(err)
        })
    }

    /// Charging stations within `radius_km` of a point.
    pub async fn nearby_stations(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<StationStop>, ClientError> {
        let request = NearbyRequest::new(GeoPoint::new(latitude, longitude), radius_km)?;
        let body = self.post(&self.config.nearby_url, &request).await?;

        resolve_nearby_stations(&body).map_err(|err| {
            tracing::warn!(
                error = %err,
                body = %String::from_utf8_lossy(&body),
                "nearby response could not be decoded"
            );
            ClientError::Decode(err)
        })
    }

    /// POST a JSON body and return the raw response bytes of a 2xx reply.
    async fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<Vec<u8>, ClientError> {
        let mut builder = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(payload);
        if let Some(token) = self.config.auth_token.as_deref() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %url, "webhook returned error status");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
