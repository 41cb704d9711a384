//! Client configuration from environment.

use std::env;
use std::time::Duration;

pub const DEFAULT_PLAN_URL: &str = "http://localhost:5678/webhook/plan-route";
pub const DEFAULT_NEARBY_URL: &str = "http://localhost:5678/webhook/nearby-stations";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub plan_url: String,
    pub nearby_url: String,
    pub timeout: Duration,
    pub auth_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PLAN_URL, DEFAULT_NEARBY_URL)
    }
}

impl ClientConfig {
    pub fn new(plan_url: impl Into<String>, nearby_url: impl Into<String>) -> Self {
        Self {
            plan_url: plan_url.into(),
            nearby_url: nearby_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            auth_token: None,
        }
    }

    pub fn from_env() -> Self {
        Self {
            plan_url: env::var("EVROUTE_PLAN_URL")
                .unwrap_or_else(|_| DEFAULT_PLAN_URL.to_string()),
            nearby_url: env::var("EVROUTE_NEARBY_URL")
                .unwrap_or_else(|_| DEFAULT_NEARBY_URL.to_string()),
            timeout: Duration::from_secs(
                env::var("EVROUTE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            auth_token: env::var("EVROUTE_AUTH_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|token| !token.trim().is_empty());
        self
    }
}
