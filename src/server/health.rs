//! Readiness and liveness endpoints
//!
//! - `/ready` - always 200, the body carries the readiness flag
//! - `/live` - 200 `ok` when every checker passes, 500 with the first
//!   failure otherwise

use crate::server::registry::CheckRegistry;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Body of the readiness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
}

impl IntoResponse for ReadinessResponse {
    /// The flag is the payload, the status is always 200
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Outcome of the liveness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LivenessResponse {
    Ok,
    Failed(String),
}

impl LivenessResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            LivenessResponse::Ok => StatusCode::OK,
            LivenessResponse::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LivenessResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            LivenessResponse::Ok => (status, "ok".to_string()),
            LivenessResponse::Failed(message) => (status, message),
        }
        .into_response()
    }
}

/// Query side of the registry, shared by the HTTP handlers
#[derive(Clone)]
pub struct HealthEndpoint {
    registry: CheckRegistry,
}

impl HealthEndpoint {
    pub fn new(registry: CheckRegistry) -> Self {
        Self { registry }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        ReadinessResponse {
            ready: self.registry.is_ready().await,
        }
    }

    /// Runs every registered checker; latency follows the slowest one
    pub async fn liveness(&self) -> LivenessResponse {
        match self.registry.run_all_checks().await {
            Ok(()) => {
                info!("Checkers passed");
                LivenessResponse::Ok
            }
            Err(e) => LivenessResponse::Failed(e.to_string()),
        }
    }
}

async fn ready(State(endpoint): State<HealthEndpoint>) -> ReadinessResponse {
    endpoint.readiness().await
}

async fn live(State(endpoint): State<HealthEndpoint>) -> LivenessResponse {
    endpoint.liveness().await
}

/// Build the router for the health endpoints
pub fn router(registry: CheckRegistry) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live))
        .with_state(HealthEndpoint::new(registry))
}
