// src/routes/health.rs
//! Liveness endpoint for the turbine monitoring service.
//!
//! `/health` lets container orchestrators and CI pipelines check that the
//! process is up and answering HTTP. It is a sibling module in the `routes`
//! directory and follows the Explicit Module Boundary Pattern (EMBP): the
//! gateway (`mod.rs`) merges the subrouter exported here.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
    version: &'static str,
}

/// Handle `GET /health`.
///
/// Never touches the database; `/health-summary` is the data endpoint.
async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Subrouter with the `/health` route, generic over the gateway state.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(liveness))
}
