//! `GET /health-summary`: per-turbine fuel and decay statistics with alert
//! counts, one record per turbine that has sensor readings.

use axum::{extract::State, routing::get, Json, Router};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::{aggregate, AppError, HealthSummary};

// ---

pub fn router() -> Router<SqlitePool> {
    // ---
    Router::new().route("/health-summary", get(handler))
}

/// Handle `GET /health-summary`: one record per turbine with sensor data.
async fn handler(State(pool): State<SqlitePool>) -> Result<Json<Vec<HealthSummary>>, AppError> {
    // ---
    info!("GET /health-summary");

    let summaries = aggregate::health_summary(&pool).await?;

    debug!("GET /health-summary - Returning {} records", summaries.len());
    Ok(Json(summaries))
}
