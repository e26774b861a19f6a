//! `GET /sensor-metrics/{turbine_id}`: the most recent readings of one turbine.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::{queries, AppError, SensorMetrics};

// ---

pub fn router() -> Router<SqlitePool> {
    // ---
    Router::new().route("/sensor-metrics/{turbine_id}", get(handler))
}

/// Handle `GET /sensor-metrics/{turbine_id}`: the latest readings, newest first.
async fn handler(
    Path(turbine_id): Path<i64>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<SensorMetrics>>, AppError> {
    // ---
    info!("GET /sensor-metrics/{}", turbine_id);

    let readings = queries::recent_readings(&pool, turbine_id).await?;

    debug!(
        "GET /sensor-metrics/{} - Returning {} readings",
        turbine_id,
        readings.len()
    );
    Ok(Json(readings))
}
