//! `POST /anomaly-alerts`: records a client-reported anomaly alert.

use axum::{extract::State, routing::post, Json, Router};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::{queries, AnomalyAlertRequest, AnomalyAlertResponse, AppError};

// ---

pub fn router() -> Router<SqlitePool> {
    // ---
    Router::new().route("/anomaly-alerts", post(handler))
}

/// Handle `POST /anomaly-alerts`.
///
/// Missing or mistyped fields are rejected by the `Json` extractor with 422
/// before the handler runs.
async fn handler(
    State(pool): State<SqlitePool>,
    Json(request): Json<AnomalyAlertRequest>,
) -> Result<Json<AnomalyAlertResponse>, AppError> {
    // ---
    info!(
        "POST /anomaly-alerts - turbine={} metric={} severity={}",
        request.turbine_id, request.metric, request.severity
    );

    let created = queries::create_alert(&pool, request).await?;

    debug!("POST /anomaly-alerts - Created alert {}", created.alert_id);
    Ok(Json(created))
}
