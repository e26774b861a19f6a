//! Per-turbine reading lookups and alert creation.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::AppError;
use crate::models::{AnomalyAlertRequest, AnomalyAlertResponse, SensorMetrics, SensorReadingRow};

// ---

/// Number of readings returned by [`recent_readings`].
pub const RECENT_READINGS_LIMIT: i64 = 10;

/// Textual encoding of server-assigned alert timestamps (UTC, no offset).
pub const ALERT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Return the newest readings for `turbine_id`, newest first.
///
/// Ordering compares the stored timestamp text lexicographically. Fails with
/// [`AppError::NotFound`] when the turbine has no readings at all.
pub async fn recent_readings(
    pool: &SqlitePool,
    turbine_id: i64,
) -> Result<Vec<SensorMetrics>, AppError> {
    // ---
    let rows: Vec<SensorReadingRow> = sqlx::query_as(
        r#"
        SELECT *
        FROM sensor_readings
        WHERE turbine_id = ?
        ORDER BY timestamp DESC
        LIMIT ?
        "#,
    )
    .bind(turbine_id)
    .bind(RECENT_READINGS_LIMIT)
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Err(AppError::NotFound { turbine_id });
    }

    debug!("Found {} readings for turbine {}", rows.len(), turbine_id);
    Ok(rows.into_iter().map(SensorMetrics::from).collect())
}

/// Persist a client-reported alert, stamped with the current UTC time.
pub async fn create_alert(
    pool: &SqlitePool,
    request: AnomalyAlertRequest,
) -> Result<AnomalyAlertResponse, AppError> {
    // ---
    let timestamp = Utc::now().format(ALERT_TIMESTAMP_FORMAT).to_string();
    let alert = request.to_new_alert(&timestamp);

    let result = sqlx::query(
        r#"
        INSERT INTO alerts (
            turbine_id, timestamp, metric, alert_type, severity,
            actual_value, threshold_value, description
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(alert.turbine_id)
    .bind(&alert.timestamp)
    .bind(&alert.metric)
    .bind(&alert.alert_type)
    .bind(&alert.severity)
    .bind(alert.actual_value)
    .bind(alert.threshold_value)
    .bind(&alert.description)
    .execute(pool)
    .await?;

    let alert_id = result.last_insert_rowid();
    debug!("Stored alert {} for turbine {}", alert_id, request.turbine_id);

    Ok(AnomalyAlertResponse::created(alert_id, timestamp, request))
}
