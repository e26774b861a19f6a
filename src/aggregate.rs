//! Per-turbine health statistics over `sensor_readings`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::AppError;
use crate::models::{HealthSummary, HealthSummaryRow};

// ---

/// Location reported for turbines that have readings but no metadata row.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Compute one summary per distinct `turbine_id` found in `sensor_readings`.
///
/// Fuel mass flow and both decay coefficients are reduced to avg/min/max over
/// their non-null values. Alert counts and metadata locations are left-joined,
/// so a turbine without alerts reports `0` and one without metadata reports
/// [`UNKNOWN_LOCATION`]. Turbines known only from metadata or alerts do not
/// appear. Readings without a `turbine_id` are not summarized.
pub async fn health_summary(pool: &SqlitePool) -> Result<Vec<HealthSummary>, AppError> {
    // ---
    let rows: Vec<HealthSummaryRow> = sqlx::query_as(
        r#"
        SELECT
            s.turbine_id                                AS turbine_id,
            COALESCE(m.location, ?)                     AS location,
            s.avg_mf                                    AS avg_mf,
            s.min_mf                                    AS min_mf,
            s.max_mf                                    AS max_mf,
            s.avg_comp_decay                            AS avg_comp_decay,
            s.min_comp_decay                            AS min_comp_decay,
            s.max_comp_decay                            AS max_comp_decay,
            s.avg_turbine_decay                         AS avg_turbine_decay,
            s.min_turbine_decay                         AS min_turbine_decay,
            s.max_turbine_decay                         AS max_turbine_decay,
            COALESCE(a.total_alerts, 0)                 AS total_alerts
        FROM (
            SELECT
                turbine_id,
                AVG(mf)                  AS avg_mf,
                MIN(mf)                  AS min_mf,
                MAX(mf)                  AS max_mf,
                AVG(decay_coeff_comp)    AS avg_comp_decay,
                MIN(decay_coeff_comp)    AS min_comp_decay,
                MAX(decay_coeff_comp)    AS max_comp_decay,
                AVG(decay_coeff_turbine) AS avg_turbine_decay,
                MIN(decay_coeff_turbine) AS min_turbine_decay,
                MAX(decay_coeff_turbine) AS max_turbine_decay
            FROM sensor_readings
            WHERE turbine_id IS NOT NULL
            GROUP BY turbine_id
        ) AS s
        LEFT JOIN (
            SELECT turbine_id, COUNT(alert_id) AS total_alerts
            FROM alerts
            GROUP BY turbine_id
        ) AS a ON a.turbine_id = s.turbine_id
        LEFT JOIN turbine_metadata AS m ON m.turbine_id = s.turbine_id
        ORDER BY s.turbine_id
        "#,
    )
    .bind(UNKNOWN_LOCATION)
    .fetch_all(pool)
    .await?;

    debug!("Health summary covers {} turbines", rows.len());

    Ok(rows.into_iter().map(HealthSummary::from).collect())
}
