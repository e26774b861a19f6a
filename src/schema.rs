//! Database schema management for `turbine-monitor`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::SqlitePool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `sensor_readings`, `turbine_metadata` and `alerts` tables. Safe
/// to call on every startup; no-op if objects already exist. No foreign key
/// ties `turbine_id` columns to `turbine_metadata`.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // One row per sensor sample, ids always assigned by the store
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sensor_readings (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp           TEXT,
            lp                  REAL,
            v                   REAL,
            gtt                 REAL,
            gtn                 REAL,
            ggn                 REAL,
            ts                  REAL,
            tp                  REAL,
            t48                 REAL,
            t1                  REAL,
            t2                  REAL,
            p48                 REAL,
            p1                  REAL,
            p2                  REAL,
            pexh                REAL,
            tic                 REAL,
            mf                  REAL,
            decay_coeff_comp    REAL,
            decay_coeff_turbine REAL,
            turbine_id          INTEGER
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Static turbine data, keyed by the caller supplied id
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS turbine_metadata (
            turbine_id   INTEGER PRIMARY KEY,
            location     TEXT,
            manufacturer TEXT,
            model        TEXT,
            install_date TEXT
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alerts (
            alert_id        INTEGER PRIMARY KEY AUTOINCREMENT,
            turbine_id      INTEGER,
            timestamp       TEXT,
            metric          TEXT,
            alert_type      TEXT,
            severity        TEXT,
            actual_value    REAL,
            threshold_value REAL,
            description     TEXT
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Indexes for the per-turbine lookups
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sensor_readings_turbine_id
            ON sensor_readings (turbine_id);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sensor_readings_turbine_ts
            ON sensor_readings (turbine_id, timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_alerts_turbine_id
            ON alerts (turbine_id);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
