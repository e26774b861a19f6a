//! Route gateway: every endpoint lives in a sibling module and is merged here,
//! so `main.rs` only ever sees [`router`].

use axum::Router;
use sqlx::SqlitePool;

use crate::Config;

mod anomaly_alerts;
mod health;
mod health_summary;
mod sensor_metrics;
mod upload;

// ---

pub fn router(pool: SqlitePool, config: &Config) -> Router {
    // ---
    Router::new()
        .merge(health_summary::router())
        .merge(sensor_metrics::router())
        .merge(anomaly_alerts::router())
        .merge(upload::router(config.upload_max_bytes))
        .merge(health::router())
        .with_state(pool)
}
