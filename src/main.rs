//! Application entry point for the `turbine-monitor` service.
//!
//! This binary orchestrates the full startup sequence for the monitoring API:
//! - Loading `.env` and initializing structured logging (`logging`)
//! - Loading configuration from environment variables
//! - Opening the SQLite connection pool
//! - Creating the database schema if it does not exist
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving requests until Ctrl-C
//!
//! # Environment Variables
//! - `DATABASE_URL` (optional) – SQLite connection string
//! - `DB_POOL_MAX` (optional) – maximum number of DB connections (default: 5)
//! - `HTTP_PORT` (optional) – listen port (default: 8080)
//! - `UPLOAD_MAX_BYTES` (optional) – CSV upload size limit
//! - `RUST_LOG` / `AXUM_LOG_LEVEL`, `AXUM_SPAN_EVENTS`, `FORCE_COLOR` – see `logging`
use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;

use turbine_monitor::{config, logging, routes, schema};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    logging::init();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    tracing::info!("Attempting to open database: {}", cfg.db_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.db_pool_max)
        .connect(&cfg.db_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open database '{}': {}", cfg.db_url, e))?;

    tracing::info!("Successfully opened database");

    schema::create_schema(&pool).await?;

    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(pool.clone(), &cfg);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutdown signal received");
        })
        .await?;

    pool.close().await;
    Ok(())
}
