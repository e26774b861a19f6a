//! Turbine monitoring service: bulk CSV ingestion of sensor readings, turbine
//! metadata and alerts into SQLite, per-turbine health summaries, recent
//! readings lookups and client-reported anomaly alerts over HTTP.
//!
//! Module layout follows the Explicit Module Boundary Pattern (EMBP): route
//! modules only import from this gateway, never from each other.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod queries;
pub mod routes;
pub mod schema;

pub use config::Config;
pub use error::{AppError, ParseError, RowError};
pub use ingest::TargetTable;
pub use models::{
    AnomalyAlertRequest, AnomalyAlertResponse, HealthSummary, SensorMetrics, UploadResponse,
};
