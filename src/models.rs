//! Data models for the turbine monitoring service.
//!
//! Persistence rows (`*Row`, read with `sqlx::FromRow`) and write records
//! (`New*`, produced by ingestion) are kept apart from the JSON schemas served
//! by the routes. The mapping functions at the bottom of each section are the
//! only place where one becomes the other.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---

/// The floating point sensor channels of `sensor_readings`, in column order.
pub const SENSOR_CHANNELS: [&str; 18] = [
    "lp",
    "v",
    "gtt",
    "gtn",
    "ggn",
    "ts",
    "tp",
    "t48",
    "t1",
    "t2",
    "p48",
    "p1",
    "p2",
    "pexh",
    "tic",
    "mf",
    "decay_coeff_comp",
    "decay_coeff_turbine",
];

// --- sensor readings

/// A stored row of `sensor_readings`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SensorReadingRow {
    // ---
    pub id: i64,
    pub timestamp: Option<String>,
    pub lp: Option<f64>,
    pub v: Option<f64>,
    pub gtt: Option<f64>,
    pub gtn: Option<f64>,
    pub ggn: Option<f64>,
    pub ts: Option<f64>,
    pub tp: Option<f64>,
    pub t48: Option<f64>,
    pub t1: Option<f64>,
    pub t2: Option<f64>,
    pub p48: Option<f64>,
    pub p1: Option<f64>,
    pub p2: Option<f64>,
    pub pexh: Option<f64>,
    pub tic: Option<f64>,
    pub mf: Option<f64>,
    pub decay_coeff_comp: Option<f64>,
    pub decay_coeff_turbine: Option<f64>,
    pub turbine_id: Option<i64>,
}

/// A sensor reading about to be bulk inserted. The id is left to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSensorReading {
    // ---
    pub timestamp: Option<String>,
    /// Values in [`SENSOR_CHANNELS`] order.
    pub channels: [Option<f64>; 18],
    pub turbine_id: Option<i64>,
}

/// Sensor reading as returned by `GET /sensor-metrics/{turbine_id}`.
#[derive(Debug, Serialize)]
pub struct SensorMetrics {
    // ---
    pub id: i64,
    pub timestamp: Option<String>,
    pub lp: Option<f64>,
    pub v: Option<f64>,
    pub gtt: Option<f64>,
    pub gtn: Option<f64>,
    pub ggn: Option<f64>,
    pub ts: Option<f64>,
    pub tp: Option<f64>,
    pub t48: Option<f64>,
    pub t1: Option<f64>,
    pub t2: Option<f64>,
    pub p48: Option<f64>,
    pub p1: Option<f64>,
    pub p2: Option<f64>,
    pub pexh: Option<f64>,
    pub tic: Option<f64>,
    pub mf: Option<f64>,
    pub decay_coeff_comp: Option<f64>,
    pub decay_coeff_turbine: Option<f64>,
    pub turbine_id: Option<i64>,
}

impl From<SensorReadingRow> for SensorMetrics {
    fn from(row: SensorReadingRow) -> Self {
        // ---
        SensorMetrics {
            id: row.id,
            timestamp: row.timestamp,
            lp: row.lp,
            v: row.v,
            gtt: row.gtt,
            gtn: row.gtn,
            ggn: row.ggn,
            ts: row.ts,
            tp: row.tp,
            t48: row.t48,
            t1: row.t1,
            t2: row.t2,
            p48: row.p48,
            p1: row.p1,
            p2: row.p2,
            pexh: row.pexh,
            tic: row.tic,
            mf: row.mf,
            decay_coeff_comp: row.decay_coeff_comp,
            decay_coeff_turbine: row.decay_coeff_turbine,
            turbine_id: row.turbine_id,
        }
    }
}

// --- turbine metadata

/// A `turbine_metadata` row to be merged on `turbine_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct TurbineMetadataRecord {
    // ---
    pub turbine_id: i64,
    pub location: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub install_date: Option<NaiveDate>,
}

// --- alerts

/// An alert about to be inserted. The `alert_id` is left to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    // ---
    pub turbine_id: Option<i64>,
    pub timestamp: Option<String>,
    pub metric: Option<String>,
    pub alert_type: Option<String>,
    pub severity: Option<String>,
    pub actual_value: Option<f64>,
    pub threshold_value: Option<f64>,
    pub description: Option<String>,
}

/// Body of `POST /anomaly-alerts`. Every field is required.
#[derive(Debug, Clone, Deserialize)]
pub struct AnomalyAlertRequest {
    // ---
    pub turbine_id: i64,
    pub metric: String,
    pub alert_type: String,
    pub severity: String,
    pub actual_value: f64,
    pub threshold_value: f64,
    pub description: String,
}

/// Response of `POST /anomaly-alerts`.
#[derive(Debug, Serialize)]
pub struct AnomalyAlertResponse {
    // ---
    pub alert_id: i64,
    pub turbine_id: i64,
    pub timestamp: String,
    pub metric: String,
    pub alert_type: String,
    pub severity: String,
    pub actual_value: f64,
    pub threshold_value: f64,
    pub description: String,
    pub message: String,
}

impl AnomalyAlertRequest {
    /// Stamp the request with its server-side creation time.
    pub fn to_new_alert(&self, timestamp: &str) -> NewAlert {
        // ---
        NewAlert {
            turbine_id: Some(self.turbine_id),
            timestamp: Some(timestamp.to_string()),
            metric: Some(self.metric.clone()),
            alert_type: Some(self.alert_type.clone()),
            severity: Some(self.severity.clone()),
            actual_value: Some(self.actual_value),
            threshold_value: Some(self.threshold_value),
            description: Some(self.description.clone()),
        }
    }
}

impl AnomalyAlertResponse {
    /// Build the confirmation for an alert persisted under `alert_id`.
    pub fn created(alert_id: i64, timestamp: String, request: AnomalyAlertRequest) -> Self {
        // ---
        let message = format!(
            "Alert for turbine {} logged successfully.",
            request.turbine_id
        );

        AnomalyAlertResponse {
            alert_id,
            turbine_id: request.turbine_id,
            timestamp,
            metric: request.metric,
            alert_type: request.alert_type,
            severity: request.severity,
            actual_value: request.actual_value,
            threshold_value: request.threshold_value,
            description: request.description,
            message,
        }
    }
}

// --- health summary

/// One grouped row of the health summary query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HealthSummaryRow {
    // ---
    pub turbine_id: i64,
    pub location: String,
    pub avg_mf: Option<f64>,
    pub min_mf: Option<f64>,
    pub max_mf: Option<f64>,
    pub avg_comp_decay: Option<f64>,
    pub min_comp_decay: Option<f64>,
    pub max_comp_decay: Option<f64>,
    pub avg_turbine_decay: Option<f64>,
    pub min_turbine_decay: Option<f64>,
    pub max_turbine_decay: Option<f64>,
    pub total_alerts: i64,
}

/// Per-turbine record served by `GET /health-summary`.
#[derive(Debug, Serialize)]
pub struct HealthSummary {
    // ---
    pub turbine_id: i64,
    pub location: String,
    pub avg_fuel_usage: Option<f64>,
    pub min_fuel_usage: Option<f64>,
    pub max_fuel_usage: Option<f64>,
    pub avg_comp_decay: Option<f64>,
    pub min_comp_decay: Option<f64>,
    pub max_comp_decay: Option<f64>,
    pub avg_turbine_decay: Option<f64>,
    pub min_turbine_decay: Option<f64>,
    pub max_turbine_decay: Option<f64>,
    pub total_alerts: i64,
}

impl From<HealthSummaryRow> for HealthSummary {
    fn from(row: HealthSummaryRow) -> Self {
        // ---
        HealthSummary {
            turbine_id: row.turbine_id,
            location: row.location,
            avg_fuel_usage: row.avg_mf,
            min_fuel_usage: row.min_mf,
            max_fuel_usage: row.max_mf,
            avg_comp_decay: row.avg_comp_decay,
            min_comp_decay: row.min_comp_decay,
            max_comp_decay: row.max_comp_decay,
            avg_turbine_decay: row.avg_turbine_decay,
            min_turbine_decay: row.min_turbine_decay,
            max_turbine_decay: row.max_turbine_decay,
            total_alerts: row.total_alerts,
        }
    }
}

// --- uploads

/// Response of `POST /uploadfile/`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    // ---
    pub message: String,
    pub rows: u64,
}

impl UploadResponse {
    pub fn new(rows: u64, table: &str) -> Self {
        // ---
        UploadResponse {
            message: format!("Inserted/updated {rows} rows into {table} table."),
            rows,
        }
    }
}
