//! Bulk CSV ingestion into the three turbine tables.
//!
//! Loading runs in two phases. Parsing turns the uploaded bytes into a
//! [`CsvTable`] of text cells and normalizes the `install_date` column; any
//! failure here is a [`ParseError`] and the store is never touched. The write
//! phase coerces cells into typed records and writes them inside a single
//! transaction, so a bad row rolls back the whole upload.
//!
//! Write semantics per table:
//! - `turbine_metadata`: one upsert per row keyed on `turbine_id`, later rows win
//! - `sensor_readings` / `alerts`: multi-row inserts, ids assigned by the store

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{AppError, ParseError, RowError};
use crate::models::{NewAlert, NewSensorReading, TurbineMetadataRecord, SENSOR_CHANNELS};

// ---

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column coerced to a calendar date whenever an upload carries it.
const DATE_COLUMN: &str = "install_date";

/// Cell values read as NULL, on top of the empty string.
const NULL_MARKERS: [&str; 9] = ["NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "<NA>"];

/// Rows per multi-row INSERT, keeps every statement under SQLite's bind limit.
const BULK_CHUNK_ROWS: usize = 500;

const ALERT_COLUMNS: [&str; 8] = [
    "turbine_id",
    "timestamp",
    "metric",
    "alert_type",
    "severity",
    "actual_value",
    "threshold_value",
    "description",
];

/// The tables an upload may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetTable {
    TurbineMetadata,
    SensorReadings,
    Alerts,
}

impl TargetTable {
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            TargetTable::TurbineMetadata => "turbine_metadata",
            TargetTable::SensorReadings => "sensor_readings",
            TargetTable::Alerts => "alerts",
        }
    }
}

impl fmt::Display for TargetTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetTable {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s {
            "turbine_metadata" => Ok(TargetTable::TurbineMetadata),
            "sensor_readings" => Ok(TargetTable::SensorReadings),
            "alerts" => Ok(TargetTable::Alerts),
            other => Err(AppError::InvalidTarget(other.to_string())),
        }
    }
}

/// Parse `bytes` as CSV and load every row into `target`.
///
/// Returns the number of rows inserted (or merged, for `turbine_metadata`).
/// Parse failures happen before any write; write failures roll back the whole
/// call and surface as [`AppError::Insertion`].
pub async fn load(pool: &SqlitePool, target: TargetTable, bytes: &[u8]) -> Result<u64, AppError> {
    // ---
    let mut table = CsvTable::parse(bytes)?;
    table.normalize_dates(DATE_COLUMN)?;

    debug!(
        "Parsed upload for {}: {} columns, {} rows",
        target,
        table.headers.len(),
        table.len()
    );

    let count = match target {
        TargetTable::TurbineMetadata => merge_metadata(pool, &table).await?,
        TargetTable::SensorReadings => insert_readings(pool, &table).await?,
        TargetTable::Alerts => insert_alerts(pool, &table).await?,
    };

    info!("Loaded {} rows into {}", count, target);
    Ok(count)
}

// --- parsing

/// A parsed CSV upload: header names plus text cells per data row.
#[derive(Debug)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<CsvRow>,
}

#[derive(Debug)]
struct CsvRow {
    /// 1-based line in the uploaded file, for error messages.
    line: u64,
    cells: Vec<String>,
}

/// A named column and its position in the upload, if present.
#[derive(Debug, Clone, Copy)]
struct Column {
    name: &'static str,
    idx: Option<usize>,
}

impl CsvTable {
    /// Read a header row and data rows. Ragged rows and invalid UTF-8 fail.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        // ---
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(ParseError::Empty);
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(rows.len() as u64 + 2);
            rows.push(CsvRow {
                line,
                cells: record.iter().map(str::to_string).collect(),
            });
        }

        Ok(CsvTable { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, name: &'static str) -> Column {
        // ---
        Column {
            name,
            idx: self.headers.iter().position(|h| h == name),
        }
    }

    fn require(&self, name: &'static str) -> Result<Column, RowError> {
        // ---
        let column = self.column(name);
        match column.idx {
            Some(_) => Ok(column),
            None => Err(RowError::MissingColumn(name)),
        }
    }

    /// Headers that none of `known` claims; these are ignored on load.
    fn unmapped<'a>(&'a self, known: &[&str]) -> Vec<&'a str> {
        // ---
        self.headers
            .iter()
            .map(String::as_str)
            .filter(|h| !known.contains(h))
            .collect()
    }

    /// Rewrite every non-empty cell of `name` as `YYYY-MM-DD`.
    fn normalize_dates(&mut self, name: &'static str) -> Result<(), ParseError> {
        // ---
        let Some(idx) = self.column(name).idx else {
            return Ok(());
        };

        for row in &mut self.rows {
            let Some(cell) = row.cells.get_mut(idx) else {
                continue;
            };
            if is_null(cell) {
                cell.clear();
                continue;
            }
            let date = parse_date(cell).ok_or_else(|| ParseError::InvalidDate {
                line: row.line,
                column: name,
                value: cell.clone(),
            })?;
            *cell = date.format("%Y-%m-%d").to_string();
        }

        Ok(())
    }
}

/// Parse an `install_date` cell. Surrounding whitespace is ignored.
///
/// Accepted forms, tried in this order:
/// - `YYYY-MM-DD`, `YYYY/MM/DD`, `MM/DD/YYYY`
/// - `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DDTHH:MM:SS`, optionally with
///   fractional seconds; the time is dropped
/// - RFC 3339 with an offset, reduced to the date in that offset
///
/// Anything else (compact `YYYYMMDD`, month names, day-first dates) returns
/// `None`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    // ---
    let value = value.trim();

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }

    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

fn is_null(cell: &str) -> bool {
    // ---
    let cell = cell.trim();
    cell.is_empty() || NULL_MARKERS.contains(&cell)
}

// --- cell coercion

impl CsvRow {
    fn cell(&self, column: &Column) -> Option<&str> {
        // ---
        column
            .idx
            .and_then(|i| self.cells.get(i))
            .map(String::as_str)
            .filter(|s| !is_null(s))
    }

    fn text(&self, column: &Column) -> Option<String> {
        self.cell(column).map(str::to_string)
    }

    fn invalid(&self, column: &Column, value: &str, expected: &'static str) -> RowError {
        // ---
        RowError::InvalidValue {
            line: self.line,
            column: column.name.to_string(),
            value: value.to_string(),
            expected,
        }
    }

    fn real(&self, column: &Column) -> Result<Option<f64>, RowError> {
        // ---
        let Some(raw) = self.cell(column) else {
            return Ok(None);
        };
        raw.trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| self.invalid(column, raw, "numeric"))
    }

    /// Integers, or floats with no fractional part (`"3.0"`).
    fn integer(&self, column: &Column) -> Result<Option<i64>, RowError> {
        // ---
        let Some(raw) = self.cell(column) else {
            return Ok(None);
        };
        let trimmed = raw.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Ok(Some(value));
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Ok(Some(f as i64))
            }
            _ => Err(self.invalid(column, raw, "integer")),
        }
    }

    fn date(&self, column: &Column) -> Result<Option<NaiveDate>, RowError> {
        // ---
        let Some(raw) = self.cell(column) else {
            return Ok(None);
        };
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| self.invalid(column, raw, "date"))
    }
}

// --- turbine_metadata

fn metadata_records(table: &CsvTable) -> Result<Vec<TurbineMetadataRecord>, RowError> {
    // ---
    let turbine_id = table.require("turbine_id")?;
    let location = table.require("location")?;
    let manufacturer = table.require("manufacturer")?;
    let model = table.require("model")?;
    let install_date = table.require(DATE_COLUMN)?;

    table
        .rows
        .iter()
        .map(|row| -> Result<TurbineMetadataRecord, RowError> {
            let id = row.integer(&turbine_id)?.ok_or(RowError::MissingValue {
                line: row.line,
                column: turbine_id.name,
            })?;
            Ok(TurbineMetadataRecord {
                turbine_id: id,
                location: row.text(&location),
                manufacturer: row.text(&manufacturer),
                model: row.text(&model),
                install_date: row.date(&install_date)?,
            })
        })
        .collect()
}

async fn merge_metadata(pool: &SqlitePool, table: &CsvTable) -> Result<u64, RowError> {
    // ---
    let records = metadata_records(table)?;

    let ignored = table.unmapped(&[
        "turbine_id",
        "location",
        "manufacturer",
        "model",
        DATE_COLUMN,
    ]);
    if !ignored.is_empty() {
        debug!("turbine_metadata upload: ignoring columns {:?}", ignored);
    }

    let mut tx = pool.begin().await?;

    for record in &records {
        sqlx::query(
            r#"
            INSERT INTO turbine_metadata (turbine_id, location, manufacturer, model, install_date)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (turbine_id) DO UPDATE SET
                location     = excluded.location,
                manufacturer = excluded.manufacturer,
                model        = excluded.model,
                install_date = excluded.install_date
            "#,
        )
        .bind(record.turbine_id)
        .bind(&record.location)
        .bind(&record.manufacturer)
        .bind(&record.model)
        .bind(record.install_date)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(records.len() as u64)
}

// --- sensor_readings

fn reading_records(table: &CsvTable) -> Result<Vec<NewSensorReading>, RowError> {
    // ---
    let timestamp = table.column("timestamp");
    let turbine_id = table.column("turbine_id");
    let channels = SENSOR_CHANNELS.map(|name| table.column(name));

    table
        .rows
        .iter()
        .map(|row| -> Result<NewSensorReading, RowError> {
            let mut values = [None; 18];
            for (slot, column) in values.iter_mut().zip(&channels) {
                *slot = row.real(column)?;
            }
            Ok(NewSensorReading {
                timestamp: row.text(&timestamp),
                channels: values,
                turbine_id: row.integer(&turbine_id)?,
            })
        })
        .collect()
}

async fn insert_readings(pool: &SqlitePool, table: &CsvTable) -> Result<u64, RowError> {
    // ---
    let mut known = vec!["timestamp", "turbine_id"];
    known.extend(SENSOR_CHANNELS);
    let ignored = table.unmapped(&known);
    if !ignored.is_empty() {
        // an uploaded `id` column lands here; the store assigns fresh ids
        debug!("sensor_readings upload: ignoring columns {:?}", ignored);
    }

    let records = reading_records(table)?;
    let insert = format!(
        "INSERT INTO sensor_readings (timestamp, {}, turbine_id) ",
        SENSOR_CHANNELS.join(", ")
    );

    let mut tx = pool.begin().await?;

    for chunk in records.chunks(BULK_CHUNK_ROWS) {
        let mut builder = QueryBuilder::<Sqlite>::new(&insert);
        builder.push_values(chunk, |mut row, reading| {
            row.push_bind(reading.timestamp.clone());
            for value in reading.channels {
                row.push_bind(value);
            }
            row.push_bind(reading.turbine_id);
        });
        builder.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(records.len() as u64)
}

// --- alerts

fn alert_records(table: &CsvTable) -> Result<Vec<NewAlert>, RowError> {
    // ---
    let [turbine_id, timestamp, metric, alert_type, severity, actual_value, threshold_value, description] =
        ALERT_COLUMNS.map(|name| table.column(name));

    table
        .rows
        .iter()
        .map(|row| -> Result<NewAlert, RowError> {
            Ok(NewAlert {
                turbine_id: row.integer(&turbine_id)?,
                timestamp: row.text(&timestamp),
                metric: row.text(&metric),
                alert_type: row.text(&alert_type),
                severity: row.text(&severity),
                actual_value: row.real(&actual_value)?,
                threshold_value: row.real(&threshold_value)?,
                description: row.text(&description),
            })
        })
        .collect()
}

async fn insert_alerts(pool: &SqlitePool, table: &CsvTable) -> Result<u64, RowError> {
    // ---
    let ignored = table.unmapped(&ALERT_COLUMNS);
    if !ignored.is_empty() {
        // an uploaded `alert_id` column lands here
        debug!("alerts upload: ignoring columns {:?}", ignored);
    }

    let records = alert_records(table)?;
    let insert = format!("INSERT INTO alerts ({}) ", ALERT_COLUMNS.join(", "));

    let mut tx = pool.begin().await?;

    for chunk in records.chunks(BULK_CHUNK_ROWS) {
        let mut builder = QueryBuilder::<Sqlite>::new(&insert);
        builder.push_values(chunk, |mut row, alert| {
            row.push_bind(alert.turbine_id)
                .push_bind(alert.timestamp.clone())
                .push_bind(alert.metric.clone())
                .push_bind(alert.alert_type.clone())
                .push_bind(alert.severity.clone())
                .push_bind(alert.actual_value)
                .push_bind(alert.threshold_value)
                .push_bind(alert.description.clone());
        });
        builder.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(records.len() as u64)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_target_table_names() {
        // ---
        for name in ["turbine_metadata", "sensor_readings", "alerts"] {
            let target: TargetTable = name.parse().unwrap();
            assert_eq!(target.as_str(), name);
        }

        let err = "Alerts".parse::<TargetTable>().unwrap_err();
        assert!(matches!(err, AppError::InvalidTarget(ref t) if t == "Alerts"));
    }

    #[test]
    fn test_parse_reads_headers_and_rows() {
        // ---
        let table = CsvTable::parse(b"\xEF\xBB\xBFid, timestamp ,mf\n1,2025-01-01,0.5\n2,2025-01-02,\n")
            .unwrap();

        assert_eq!(table.headers, vec!["id", "timestamp", "mf"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].line, 3);
        assert_eq!(table.rows[1].cells, vec!["2", "2025-01-02", ""]);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        // ---
        let err = CsvTable::parse(b"a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, ParseError::Csv(_)));

        let err = CsvTable::parse(b"a,b\n\xFF\xFE,1\n").unwrap_err();
        assert!(matches!(err, ParseError::Csv(_)));

        let err = CsvTable::parse(b"").unwrap_err();
        assert!(matches!(err, ParseError::Empty));
    }

    #[test]
    fn test_headers_without_rows_is_empty_table() {
        // ---
        let table = CsvTable::parse(b"turbine_id,location\n").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_date_formats() {
        // ---
        let expected = NaiveDate::from_ymd_opt(2019, 4, 7).unwrap();
        for value in [
            "2019-04-07",
            "2019/04/07",
            "04/07/2019",
            "2019-04-07 13:20:00",
            "2019-04-07T13:20:00.250",
            "2019-04-07T13:20:00+02:00",
            " 2019-04-07 ",
        ] {
            assert_eq!(parse_date(value), Some(expected), "{value}");
        }

        for value in ["20190407", "April 7, 2019", "7 Apr 2019", "yesterday"] {
            assert_eq!(parse_date(value), None, "{value}");
        }
        assert_eq!(parse_date("2019-13-01"), None);
    }

    #[test]
    fn test_normalize_dates() {
        // ---
        let mut table =
            CsvTable::parse(b"turbine_id,install_date\n1,2019/04/07\n2,\n3,NaN\n").unwrap();
        table.normalize_dates(DATE_COLUMN).unwrap();

        assert_eq!(table.rows[0].cells[1], "2019-04-07");
        assert_eq!(table.rows[1].cells[1], "");
        assert_eq!(table.rows[2].cells[1], "");

        let mut bad = CsvTable::parse(b"turbine_id,install_date\n1,not-a-date\n").unwrap();
        let err = bad.normalize_dates(DATE_COLUMN).unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { line: 2, .. }));
    }

    #[test]
    fn test_cell_coercion() {
        // ---
        let table = CsvTable::parse(b"turbine_id,mf,timestamp\n3.0,1.25,NA\nx,abc,t\n").unwrap();
        let turbine_id = table.column("turbine_id");
        let mf = table.column("mf");
        let timestamp = table.column("timestamp");
        let absent = table.column("gtt");

        let good = &table.rows[0];
        assert_eq!(good.integer(&turbine_id).unwrap(), Some(3));
        assert_eq!(good.real(&mf).unwrap(), Some(1.25));
        assert_eq!(good.text(&timestamp), None);
        assert_eq!(good.real(&absent).unwrap(), None);

        let bad = &table.rows[1];
        let err = bad.real(&mf).unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 3: invalid numeric value 'abc' in column 'mf'"
        );
        assert!(bad.integer(&turbine_id).is_err());
    }

    #[test]
    fn test_reading_records_drop_identifier_column() {
        // ---
        let table = CsvTable::parse(b"id,timestamp,mf,turbine_id\n99,2025-01-01T00:00:00,0.5,1\n")
            .unwrap();
        let records = reading_records(&table).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].turbine_id, Some(1));
        assert_eq!(records[0].channels[15], Some(0.5));
        assert_eq!(table.unmapped(&["timestamp", "mf", "turbine_id"]), vec!["id"]);
    }

    #[test]
    fn test_metadata_requires_columns_and_key() {
        // ---
        let table = CsvTable::parse(b"turbine_id,location\n1,North\n").unwrap();
        let err = metadata_records(&table).unwrap_err();
        assert!(matches!(err, RowError::MissingColumn("manufacturer")));

        let table = CsvTable::parse(
            b"turbine_id,location,manufacturer,model,install_date\n,North,GE,LM2500,2019-04-07\n",
        )
        .unwrap();
        let err = metadata_records(&table).unwrap_err();
        assert!(matches!(err, RowError::MissingValue { line: 2, column: "turbine_id" }));
    }
}
