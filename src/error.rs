//! Request-level error taxonomy and its HTTP mapping.
//!
//! Every failure is local to one request: the handler returns an [`AppError`],
//! axum turns it into a `{"detail": ...}` body with the matching status code,
//! and any open transaction has already been rolled back by then.

use axum::{
    extract::multipart::MultipartError, http::StatusCode, response::IntoResponse,
    response::Response, Json,
};
use serde::Serialize;
use tracing::{error, warn};

// ---

/// Errors surfaced by the ingestion, aggregation and query operations.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The uploaded file could not be read as CSV, or a date column is invalid.
    #[error("Error reading CSV: {0}")]
    Parse(#[from] ParseError),

    /// The upload names a table other than the three ingestible ones.
    #[error("Invalid table name '{0}'. Use 'turbine_metadata', 'sensor_readings', or 'alerts'.")]
    InvalidTarget(String),

    /// A row was rejected during the write step; nothing was committed.
    #[error("Error inserting data: {0}")]
    Insertion(#[from] RowError),

    /// No sensor readings exist for the requested turbine.
    #[error("No sensor data found for turbine ID {turbine_id}")]
    NotFound { turbine_id: i64 },

    /// The request is missing a required part (e.g. the `file` field).
    #[error("{0}")]
    Validation(String),

    /// The multipart body could not be read (malformed, or over the size limit).
    #[error("Invalid upload: {0}")]
    Upload(#[from] MultipartError),

    /// The store was unavailable or rejected a read.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Failures while turning the uploaded bytes into a table of text cells.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("no columns to parse from file")]
    Empty,

    #[error("line {line}: cannot parse '{value}' in column '{column}' as a date")]
    InvalidDate {
        line: u64,
        column: &'static str,
        value: String,
    },
}

/// Failures while coercing or writing individual rows.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("line {line}: invalid {expected} value '{value}' in column '{column}'")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),

    #[error("line {line}: column '{column}' must not be empty")]
    MissingValue { line: u64, column: &'static str },

    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

/// JSON error body, shaped like the original service's `detail` responses.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        // ---
        match self {
            AppError::Parse(_) | AppError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Upload(e) => e.status(),
            AppError::Insertion(_) | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status_code();
        if status.is_server_error() {
            error!("{} - {}", status, self);
        } else {
            warn!("{} - {}", status, self);
        }

        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_status_codes() {
        // ---
        assert_eq!(
            AppError::from(ParseError::Empty).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidTarget("users".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound { turbine_id: 9 }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation("missing".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(RowError::MissingColumn("turbine_id")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_carry_the_cause() {
        // ---
        let err = AppError::from(RowError::InvalidValue {
            line: 3,
            column: "mf".into(),
            value: "abc".into(),
            expected: "numeric",
        });
        assert_eq!(
            err.to_string(),
            "Error inserting data: line 3: invalid numeric value 'abc' in column 'mf'"
        );

        let err = AppError::NotFound { turbine_id: 42 };
        assert_eq!(err.to_string(), "No sensor data found for turbine ID 42");
    }
}
