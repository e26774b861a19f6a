//! `POST /uploadfile/?table=<name>`: bulk CSV ingestion into one of the
//! `turbine_metadata`, `sensor_readings` or `alerts` tables.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::{ingest, AppError, TargetTable, UploadResponse};

// ---

/// Multipart field carrying the CSV file.
const FILE_FIELD: &str = "file";

pub fn router(max_bytes: usize) -> Router<SqlitePool> {
    // ---
    Router::new()
        .route("/uploadfile/", post(handler))
        .layer(DefaultBodyLimit::max(max_bytes))
}

/// Query parameters for `POST /uploadfile/`
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    table: String,
}

/// Handle `POST /uploadfile/?table=<name>` with a multipart `file` field.
///
/// The table name is checked before the body is read, and the file is parsed
/// in full before anything is written.
async fn handler(
    Query(params): Query<UploadQuery>,
    State(pool): State<SqlitePool>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    // ---
    info!("POST /uploadfile/ - table={}", params.table);

    let target: TargetTable = params.table.parse()?;
    let file = read_file_field(&mut multipart).await?;
    debug!("POST /uploadfile/ - Received {} bytes", file.len());

    let rows = ingest::load(&pool, target, &file).await?;

    Ok(Json(UploadResponse::new(rows, target.as_str())))
}

/// Return the contents of the first `file` field, skipping any other parts.
async fn read_file_field(multipart: &mut Multipart) -> Result<Bytes, AppError> {
    // ---
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            return Ok(field.bytes().await?);
        }
    }

    Err(AppError::Validation(format!(
        "Missing '{FILE_FIELD}' field in multipart body"
    )))
}
