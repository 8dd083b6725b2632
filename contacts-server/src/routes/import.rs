//! Bulk CSV import endpoint.
//!
//! Accepts a `multipart/form-data` upload with fields `csv_file`,
//! `update_existing` and `delimiter`, runs it through
//! [`ContactImporter`](crate::import::ContactImporter) and reports the
//! counters plus the first few row errors.

use rocket::State;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::serde::json::Json;
use rocket_db_pools::sqlx;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;

use crate::config::ImportConfig;
use crate::error::ApiError;
use crate::import::{ContactImporter, ImportOptions, parse_delimiter};

#[derive(Debug, FromForm)]
pub struct ImportForm<'r> {
    csv_file: Option<TempFile<'r>>,
    #[field(default = false)]
    update_existing: bool,
    delimiter: Option<String>,
}

/// Outcome of an import request.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ImportResponse {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    /// Human-readable summary line.
    pub message: String,
    /// Leading row errors, `L<line>: <reason>`.
    pub errors: Vec<String>,
}

async fn read_upload(file: &TempFile<'_>, max_bytes: u64) -> Result<Vec<u8>, ApiError> {
    if file.len() > max_bytes {
        return Err(ApiError::BadRequest(format!(
            "El archivo supera el tamaño máximo de {max_bytes} bytes"
        )));
    }

    let reader = file
        .open()
        .await
        .map_err(|e| ApiError::InternalError(format!("failed to open upload: {e}")))?;
    tokio::pin!(reader);

    let mut bytes = Vec::with_capacity(file.len() as usize);
    reader
        .read_to_end(&mut bytes)
        .await
        .map_err(|e| ApiError::InternalError(format!("failed to read upload: {e}")))?;
    Ok(bytes)
}

/// Import contacts from an uploaded CSV file.
#[openapi(skip)]
#[post("/contacts/import", data = "<form>")]
pub async fn import_contacts(
    form: Form<ImportForm<'_>>,
    pool: &State<sqlx::PgPool>,
    config: &State<ImportConfig>,
) -> Result<Json<ImportResponse>, ApiError> {
    let file = form
        .csv_file
        .as_ref()
        .filter(|file| file.len() > 0)
        .ok_or_else(|| ApiError::BadRequest("Debe adjuntar un archivo CSV".to_string()))?;

    let options = ImportOptions {
        update_existing: form.update_existing,
        delimiter: parse_delimiter(form.delimiter.as_deref())?,
    };
    let bytes = read_upload(file, config.max_upload_bytes).await?;

    let importer = ContactImporter::new(pool.inner().clone());
    let summary = importer.import(&bytes, &options).await?;

    Ok(Json(ImportResponse {
        created: summary.created,
        updated: summary.updated,
        skipped: summary.skipped,
        message: summary.message(),
        errors: summary.surfaced_errors(config.error_preview_limit).to_vec(),
    }))
}
