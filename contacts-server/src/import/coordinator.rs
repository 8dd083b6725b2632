//! Import coordination for CSV contact uploads.
//!
//! The ContactImporter drives one file through the pipeline:
//! 1. Decode the upload (UTF-8, Latin-1 fallback)
//! 2. Validate the header
//! 3. Apply each row inside its own savepoint
//! 4. Commit every surviving row in one transaction

use rocket_db_pools::sqlx::{Connection, PgConnection, PgPool};

use super::ImportError;
use super::decoder::decode_upload;
use super::reader::{ContactCsvReader, ContactRow, DEFAULT_DELIMITER, ParsedRow};
use super::summary::{ImportSummary, RowOutcome};
use crate::store::StoreResult;
use crate::store::contacts::{
    find_contact_id_by_email, insert_contact, replace_contact_tags, upsert_contact_by_email,
};
use crate::store::tags::resolve_tags;

/// Error recorded for rows with a blank `name`, `email` or `phone`.
pub const MISSING_REQUIRED_MESSAGE: &str = "faltan name/email/phone";

/// Caller-controlled import settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Overwrite contacts whose email is already stored instead of skipping them.
    pub update_existing: bool,
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            update_existing: false,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// Runs CSV imports against the contact store.
///
/// The whole file shares one transaction and every row gets a savepoint:
/// a row that fails validation or hits a unique constraint is rolled back on
/// its own and reported, while the remaining rows are committed together.
/// Only a failure of the transaction itself aborts the import.
pub struct ContactImporter {
    pool: PgPool,
}

impl ContactImporter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Import an uploaded file.
    ///
    /// # Returns
    /// - `Ok(ImportSummary)`: counters plus per-row errors
    /// - `Err(ImportError::MissingColumns)`: header lacks a required column; nothing was written
    /// - `Err(ImportError::Database)`: the transaction failed; nothing was written
    pub async fn import(
        &self,
        bytes: &[u8],
        options: &ImportOptions,
    ) -> Result<ImportSummary, ImportError> {
        let (text, encoding) = decode_upload(bytes);
        let reader = ContactCsvReader::new(&text, options.delimiter)?;

        log::info!(
            "importing contacts: {} bytes ({:?}), update_existing={}",
            bytes.len(),
            encoding,
            options.update_existing
        );

        let mut tx = self.pool.begin().await?;
        let mut summary = ImportSummary::default();

        for (line, parsed) in reader {
            let row = match parsed {
                ParsedRow::Ready(row) => row,
                ParsedRow::MissingRequired => {
                    summary.reject(line, MISSING_REQUIRED_MESSAGE);
                    continue;
                }
                ParsedRow::Malformed(message) => {
                    log::debug!("line {line}: malformed record: {message}");
                    summary.reject(line, message);
                    continue;
                }
            };

            let mut savepoint = Connection::begin(&mut *tx).await?;
            match apply_row(&mut *savepoint, &row, options.update_existing).await {
                Ok(outcome) => {
                    savepoint.commit().await?;
                    summary.record(outcome);
                }
                Err(err) => {
                    savepoint.rollback().await?;
                    log::debug!("line {line}: row rejected: {err}");
                    summary.reject(line, err.to_string());
                }
            }
        }

        tx.commit().await?;

        log::info!(
            "import complete: {} created, {} updated, {} skipped, {} errors",
            summary.created,
            summary.updated,
            summary.skipped,
            summary.errors.len()
        );

        Ok(summary)
    }
}

/// Write one row according to the duplicate-email policy.
///
/// Tags are replaced only when the row names at least one; an empty `tags`
/// field leaves an updated contact's tags as they were.
async fn apply_row(
    conn: &mut PgConnection,
    row: &ContactRow,
    update_existing: bool,
) -> StoreResult<RowOutcome> {
    let draft = row.draft();

    let (contact_id, outcome) = if update_existing {
        let (contact, created) = upsert_contact_by_email(&mut *conn, &draft).await?;
        let outcome = if created {
            RowOutcome::Created
        } else {
            RowOutcome::Updated
        };
        (contact.id, outcome)
    } else {
        if find_contact_id_by_email(&mut *conn, &draft.email)
            .await?
            .is_some()
        {
            return Ok(RowOutcome::Existing);
        }
        let contact = insert_contact(&mut *conn, &draft).await?;
        (contact.id, RowOutcome::Created)
    };

    let tag_names = row.tag_names();
    if !tag_names.is_empty() {
        let tags = resolve_tags(&mut *conn, &tag_names).await?;
        replace_contact_tags(conn, contact_id, &tags).await?;
    }

    Ok(outcome)
}
