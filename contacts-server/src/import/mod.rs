//! Bulk contact import from CSV.
//!
//! 1. **Decoding** (`decoder`) - UTF-8 with BOM stripped, Latin-1 fallback
//! 2. **Parsing** (`reader`) - header check, trimmed rows, required fields
//! 3. **Coordination** (`coordinator`) - duplicate-email policy, tags, transaction
//! 4. **Summary** (`summary`) - created/updated/skipped counters and row errors
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use contacts_server::import::{ContactImporter, ImportOptions};
//!
//! let importer = ContactImporter::new(pool);
//! let summary = importer
//!     .import(&bytes, &ImportOptions { update_existing: true, delimiter: b';' })
//!     .await?;
//!
//! println!("{}", summary.message());
//! ```

pub mod coordinator;
pub mod decoder;
pub mod reader;
pub mod summary;

use rocket_db_pools::sqlx;
use thiserror::Error;

pub use coordinator::{ContactImporter, ImportOptions, MISSING_REQUIRED_MESSAGE};
pub use reader::parse_delimiter;
pub use summary::ImportSummary;

/// Failures that stop an import before or while it is committed.
///
/// Row-level problems never show up here; they end in
/// [`ImportSummary::errors`].
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Faltan columnas requeridas: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("El delimitador debe ser un único carácter ASCII, recibido '{0}'")]
    InvalidDelimiter(String),
    #[error("CSV inválido: {0}")]
    Csv(#[from] csv::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
