//! Persistence for contacts and tags.
//!
//! Every function takes a plain `&mut PgConnection`, so the same query code
//! runs against a pooled connection in request handlers and against a
//! transaction or savepoint during CSV imports.
//!
//! - **`validation`**: field rules checked right before a write.
//! - **`slug`**: deterministic slug derivation for tag names.
//! - **`contacts`**: contact CRUD, search and tag-set replacement.
//! - **`tags`**: tag listing, creation and the find-or-create resolver.
//!
//! Uniqueness (contact email/phone, tag name/slug) is left to PostgreSQL
//! constraints; violations come back as [`StoreError::Duplicate`].

pub mod contacts;
pub mod slug;
pub mod tags;
pub mod validation;

use rocket_db_pools::sqlx;
use thiserror::Error;

pub use contacts::ContactFilter;
pub use tags::{parse_tag_names, resolve_tags};
pub use validation::{ContactDraft, ValidationError};

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Duplicate(String),
    #[error("{0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match duplicate_message(&err) {
            Some(message) => StoreError::Duplicate(message),
            None => StoreError::Database(err),
        }
    }
}

/// Translate a unique-constraint violation into a user-facing message.
fn duplicate_message(err: &sqlx::Error) -> Option<String> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if db_err.code().as_deref() != Some(UNIQUE_VIOLATION) {
        return None;
    }

    let message = match db_err.constraint() {
        Some("contacts_email_key") => "ya existe un contacto con ese email",
        Some("contacts_phone_key") => "ya existe un contacto con ese teléfono",
        Some("tags_name_key") => "ya existe una etiqueta con ese nombre",
        Some("tags_slug_key") => "ya existe una etiqueta con ese slug",
        _ => "el registro ya existe",
    };
    Some(message.to_string())
}
