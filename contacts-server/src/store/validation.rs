//! Field rules applied to contacts and tags right before they are written.
//!
//! Messages are user-facing and stay in Spanish, matching the rest of the
//! address book's output.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use super::slug::slugify;

pub const MAX_NAME_LEN: usize = 120;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_ADDRESS_LEN: usize = 255;
pub const MAX_PHONE_LEN: usize = 16;
pub const MAX_PHOTO_URL_LEN: usize = 200;
pub const MAX_TAG_NAME_LEN: usize = 50;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
        )
        .expect("Invalid email regex")
    })
}

/// Optional leading `+`, no leading zero, 8 to 15 digits in total.
fn phone_regex() -> &'static Regex {
    PHONE_REGEX
        .get_or_init(|| Regex::new(r"^\+?[1-9]\d{7,14}$").expect("Invalid phone regex"))
}

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| {
        Regex::new(
            r"^(?i)(?:https?|ftps?)://(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)*[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?::\d{1,5})?(?:[/?#]\S*)?$",
        )
        .expect("Invalid URL regex")
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("el campo {0} es obligatorio")]
    Required(&'static str),
    #[error("el campo {field} supera los {max} caracteres")]
    TooLong { field: &'static str, max: usize },
    #[error("Email inválido")]
    InvalidEmail,
    #[error("Número de teléfono inválido.")]
    InvalidPhone,
    #[error("URL de foto inválida")]
    InvalidPhotoUrl,
    #[error("la etiqueta '{0}' no contiene letras ni números")]
    EmptySlug(String),
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.len() > MAX_EMAIL_LEN || !email_regex().is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone_regex().is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

/// Empty URLs are accepted; the column stores `''` for "no photo".
pub fn validate_photo_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Ok(());
    }
    if url.chars().count() > MAX_PHOTO_URL_LEN {
        return Err(ValidationError::TooLong {
            field: "photo_url",
            max: MAX_PHOTO_URL_LEN,
        });
    }
    if url_regex().is_match(url) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhotoUrl)
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::TooLong { field, max })
    } else {
        Ok(())
    }
}

/// Contact fields as they are about to be written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub photo_url: String,
}

impl ContactDraft {
    /// Check every field rule, reporting the first violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required("name"));
        }
        check_len("name", &self.name, MAX_NAME_LEN)?;

        if self.email.is_empty() {
            return Err(ValidationError::Required("email"));
        }
        validate_email(&self.email)?;

        if self.phone.is_empty() {
            return Err(ValidationError::Required("phone"));
        }
        validate_phone(&self.phone)?;
        check_len("phone", &self.phone, MAX_PHONE_LEN)?;

        check_len("address", &self.address, MAX_ADDRESS_LEN)?;
        validate_photo_url(&self.photo_url)
    }
}

/// Validate a tag name and return the slug it will be stored with.
pub fn validate_tag_name(name: &str) -> Result<String, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required("name"));
    }
    check_len("name", name, MAX_TAG_NAME_LEN)?;

    let slug = slugify(name);
    if slug.is_empty() {
        return Err(ValidationError::EmptySlug(name.to_string()));
    }
    Ok(slug)
}
