//! Application settings read from the environment.
//!
//! Server and pool settings stay in Rocket's figment (`Rocket.toml`,
//! `ROCKET_*`); this module only covers knobs the address book adds on top.

use std::env;

/// Row errors shown after an import unless overridden.
pub const DEFAULT_ERROR_PREVIEW: usize = 5;

/// Upload cap for CSV files (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

/// Settings for the CSV import endpoint and CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// How many row errors are reported back to the caller.
    pub error_preview_limit: usize,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: u64,
}

impl ImportConfig {
    pub fn from_env() -> Self {
        Self {
            error_preview_limit: env_usize("CONTACTS_IMPORT_ERROR_PREVIEW", DEFAULT_ERROR_PREVIEW),
            max_upload_bytes: env_u64("CONTACTS_IMPORT_MAX_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            error_preview_limit: DEFAULT_ERROR_PREVIEW,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
