//! HTTP route handlers grouped by resource.
//!
//! Handlers are annotated with `#[openapi]` so `rocket_okapi` can derive
//! the OpenAPI document; the multipart import endpoint is left out of it.

pub mod contacts;
pub mod health;
pub mod import;
pub mod params;
pub mod tags;
