//! Liveness and readiness probes.

use rocket::State;
use rocket::serde::json::Json;
use rocket_db_pools::sqlx;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::DataResponse;

/// Basic response payload describing API health.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    /// `ok` when the probe passed.
    pub status: String,
}

/// Liveness probe; answers as long as the process serves requests.
#[openapi(tag = "Health")]
#[get("/health/live")]
pub fn live_health() -> Json<DataResponse<HealthResponse>> {
    Json(DataResponse {
        data: HealthResponse {
            status: "ok".to_string(),
        },
    })
}

/// Readiness probe; also checks that the database answers.
#[openapi(tag = "Health")]
#[get("/health/ready")]
pub async fn ready_health(
    pool: &State<sqlx::PgPool>,
) -> Result<Json<DataResponse<HealthResponse>>, ApiError> {
    sqlx::query("SELECT 1").execute(pool.inner()).await?;

    Ok(Json(DataResponse {
        data: HealthResponse {
            status: "ok".to_string(),
        },
    }))
}
