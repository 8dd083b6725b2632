use rocket::State;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket_db_pools::sqlx;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{DataResponse, Tag};
use crate::store::tags;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct TagPayload {
    /// Display name; the slug is derived from it.
    pub name: String,
}

/// List all tags ordered by name.
#[openapi(tag = "Tags")]
#[get("/tags")]
pub async fn list_tags(pool: &State<sqlx::PgPool>) -> Result<Json<DataResponse<Vec<Tag>>>, ApiError> {
    let mut conn = pool.acquire().await?;
    let tags = tags::list_tags(&mut conn).await?;
    Ok(Json(DataResponse { data: tags }))
}

/// Create a tag. Names and slugs are unique.
#[openapi(tag = "Tags")]
#[post("/tags", data = "<payload>")]
pub async fn create_tag(
    payload: Json<TagPayload>,
    pool: &State<sqlx::PgPool>,
) -> Result<status::Custom<Json<DataResponse<Tag>>>, ApiError> {
    let mut conn = pool.acquire().await?;
    let tag = tags::create_tag(&mut conn, &payload.name).await?;

    log::info!("created tag {} ({})", tag.name, tag.slug);
    Ok(status::Custom(Status::Created, Json(DataResponse { data: tag })))
}
