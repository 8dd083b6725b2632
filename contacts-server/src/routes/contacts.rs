//! Contact CRUD and search endpoints.

use rocket::State;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket_db_pools::sqlx;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{ContactListResponse, ContactWithTags, DataResponse, PaginatedResponse};
use crate::routes::params::ContactListParams;
use crate::store::{contacts, tags};
use crate::store::validation::ContactDraft;

/// Request body for creating or replacing a contact.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// Public URL of the contact's photo; empty for none.
    #[serde(default)]
    pub photo_url: String,
    /// Ids of existing tags; the contact ends up with exactly these.
    #[serde(default)]
    pub tag_ids: Vec<i32>,
}

impl ContactPayload {
    fn draft(&self) -> ContactDraft {
        ContactDraft {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            photo_url: self.photo_url.trim().to_string(),
        }
    }
}

/// Simple message wrapper for acknowledgement responses.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// List contacts ordered by name, optionally filtered by text and tag.
#[openapi(tag = "Contacts")]
#[get("/contacts?<params..>")]
pub async fn list_contacts(
    params: ContactListParams,
    pool: &State<sqlx::PgPool>,
) -> Result<Json<ContactListResponse>, ApiError> {
    let filter = params.filter();
    let mut conn = pool.acquire().await?;

    let (page, total) =
        contacts::search_contacts(&mut conn, &filter, params.size(), params.offset()).await?;

    let selected_tag = match filter.tag_slug.as_deref() {
        Some(slug) => tags::find_tag_by_slug(&mut conn, slug).await?,
        None => None,
    };

    Ok(Json(ContactListResponse {
        page: PaginatedResponse::new(page, params.page(), params.size(), total),
        selected_tag,
    }))
}

/// Fetch one contact with its tags.
#[openapi(tag = "Contacts")]
#[get("/contacts/<id>")]
pub async fn get_contact(
    id: i32,
    pool: &State<sqlx::PgPool>,
) -> Result<Json<DataResponse<ContactWithTags>>, ApiError> {
    let mut conn = pool.acquire().await?;
    let contact = contacts::get_contact(&mut conn, id).await?;
    Ok(Json(DataResponse { data: contact }))
}

/// Create a contact.
#[openapi(tag = "Contacts")]
#[post("/contacts", data = "<payload>")]
pub async fn create_contact(
    payload: Json<ContactPayload>,
    pool: &State<sqlx::PgPool>,
) -> Result<status::Custom<Json<DataResponse<ContactWithTags>>>, ApiError> {
    let mut tx = pool.begin().await?;
    let contact = contacts::create_contact(&mut tx, &payload.draft(), &payload.tag_ids).await?;
    tx.commit().await?;

    log::info!("created contact {} <{}>", contact.contact.id, contact.contact.email);
    Ok(status::Custom(
        Status::Created,
        Json(DataResponse { data: contact }),
    ))
}

/// Replace a contact's fields and tag set.
#[openapi(tag = "Contacts")]
#[put("/contacts/<id>", data = "<payload>")]
pub async fn update_contact(
    id: i32,
    payload: Json<ContactPayload>,
    pool: &State<sqlx::PgPool>,
) -> Result<Json<DataResponse<ContactWithTags>>, ApiError> {
    let mut tx = pool.begin().await?;
    let contact = contacts::edit_contact(&mut tx, id, &payload.draft(), &payload.tag_ids).await?;
    tx.commit().await?;

    log::info!("updated contact {id}");
    Ok(Json(DataResponse { data: contact }))
}

/// Delete a contact. Its tags stay.
#[openapi(tag = "Contacts")]
#[delete("/contacts/<id>")]
pub async fn delete_contact(
    id: i32,
    pool: &State<sqlx::PgPool>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut conn = pool.acquire().await?;
    contacts::delete_contact(&mut conn, id).await?;

    log::info!("deleted contact {id}");
    Ok(Json(MessageResponse {
        message: "Contacto eliminado.".to_string(),
    }))
}
