//! Contact queries.

use std::collections::HashMap;

use rocket_db_pools::sqlx::{self, PgConnection};

use super::tags::load_tags_by_ids;
use super::validation::ContactDraft;
use super::{StoreError, StoreResult};
use crate::models::{Contact, ContactWithTags, Tag};

const CONTACT_COLUMNS: &str =
    "id, name, email, phone, address, photo_url, created_at, updated_at";

/// Search criteria for contact listings.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    /// Case-insensitive substring matched against name or email.
    pub query: Option<String>,
    /// Only contacts carrying the tag with this slug.
    pub tag_slug: Option<String>,
}

/// Escape `LIKE` metacharacters and wrap the term for substring matching.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

pub async fn find_contact_id_by_email(
    conn: &mut PgConnection,
    email: &str,
) -> StoreResult<Option<i32>> {
    let id = sqlx::query_scalar::<_, i32>("SELECT id FROM contacts WHERE email = $1")
        .bind(email)
        .fetch_optional(conn)
        .await?;
    Ok(id)
}

/// Validate and insert a new contact.
pub async fn insert_contact(conn: &mut PgConnection, draft: &ContactDraft) -> StoreResult<Contact> {
    draft.validate()?;

    let contact = sqlx::query_as::<_, Contact>(&format!(
        r#"INSERT INTO contacts (name, email, phone, address, photo_url)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING {CONTACT_COLUMNS}"#
    ))
    .bind(&draft.name)
    .bind(&draft.email)
    .bind(&draft.phone)
    .bind(&draft.address)
    .bind(&draft.photo_url)
    .fetch_one(conn)
    .await?;

    Ok(contact)
}

/// Validate and overwrite every field of an existing contact.
pub async fn update_contact(
    conn: &mut PgConnection,
    id: i32,
    draft: &ContactDraft,
) -> StoreResult<Contact> {
    draft.validate()?;

    let contact = sqlx::query_as::<_, Contact>(&format!(
        r#"UPDATE contacts
           SET name = $2, email = $3, phone = $4, address = $5, photo_url = $6, updated_at = NOW()
           WHERE id = $1
           RETURNING {CONTACT_COLUMNS}"#
    ))
    .bind(id)
    .bind(&draft.name)
    .bind(&draft.email)
    .bind(&draft.phone)
    .bind(&draft.address)
    .bind(&draft.photo_url)
    .fetch_optional(conn)
    .await?;

    contact.ok_or_else(|| StoreError::NotFound(format!("Contact {id} not found")))
}

/// Create the contact keyed by `draft.email`, or overwrite name, phone,
/// address and photo URL of the one that already has it.
///
/// Returns the stored contact and whether it was created.
pub async fn upsert_contact_by_email(
    conn: &mut PgConnection,
    draft: &ContactDraft,
) -> StoreResult<(Contact, bool)> {
    draft.validate()?;

    let existing = sqlx::query_scalar::<_, i32>("SELECT id FROM contacts WHERE email = $1 FOR UPDATE")
        .bind(&draft.email)
        .fetch_optional(&mut *conn)
        .await?;

    match existing {
        Some(id) => {
            let contact = sqlx::query_as::<_, Contact>(&format!(
                r#"UPDATE contacts
                   SET name = $2, phone = $3, address = $4, photo_url = $5, updated_at = NOW()
                   WHERE id = $1
                   RETURNING {CONTACT_COLUMNS}"#
            ))
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.phone)
            .bind(&draft.address)
            .bind(&draft.photo_url)
            .fetch_one(&mut *conn)
            .await?;
            Ok((contact, false))
        }
        None => Ok((insert_contact(conn, draft).await?, true)),
    }
}

/// Make `tags` the contact's complete tag set.
pub async fn replace_contact_tags(
    conn: &mut PgConnection,
    contact_id: i32,
    tags: &[Tag],
) -> StoreResult<()> {
    sqlx::query("DELETE FROM contact_tags WHERE contact_id = $1")
        .bind(contact_id)
        .execute(&mut *conn)
        .await?;

    if tags.is_empty() {
        return Ok(());
    }

    let tag_ids: Vec<i32> = tags.iter().map(|tag| tag.id).collect();
    sqlx::query(
        r#"INSERT INTO contact_tags (contact_id, tag_id)
           SELECT $1, tag_id FROM UNNEST($2::int[]) AS t(tag_id)
           ON CONFLICT DO NOTHING"#,
    )
    .bind(contact_id)
    .bind(&tag_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Insert a contact and attach existing tags by id.
pub async fn create_contact(
    conn: &mut PgConnection,
    draft: &ContactDraft,
    tag_ids: &[i32],
) -> StoreResult<ContactWithTags> {
    let tags = load_tags_by_ids(&mut *conn, tag_ids).await?;
    let contact = insert_contact(&mut *conn, draft).await?;
    replace_contact_tags(&mut *conn, contact.id, &tags).await?;
    Ok(ContactWithTags { contact, tags })
}

/// Overwrite a contact and replace its tag set with the given tag ids.
pub async fn edit_contact(
    conn: &mut PgConnection,
    id: i32,
    draft: &ContactDraft,
    tag_ids: &[i32],
) -> StoreResult<ContactWithTags> {
    let tags = load_tags_by_ids(&mut *conn, tag_ids).await?;
    let contact = update_contact(&mut *conn, id, draft).await?;
    replace_contact_tags(&mut *conn, contact.id, &tags).await?;
    Ok(ContactWithTags { contact, tags })
}

pub async fn get_contact(conn: &mut PgConnection, id: i32) -> StoreResult<ContactWithTags> {
    let contact = sqlx::query_as::<_, Contact>(&format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| StoreError::NotFound(format!("Contact {id} not found")))?;

    let mut tags = tags_for_contacts(conn, &[id]).await?;
    Ok(ContactWithTags {
        tags: tags.remove(&id).unwrap_or_default(),
        contact,
    })
}

/// Delete a contact; its tag links go with it, the tags stay.
pub async fn delete_contact(conn: &mut PgConnection, id: i32) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(format!("Contact {id} not found")));
    }
    Ok(())
}

/// One page of contacts matching `filter`, ordered by name, plus the total
/// number of matches.
pub async fn search_contacts(
    conn: &mut PgConnection,
    filter: &ContactFilter,
    limit: i64,
    offset: i64,
) -> StoreResult<(Vec<ContactWithTags>, i64)> {
    let pattern = filter.query.as_deref().map(like_pattern);
    let tag_slug = filter.tag_slug.as_deref();

    const FILTER: &str = r#"
        ($1::text IS NULL OR c.name ILIKE $1 OR c.email ILIKE $1)
        AND ($2::text IS NULL OR EXISTS (
            SELECT 1 FROM contact_tags ct
            JOIN tags t ON t.id = ct.tag_id
            WHERE ct.contact_id = c.id AND t.slug = $2
        ))"#;

    let total: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM contacts c WHERE {FILTER}"))
            .bind(pattern.as_deref())
            .bind(tag_slug)
            .fetch_one(&mut *conn)
            .await?;

    let contacts = sqlx::query_as::<_, Contact>(&format!(
        r#"SELECT c.id, c.name, c.email, c.phone, c.address, c.photo_url, c.created_at, c.updated_at
           FROM contacts c
           WHERE {FILTER}
           ORDER BY c.name ASC, c.id ASC
           LIMIT $3 OFFSET $4"#
    ))
    .bind(pattern.as_deref())
    .bind(tag_slug)
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut *conn)
    .await?;

    let ids: Vec<i32> = contacts.iter().map(|contact| contact.id).collect();
    let mut tags = tags_for_contacts(conn, &ids).await?;

    let page = contacts
        .into_iter()
        .map(|contact| ContactWithTags {
            tags: tags.remove(&contact.id).unwrap_or_default(),
            contact,
        })
        .collect();

    Ok((page, total))
}

/// Tags of each contact, ordered by tag name.
pub async fn tags_for_contacts(
    conn: &mut PgConnection,
    contact_ids: &[i32],
) -> StoreResult<HashMap<i32, Vec<Tag>>> {
    let mut by_contact: HashMap<i32, Vec<Tag>> = HashMap::new();
    if contact_ids.is_empty() {
        return Ok(by_contact);
    }

    let rows: Vec<(i32, i32, String, String)> = sqlx::query_as(
        r#"SELECT ct.contact_id, t.id, t.name, t.slug
           FROM contact_tags ct
           JOIN tags t ON t.id = ct.tag_id
           WHERE ct.contact_id = ANY($1)
           ORDER BY t.name ASC, t.id ASC"#,
    )
    .bind(contact_ids)
    .fetch_all(conn)
    .await?;

    for (contact_id, id, name, slug) in rows {
        by_contact
            .entry(contact_id)
            .or_default()
            .push(Tag { id, name, slug });
    }

    Ok(by_contact)
}
