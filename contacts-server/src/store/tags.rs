//! Tag queries and the find-or-create resolver used by contact writes and
//! CSV imports.

use rocket_db_pools::sqlx::{self, PgConnection};

use super::validation::validate_tag_name;
use super::{StoreError, StoreResult};
use crate::models::Tag;

/// Separator between tag names in the CSV `tags` column.
pub const TAG_SEPARATOR: char = ';';

/// Split a `;`-delimited tag field into trimmed, non-empty, distinct names.
///
/// Order of first appearance is preserved.
pub fn parse_tag_names(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for piece in raw.split(TAG_SEPARATOR) {
        let name = piece.trim();
        if !name.is_empty() && !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// All tags ordered by name.
pub async fn list_tags(conn: &mut PgConnection) -> StoreResult<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags ORDER BY name ASC, id ASC")
        .fetch_all(conn)
        .await?;
    Ok(tags)
}

pub async fn find_tag_by_slug(conn: &mut PgConnection, slug: &str) -> StoreResult<Option<Tag>> {
    let tag = sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE slug = $1")
        .bind(slug)
        .fetch_optional(conn)
        .await?;
    Ok(tag)
}

/// Create a tag; an existing name is reported as a duplicate.
pub async fn create_tag(conn: &mut PgConnection, name: &str) -> StoreResult<Tag> {
    let name = name.trim();
    let slug = validate_tag_name(name)?;

    let tag = sqlx::query_as::<_, Tag>(
        "INSERT INTO tags (name, slug) VALUES ($1, $2) RETURNING id, name, slug",
    )
    .bind(name)
    .bind(&slug)
    .fetch_one(conn)
    .await?;

    log::debug!("created tag '{}' ({})", tag.name, tag.slug);
    Ok(tag)
}

/// Fetch tags by id, failing when any id is unknown.
pub async fn load_tags_by_ids(conn: &mut PgConnection, ids: &[i32]) -> StoreResult<Vec<Tag>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let tags = sqlx::query_as::<_, Tag>(
        "SELECT id, name, slug FROM tags WHERE id = ANY($1) ORDER BY name ASC, id ASC",
    )
    .bind(ids)
    .fetch_all(conn)
    .await?;

    if let Some(missing) = ids.iter().find(|id| !tags.iter().any(|tag| tag.id == **id)) {
        return Err(StoreError::NotFound(format!("Tag {missing} not found")));
    }
    Ok(tags)
}

/// Find or create one tag per name, returned in input order.
///
/// Each name is an idempotent upsert keyed by the unique tag name: the insert
/// is a no-op when the row exists and the follow-up select returns whichever
/// row won. A fresh tag whose slug collides with another tag's slug fails
/// with [`StoreError::Duplicate`].
pub async fn resolve_tags(conn: &mut PgConnection, names: &[String]) -> StoreResult<Vec<Tag>> {
    let mut resolved = Vec::with_capacity(names.len());

    for name in names {
        let slug = validate_tag_name(name)?;

        let inserted = sqlx::query_as::<_, Tag>(
            r#"INSERT INTO tags (name, slug) VALUES ($1, $2)
               ON CONFLICT (name) DO NOTHING
               RETURNING id, name, slug"#,
        )
        .bind(name)
        .bind(&slug)
        .fetch_optional(&mut *conn)
        .await?;

        let tag = match inserted {
            Some(tag) => {
                log::debug!("created tag '{}' ({})", tag.name, tag.slug);
                tag
            }
            None => {
                sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE name = $1")
                    .bind(name)
                    .fetch_one(&mut *conn)
                    .await?
            }
        };

        if !resolved.iter().any(|existing: &Tag| existing.id == tag.id) {
            resolved.push(tag);
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_semicolon_list() {
        assert_eq!(parse_tag_names("a;b; b ;"), vec!["a", "b"]);
    }

    #[test]
    fn empty_field_yields_no_names() {
        assert!(parse_tag_names("").is_empty());
        assert!(parse_tag_names(" ; ;; ").is_empty());
    }

    #[test]
    fn keeps_first_appearance_order() {
        assert_eq!(
            parse_tag_names("proveedores;clientes;proveedores"),
            vec!["proveedores", "clientes"]
        );
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(parse_tag_names("VIP;vip"), vec!["VIP", "vip"]);
    }
}
